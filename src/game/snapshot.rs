//! Immutable per-tick view of the game state

use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::core::types::{AgentState, Tick};
use crate::game::status::{AttackerStatus, StatusSummary};

/// Immutable record of the game at the end of a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub tick: Tick,
    pub attackers: Vec<AgentState>,
    pub defenders: Vec<AgentState>,
    pub statuses: Vec<AttackerStatus>,
    /// Assignment that produced this snapshot, `None` for the initial one
    pub assignment: Option<Assignment>,
}

impl GameSnapshot {
    pub fn summary(&self) -> StatusSummary {
        StatusSummary::from_statuses(&self.statuses)
    }

    pub fn all_terminal(&self) -> bool {
        self.statuses.iter().all(|s| s.is_terminal())
    }

    /// Integer status codes in attacker order
    pub fn status_codes(&self) -> Vec<i8> {
        self.statuses.iter().map(|s| s.code()).collect()
    }
}
