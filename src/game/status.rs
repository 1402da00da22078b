//! Attacker status state machine
//!
//! FREE -> CAPTURED | ARRIVED, both terminal. Arrival is checked before
//! capture, so an attacker that reaches the goal on the tick it is caught
//! counts as arrived.

use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::core::error::GameError;
use crate::core::types::{planar_distance, AgentState};
use crate::spatial::{in_any, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackerStatus {
    #[default]
    Free,
    Captured,
    Arrived,
}

impl AttackerStatus {
    #[inline]
    pub fn is_free(self) -> bool {
        self == AttackerStatus::Free
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_free()
    }

    /// Integer encoding used in exported status logs: 0 free, -1 captured, 1 arrived
    pub fn code(self) -> i8 {
        match self {
            AttackerStatus::Free => 0,
            AttackerStatus::Captured => -1,
            AttackerStatus::Arrived => 1,
        }
    }
}

impl TryFrom<i8> for AttackerStatus {
    type Error = GameError;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(AttackerStatus::Free),
            -1 => Ok(AttackerStatus::Captured),
            1 => Ok(AttackerStatus::Arrived),
            other => Err(GameError::InvalidStatus(other)),
        }
    }
}

/// Attacker indices grouped by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub free: Vec<usize>,
    pub captured: Vec<usize>,
    pub arrived: Vec<usize>,
}

impl StatusSummary {
    pub fn from_statuses(statuses: &[AttackerStatus]) -> Self {
        let mut summary = Self::default();
        for (i, status) in statuses.iter().enumerate() {
            match status {
                AttackerStatus::Free => summary.free.push(i),
                AttackerStatus::Captured => summary.captured.push(i),
                AttackerStatus::Arrived => summary.arrived.push(i),
            }
        }
        summary
    }

    pub fn all_terminal(&self) -> bool {
        self.free.is_empty()
    }
}

/// Applies the capture and arrival rules after agents have moved
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMachine {
    pub capture_radius: f64,
    pub goals: Vec<Region>,
}

impl StatusMachine {
    pub fn new(capture_radius: f64, goals: Vec<Region>) -> Self {
        Self {
            capture_radius,
            goals,
        }
    }

    /// Arrival-only check, used on the initial states before the first tick
    pub fn check_arrivals(&self, attackers: &[AgentState], previous: &[AttackerStatus]) -> Vec<AttackerStatus> {
        attackers
            .iter()
            .zip(previous)
            .map(|(attacker, &status)| {
                if status.is_free() && in_any(&self.goals, attacker) {
                    AttackerStatus::Arrived
                } else {
                    status
                }
            })
            .collect()
    }

    /// Next statuses. Terminal statuses never change; a free attacker is
    /// captured only by a defender it is assigned to this tick.
    pub fn update(
        &self,
        attackers: &[AgentState],
        defenders: &[AgentState],
        previous: &[AttackerStatus],
        assignment: &Assignment,
    ) -> Vec<AttackerStatus> {
        attackers
            .iter()
            .zip(previous)
            .enumerate()
            .map(|(i, (attacker, &status))| {
                if status.is_terminal() {
                    return status;
                }
                if in_any(&self.goals, attacker) {
                    return AttackerStatus::Arrived;
                }
                let caught = assignment
                    .defenders_of(i)
                    .into_iter()
                    .any(|j| planar_distance(attacker, &defenders[j]) <= self.capture_radius);
                if caught {
                    AttackerStatus::Captured
                } else {
                    AttackerStatus::Free
                }
            })
            .collect()
    }
}
