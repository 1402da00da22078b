//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulation tick counter
pub type Tick = u64;

/// Continuous state of one agent: position first, then optional heading
pub type AgentState = Vec<f64>;

/// Control vector applied to one agent for one tick
pub type Control = Vec<f64>;

/// Which team an agent plays for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Attacker,
    Defender,
}

/// Agent group a value function is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Configuration {
    /// Single attacker reaching the goal, no defender
    OneVsZero,
    OneVsOne,
    /// Two attackers against one defender
    TwoVsOne,
    /// One attacker against two defenders
    OneVsTwo,
}

impl Configuration {
    pub const ALL: [Configuration; 4] = [
        Configuration::OneVsZero,
        Configuration::OneVsOne,
        Configuration::TwoVsOne,
        Configuration::OneVsTwo,
    ];

    /// (attackers, defenders) taking part
    pub fn agents(self) -> (usize, usize) {
        match self {
            Configuration::OneVsZero => (1, 0),
            Configuration::OneVsOne => (1, 1),
            Configuration::TwoVsOne => (2, 1),
            Configuration::OneVsTwo => (1, 2),
        }
    }

    /// Joint state size given per-agent state sizes
    pub fn joint_dims(self, attacker_dims: usize, defender_dims: usize) -> usize {
        let (a, d) = self.agents();
        a * attacker_dims + d * defender_dims
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Configuration::OneVsZero => "1vs0",
            Configuration::OneVsOne => "1vs1",
            Configuration::TwoVsOne => "2vs1",
            Configuration::OneVsTwo => "1vs2",
        };
        f.write_str(label)
    }
}

/// Euclidean distance over the planar (x, y) part of two states
#[inline]
pub fn planar_distance(a: &[f64], b: &[f64]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

/// Concatenate agent states in the fixed joint order (attackers first, then defenders)
pub fn joint_state(attackers: &[&[f64]], defenders: &[&[f64]]) -> Vec<f64> {
    attackers
        .iter()
        .chain(defenders.iter())
        .flat_map(|s| s.iter().copied())
        .collect()
}
