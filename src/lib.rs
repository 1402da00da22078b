//! Reach-Avoid - multi-pursuer, multi-evader reach-avoid games
//!
//! Defenders are assigned to attackers every tick from precomputed
//! Hamilton-Jacobi value functions, then both teams follow the gradients of
//! those value functions until every attacker is captured or reaches a goal.

pub mod assignment;
pub mod control;
pub mod core;
pub mod dynamics;
pub mod game;
pub mod judge;
pub mod spatial;
pub mod value;

pub use crate::core::config::{GameConfig, ScenarioConfig};
pub use crate::core::error::{GameError, Result};
