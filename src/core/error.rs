use thiserror::Error;

use crate::core::types::{Configuration, Role};

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Declared {declared} {role:?}s but {supplied} initial states were supplied")]
    AgentCountMismatch {
        role: Role,
        declared: usize,
        supplied: usize,
    },

    #[error("{role:?} {index} has {found} state coordinates, dynamics expect {expected}")]
    StateDimension {
        role: Role,
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Tensor shape {found:?} does not match grid, expected {expected:?}")]
    TensorShape {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Joint state has {found} coordinates, grid has {expected} dimensions")]
    StateLength { expected: usize, found: usize },

    #[error("Time index {index} out of range for {len} slices")]
    TimeIndexOutOfRange { index: usize, len: usize },

    #[error("No value function loaded for the {0} configuration")]
    MissingValueFunction(Configuration),

    #[error("Invalid attacker status code: {0}")]
    InvalidStatus(i8),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
