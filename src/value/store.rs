//! Value functions loaded once and shared read-only by every episode

use ahash::AHashMap;

use crate::core::error::{GameError, Result};
use crate::core::types::Configuration;
use crate::value::oracle::ValueFunction;

/// All value functions a game needs, keyed by agent configuration
///
/// Built once before any simulation starts and only borrowed afterwards, so
/// independent episodes can share it across threads without locking.
#[derive(Debug, Clone)]
pub struct ValueFunctionStore {
    attacker_dims: usize,
    defender_dims: usize,
    functions: AHashMap<Configuration, ValueFunction>,
}

impl ValueFunctionStore {
    /// `attacker_dims` / `defender_dims` are the per-agent state sizes
    pub fn new(attacker_dims: usize, defender_dims: usize) -> Self {
        Self {
            attacker_dims,
            defender_dims,
            functions: AHashMap::new(),
        }
    }

    /// Register a value function, checking its grid covers the joint state
    pub fn insert(&mut self, configuration: Configuration, function: ValueFunction) -> Result<()> {
        let expected = configuration.joint_dims(self.attacker_dims, self.defender_dims);
        if function.ndims() != expected {
            return Err(GameError::TensorShape {
                expected: vec![expected],
                found: vec![function.ndims()],
            });
        }
        tracing::debug!(
            "Registered {} value function: {} dims, {} time slices",
            configuration,
            function.ndims(),
            function.time_steps()
        );
        self.functions.insert(configuration, function);
        Ok(())
    }

    /// Builder-style `insert`
    pub fn with(mut self, configuration: Configuration, function: ValueFunction) -> Result<Self> {
        self.insert(configuration, function)?;
        Ok(self)
    }

    pub fn get(&self, configuration: Configuration) -> Result<&ValueFunction> {
        self.functions
            .get(&configuration)
            .ok_or(GameError::MissingValueFunction(configuration))
    }

    pub fn contains(&self, configuration: Configuration) -> bool {
        self.functions.contains_key(&configuration)
    }

    pub fn attacker_dims(&self) -> usize {
        self.attacker_dims
    }

    pub fn defender_dims(&self) -> usize {
        self.defender_dims
    }
}
