//! Agent dynamics models
//!
//! Every model exposes the same capability so the simulation can swap
//! single-integrator and Dubins agents through configuration alone.

pub mod dubins;
pub mod single_integrator;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{GameError, Result};
use crate::core::types::{AgentState, Control, Role};

pub use dubins::DubinsCar;
pub use single_integrator::{BearingIntegrator, SingleIntegrator};

/// Gradients smaller than this in norm yield zero control
pub const GRADIENT_EPS: f64 = 1e-12;

/// Continuous-time agent model advanced in fixed control ticks
pub trait Dynamics: Send + Sync + fmt::Debug {
    /// Number of state coordinates per agent
    fn state_dims(&self) -> usize;

    /// Number of control inputs per agent
    fn control_dims(&self) -> usize;

    /// State after holding `control` for `dt` seconds
    fn step(&self, state: &[f64], control: &[f64], dt: f64) -> AgentState;

    /// Hamiltonian-optimal control for this agent's block of a value gradient.
    /// Attackers minimise the value, defenders maximise it.
    fn optimal_control(&self, gradient: &[f64], role: Role) -> Control;

    /// Control that keeps the agent in place
    fn zero_control(&self) -> Control {
        vec![0.0; self.control_dims()]
    }
}

fn default_u_min() -> f64 {
    -1.0
}

fn default_u_max() -> f64 {
    1.0
}

/// Dynamics selection as it appears in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DynamicsConfig {
    SingleIntegrator {
        speed: f64,
        #[serde(default = "default_u_min")]
        u_min: f64,
        #[serde(default = "default_u_max")]
        u_max: f64,
    },
    /// Single integrator steered by one bearing angle at fixed speed
    Bearing { speed: f64 },
    Dubins {
        speed: f64,
        /// Largest heading rate magnitude
        #[serde(default = "default_u_max")]
        turn_rate: f64,
    },
}

impl DynamicsConfig {
    pub fn single_integrator(speed: f64) -> Self {
        DynamicsConfig::SingleIntegrator {
            speed,
            u_min: default_u_min(),
            u_max: default_u_max(),
        }
    }

    pub fn bearing(speed: f64) -> Self {
        DynamicsConfig::Bearing { speed }
    }

    pub fn dubins(speed: f64, turn_rate: f64) -> Self {
        DynamicsConfig::Dubins { speed, turn_rate }
    }

    pub fn state_dims(&self) -> usize {
        match self {
            DynamicsConfig::SingleIntegrator { .. } | DynamicsConfig::Bearing { .. } => 2,
            DynamicsConfig::Dubins { .. } => 3,
        }
    }

    /// Speeds and rates must be positive and finite; NaN fails every check
    pub fn validate(&self) -> Result<()> {
        match *self {
            DynamicsConfig::SingleIntegrator { speed, u_min, u_max } => {
                check_positive("single integrator speed", speed)?;
                if !(u_min.is_finite() && u_max.is_finite() && u_min <= u_max) {
                    return Err(GameError::Config(format!(
                        "control bounds must be finite and ordered, got [{u_min}, {u_max}]"
                    )));
                }
            }
            DynamicsConfig::Bearing { speed } => check_positive("bearing speed", speed)?,
            DynamicsConfig::Dubins { speed, turn_rate } => {
                check_positive("dubins speed", speed)?;
                check_positive("dubins turn rate", turn_rate)?;
            }
        }
        Ok(())
    }

    pub fn build(&self) -> Box<dyn Dynamics> {
        match *self {
            DynamicsConfig::SingleIntegrator { speed, u_min, u_max } => {
                Box::new(SingleIntegrator::new(speed, u_min, u_max))
            }
            DynamicsConfig::Bearing { speed } => Box::new(BearingIntegrator::new(speed)),
            DynamicsConfig::Dubins { speed, turn_rate } => {
                Box::new(DubinsCar::new(speed, turn_rate))
            }
        }
    }
}

fn check_positive(what: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GameError::Config(format!(
            "{what} must be positive and finite, got {value}"
        )))
    }
}
