//! Planar point agents: per-axis velocity control or a single bearing
//!
//! Both models update position exactly as `x + speed * direction * dt`.

use crate::core::types::{AgentState, Control, Role};
use crate::dynamics::{Dynamics, GRADIENT_EPS};

/// Direction of steepest descent (attacker) or ascent (defender)
fn signed_direction(gradient: &[f64], role: Role) -> Option<(f64, f64)> {
    let px = gradient.first().copied().unwrap_or(0.0);
    let py = gradient.get(1).copied().unwrap_or(0.0);
    let norm = px.hypot(py);
    if norm < GRADIENT_EPS {
        return None;
    }
    let sign = match role {
        Role::Attacker => -1.0,
        Role::Defender => 1.0,
    };
    Some((sign * px / norm, sign * py / norm))
}

/// Planar point agent: `x' = speed * u`, each control axis clamped to
/// `[u_min, u_max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleIntegrator {
    pub speed: f64,
    pub u_min: f64,
    pub u_max: f64,
}

impl SingleIntegrator {
    pub fn new(speed: f64, u_min: f64, u_max: f64) -> Self {
        Self { speed, u_min, u_max }
    }
}

impl Dynamics for SingleIntegrator {
    fn state_dims(&self) -> usize {
        2
    }

    fn control_dims(&self) -> usize {
        2
    }

    /// The derivative does not depend on the state, so all four Runge-Kutta
    /// stages are equal and the update is exactly `x + speed * u * dt`. The
    /// precomputed value functions assume this discretisation.
    ///
    /// Missing control components count as zero; every state coordinate is kept.
    fn step(&self, state: &[f64], control: &[f64], dt: f64) -> AgentState {
        state
            .iter()
            .enumerate()
            .map(|(i, x)| {
                let u = control.get(i).copied().unwrap_or(0.0);
                x + self.speed * u.clamp(self.u_min, self.u_max) * dt
            })
            .collect()
    }

    fn optimal_control(&self, gradient: &[f64], role: Role) -> Control {
        match signed_direction(gradient, role) {
            Some((ux, uy)) => vec![ux, uy],
            None => self.zero_control(),
        }
    }
}

/// Planar point agent moving at fixed `speed` along a commanded bearing:
/// `x' = speed * cos(theta)`, `y' = speed * sin(theta)`
///
/// The control is `[theta]`. An empty control holds position, since no bearing
/// stands still.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BearingIntegrator {
    pub speed: f64,
}

impl BearingIntegrator {
    pub fn new(speed: f64) -> Self {
        Self { speed }
    }
}

impl Dynamics for BearingIntegrator {
    fn state_dims(&self) -> usize {
        2
    }

    fn control_dims(&self) -> usize {
        1
    }

    fn step(&self, state: &[f64], control: &[f64], dt: f64) -> AgentState {
        let Some(&theta) = control.first() else {
            return state.to_vec();
        };
        let mut next = state.to_vec();
        next[0] += self.speed * theta.cos() * dt;
        next[1] += self.speed * theta.sin() * dt;
        next
    }

    fn optimal_control(&self, gradient: &[f64], role: Role) -> Control {
        match signed_direction(gradient, role) {
            Some((ux, uy)) => vec![uy.atan2(ux)],
            None => self.zero_control(),
        }
    }

    fn zero_control(&self) -> Control {
        Vec::new()
    }
}
