//! Dubins car: constant forward speed with a bounded heading rate

use std::f64::consts::PI;

use crate::core::types::{AgentState, Control, Role};
use crate::dynamics::{Dynamics, GRADIENT_EPS};

/// Constant-speed car: `x' = v cos(theta)`, `y' = v sin(theta)`, `theta' = u`
/// with `|u| <= turn_rate`. Heading is kept in `[-pi, pi)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DubinsCar {
    pub speed: f64,
    pub turn_rate: f64,
}

impl DubinsCar {
    pub fn new(speed: f64, turn_rate: f64) -> Self {
        Self { speed, turn_rate }
    }

    fn derivative(&self, heading: f64, u: f64) -> [f64; 3] {
        [self.speed * heading.cos(), self.speed * heading.sin(), u]
    }
}

pub fn wrap_angle(theta: f64) -> f64 {
    (theta + PI).rem_euclid(2.0 * PI) - PI
}

impl Dynamics for DubinsCar {
    fn state_dims(&self) -> usize {
        3
    }

    fn control_dims(&self) -> usize {
        1
    }

    fn step(&self, state: &[f64], control: &[f64], dt: f64) -> AgentState {
        let u = control
            .first()
            .copied()
            .unwrap_or(0.0)
            .clamp(-self.turn_rate, self.turn_rate);
        let theta = state[2];

        // Classic RK4; only the heading feeds back into the derivative
        let k1 = self.derivative(theta, u);
        let k2 = self.derivative(theta + 0.5 * dt * k1[2], u);
        let k3 = self.derivative(theta + 0.5 * dt * k2[2], u);
        let k4 = self.derivative(theta + dt * k3[2], u);

        let mut next: Vec<f64> = (0..3)
            .map(|i| state[i] + dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]))
            .collect();
        next[2] = wrap_angle(next[2]);
        next
    }

    /// Bang-bang on the heading component of the gradient
    fn optimal_control(&self, gradient: &[f64], role: Role) -> Control {
        let p_theta = gradient.get(2).copied().unwrap_or(0.0);
        if p_theta.abs() < GRADIENT_EPS {
            return self.zero_control();
        }
        let turn = match role {
            Role::Attacker => -p_theta.signum(),
            Role::Defender => p_theta.signum(),
        };
        vec![turn * self.turn_rate]
    }
}
