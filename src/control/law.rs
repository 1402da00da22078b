//! Optimal-control laws mapping a joint value gradient to one agent's control

use crate::core::types::{Control, Role};
use crate::dynamics::Dynamics;

/// Per-configuration control law, one entry point per agent group.
/// Implementations must be pure functions of the gradient.
pub trait ControlLaw: Send + Sync {
    /// Attacker control from the 1-vs-0 gradient
    fn attacker_1v0(&self, gradient: &[f64]) -> Control;

    /// Defender control from the 1-vs-1 gradient
    fn defender_1v1(&self, gradient: &[f64]) -> Control;

    /// Defender control from the 2-vs-1 gradient
    fn defender_2v1(&self, gradient: &[f64]) -> Control;

    /// Control of defender `slot` (0 or 1) from the 1-vs-2 gradient
    fn defender_1v2(&self, gradient: &[f64], slot: usize) -> Control;

    /// Control that holds an attacker in place
    fn attacker_zero_control(&self) -> Control;

    fn defender_zero_control(&self) -> Control;
}

/// Control law derived from the agents' dynamics: each agent reads its own
/// block of the joint gradient and applies its Hamiltonian-optimal control
#[derive(Debug)]
pub struct HjControlLaw {
    attacker: Box<dyn Dynamics>,
    defender: Box<dyn Dynamics>,
}

impl HjControlLaw {
    pub fn new(attacker: Box<dyn Dynamics>, defender: Box<dyn Dynamics>) -> Self {
        Self { attacker, defender }
    }

    pub fn attacker_dynamics(&self) -> &dyn Dynamics {
        self.attacker.as_ref()
    }

    pub fn defender_dynamics(&self) -> &dyn Dynamics {
        self.defender.as_ref()
    }

    /// Defender block after `attackers` attacker blocks and `before` defender blocks
    fn defender_block<'g>(&self, gradient: &'g [f64], attackers: usize, before: usize) -> &'g [f64] {
        let a = self.attacker.state_dims();
        let d = self.defender.state_dims();
        let start = attackers * a + before * d;
        &gradient[start..start + d]
    }
}

impl ControlLaw for HjControlLaw {
    fn attacker_1v0(&self, gradient: &[f64]) -> Control {
        let a = self.attacker.state_dims();
        self.attacker.optimal_control(&gradient[..a], Role::Attacker)
    }

    fn defender_1v1(&self, gradient: &[f64]) -> Control {
        self.defender
            .optimal_control(self.defender_block(gradient, 1, 0), Role::Defender)
    }

    fn defender_2v1(&self, gradient: &[f64]) -> Control {
        self.defender
            .optimal_control(self.defender_block(gradient, 2, 0), Role::Defender)
    }

    fn defender_1v2(&self, gradient: &[f64], slot: usize) -> Control {
        self.defender
            .optimal_control(self.defender_block(gradient, 1, slot), Role::Defender)
    }

    fn attacker_zero_control(&self) -> Control {
        self.attacker.zero_control()
    }

    fn defender_zero_control(&self) -> Control {
        self.defender.zero_control()
    }
}
