//! Turns an assignment and the value-function gradients into controls
//!
//! Each group's joint state is looked up in its value function, the earliest
//! inside -> outside flip along the time axis picks the governing slice, and
//! that slice's gradient is fed to the configuration's control law. With no
//! such flip the agent gets zero control.

use ordered_float::OrderedFloat;

use crate::assignment::Assignment;
use crate::control::law::ControlLaw;
use crate::core::error::Result;
use crate::core::types::{joint_state, planar_distance, AgentState, Configuration, Control};
use crate::game::status::AttackerStatus;
use crate::value::ValueFunctionStore;

pub struct ControlSynthesizer<'a> {
    store: &'a ValueFunctionStore,
    law: &'a dyn ControlLaw,
    /// Pursue jointly-held attackers with the 1-vs-2 value function
    cooperative: bool,
}

impl<'a> ControlSynthesizer<'a> {
    pub fn new(store: &'a ValueFunctionStore, law: &'a dyn ControlLaw) -> Self {
        Self {
            store,
            law,
            cooperative: false,
        }
    }

    pub fn cooperative(mut self, enabled: bool) -> Self {
        self.cooperative = enabled && self.store.contains(Configuration::OneVsTwo);
        self
    }

    /// Gradient at the governing horizon slice, if the state has one
    fn governing_gradient(&self, configuration: Configuration, joint: &[f64]) -> Result<Option<Vec<f64>>> {
        let vf = self.store.get(configuration)?;
        match vf.find_horizon_slice(joint)?.governing() {
            Some(t) => Ok(Some(vf.gradient_at(joint, t)?)),
            None => Ok(None),
        }
    }

    pub fn defender_controls(
        &self,
        attackers: &[AgentState],
        defenders: &[AgentState],
        statuses: &[AttackerStatus],
        assignment: &Assignment,
    ) -> Result<Vec<Control>> {
        let zero = self.law.defender_zero_control();
        let mut controls: Vec<Option<Control>> = vec![None; defenders.len()];

        if self.cooperative {
            for (j, k, i) in cooperative_pairs(assignment) {
                let joint = joint_state(&[&attackers[i]], &[&defenders[j], &defenders[k]]);
                let (cj, ck) = match self.governing_gradient(Configuration::OneVsTwo, &joint)? {
                    Some(g) => (self.law.defender_1v2(&g, 0), self.law.defender_1v2(&g, 1)),
                    None => (zero.clone(), zero.clone()),
                };
                tracing::trace!("Defenders {} and {} pursue attacker {} jointly", j, k, i);
                controls[j] = Some(cj);
                controls[k] = Some(ck);
            }
        }

        for (j, defender) in defenders.iter().enumerate() {
            if controls[j].is_some() {
                continue;
            }
            let control = match *assignment.attackers_of(j) {
                [i] => {
                    let joint = joint_state(&[&attackers[i]], &[defender]);
                    self.governing_gradient(Configuration::OneVsOne, &joint)?
                        .map(|g| self.law.defender_1v1(&g))
                }
                [i, k] => {
                    let joint = joint_state(&[&attackers[i], &attackers[k]], &[defender]);
                    self.governing_gradient(Configuration::TwoVsOne, &joint)?
                        .map(|g| self.law.defender_2v1(&g))
                }
                _ => {
                    // Unassigned: the nearest free attacker is located but not pursued
                    let nearest = nearest_free_attacker(defender, attackers, statuses);
                    tracing::trace!("Defender {} unassigned, nearest free attacker {:?}", j, nearest);
                    None
                }
            };
            controls[j] = Some(control.unwrap_or_else(|| zero.clone()));
        }

        Ok(controls
            .into_iter()
            .map(|c| c.unwrap_or_else(|| zero.clone()))
            .collect())
    }

    pub fn attacker_controls(
        &self,
        attackers: &[AgentState],
        statuses: &[AttackerStatus],
    ) -> Result<Vec<Control>> {
        let zero = self.law.attacker_zero_control();
        attackers
            .iter()
            .zip(statuses)
            .map(|(attacker, status)| {
                if !status.is_free() {
                    return Ok(zero.clone());
                }
                Ok(self
                    .governing_gradient(Configuration::OneVsZero, attacker)?
                    .map(|g| self.law.attacker_1v0(&g))
                    .unwrap_or_else(|| zero.clone()))
            })
            .collect()
    }
}

/// (j, k, attacker) where defenders j < k both hold exactly that one attacker
fn cooperative_pairs(assignment: &Assignment) -> Vec<(usize, usize, usize)> {
    let mut pairs = Vec::new();
    for j in 0..assignment.num_defenders() {
        let [i] = *assignment.attackers_of(j) else {
            continue;
        };
        let holders = assignment.defenders_of(i);
        if let [first, k] = holders[..] {
            if first == j && assignment.attackers_of(k) == [i] {
                pairs.push((j, k, i));
            }
        }
    }
    pairs
}

pub fn nearest_free_attacker(
    defender: &[f64],
    attackers: &[AgentState],
    statuses: &[AttackerStatus],
) -> Option<usize> {
    attackers
        .iter()
        .zip(statuses)
        .enumerate()
        .filter(|(_, (_, s))| s.is_free())
        .min_by_key(|(_, (a, _))| OrderedFloat(planar_distance(defender, a)))
        .map(|(i, _)| i)
}
