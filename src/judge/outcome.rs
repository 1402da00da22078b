//! Pairwise outcome evaluation between small agent groups
//!
//! For every free attacker and every defender (or defender pair) the
//! precomputed value functions tell whether the defenders can force capture.
//! The escapes are collected per defender and handed to the assignment stage.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{joint_state, AgentState, Configuration};
use crate::game::status::AttackerStatus;
use crate::value::ValueFunctionStore;

/// Margin applied to the 1-vs-2 value to absorb numerical error of the 6D tensor
pub const DEFAULT_EPSILON_1V2: f32 = 0.035;

/// True if the defender side wins: the value exceeds `threshold`
#[inline]
pub fn defender_wins(value: f32, threshold: f32) -> bool {
    value > threshold
}

/// Escapes found for one tick, indexed by defender
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscapeSets {
    /// `s1[j]`: attackers escaping defender j one-on-one
    pub s1: Vec<Vec<usize>>,
    /// `p2[j]`: attacker pairs (i < k) jointly escaping defender j
    pub p2: Vec<Vec<(usize, usize)>>,
    /// `s1v2[j]`: attackers escaping some defender pair that includes j
    pub s1v2: Vec<Vec<usize>>,
    /// (attacker, defender j, defender k) with j < k, escaping that pair
    pub t1v2: Vec<(usize, usize, usize)>,
}

impl EscapeSets {
    pub fn empty(num_defenders: usize) -> Self {
        Self {
            s1: vec![Vec::new(); num_defenders],
            p2: vec![Vec::new(); num_defenders],
            s1v2: vec![Vec::new(); num_defenders],
            t1v2: Vec::new(),
        }
    }

    pub fn escapes_1v1(&self, attacker: usize, defender: usize) -> bool {
        self.s1[defender].contains(&attacker)
    }

    pub fn escapes_1v2(&self, attacker: usize, defender: usize) -> bool {
        self.s1v2[defender].contains(&attacker)
    }
}

/// Judges 1-vs-1, 2-vs-1 and 1-vs-2 games for all free attackers
#[derive(Debug, Clone, Copy)]
pub struct OutcomeEvaluator {
    pub epsilon_1v2: f32,
}

impl Default for OutcomeEvaluator {
    fn default() -> Self {
        Self {
            epsilon_1v2: DEFAULT_EPSILON_1V2,
        }
    }
}

impl OutcomeEvaluator {
    pub fn new(epsilon_1v2: f32) -> Self {
        Self { epsilon_1v2 }
    }

    /// Build all escape sets. The 1-vs-2 sets stay empty when the store has
    /// no 1-vs-2 value function.
    pub fn escape_sets(
        &self,
        store: &ValueFunctionStore,
        attackers: &[AgentState],
        defenders: &[AgentState],
        statuses: &[AttackerStatus],
    ) -> Result<EscapeSets> {
        let num_defenders = defenders.len();
        let mut sets = EscapeSets::empty(num_defenders);
        let free: Vec<usize> = statuses
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_free())
            .map(|(i, _)| i)
            .collect();

        let v1v1 = store.get(Configuration::OneVsOne)?;
        for (j, defender) in defenders.iter().enumerate() {
            for &i in &free {
                let joint = joint_state(&[&attackers[i]], &[defender]);
                if !defender_wins(v1v1.value_at(&joint, None)?, 0.0) {
                    sets.s1[j].push(i);
                }
            }
        }

        let v2v1 = store.get(Configuration::TwoVsOne)?;
        for (j, defender) in defenders.iter().enumerate() {
            for (pos, &i) in free.iter().enumerate() {
                for &k in &free[pos + 1..] {
                    let joint = joint_state(&[&attackers[i], &attackers[k]], &[defender]);
                    if !defender_wins(v2v1.value_at(&joint, None)?, 0.0) {
                        sets.p2[j].push((i, k));
                    }
                }
            }
        }

        if store.contains(Configuration::OneVsTwo) {
            let v1v2 = store.get(Configuration::OneVsTwo)?;
            for j in 0..num_defenders {
                for k in j + 1..num_defenders {
                    for &i in &free {
                        let joint = joint_state(&[&attackers[i]], &[&defenders[j], &defenders[k]]);
                        if !defender_wins(v1v2.value_at(&joint, None)?, self.epsilon_1v2) {
                            push_unique(&mut sets.s1v2[j], i);
                            push_unique(&mut sets.s1v2[k], i);
                            sets.t1v2.push((i, j, k));
                        }
                    }
                }
            }
        }

        tracing::debug!(
            "Escape sets: 1v1 {:?}, 2v1 {:?}, 1v2 triples {:?}",
            sets.s1,
            sets.p2,
            sets.t1v2
        );
        Ok(sets)
    }
}

fn push_unique(list: &mut Vec<usize>, value: usize) {
    if !list.contains(&value) {
        list.push(value);
    }
}
