//! Minimal binary integer-program interface
//!
//! The assignment stage only needs binary variables, `<=` constraints and a
//! linear objective, so any backend offering those can be plugged in.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Handle to a binary decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

/// Sum of coefficient * variable terms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, var: VarId, coef: f64) -> Self {
        self.terms.push((var, coef));
        self
    }

    /// Sum of variables with unit coefficients
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Maximize,
    Minimize,
}

/// Outcome class of a solve call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Search finished; the incumbent is optimal within the accepted gap
    Optimal,
    /// Time or node budget hit with a feasible incumbent
    Feasible,
    /// No feasible point found within the budget, or none exists
    NoSolutionFound,
}

impl SolveStatus {
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Wall-clock budget, accepted relative optimality gap and an optional node cap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveLimits {
    pub time_limit: Duration,
    pub max_gap: f64,
    /// Stop after this many search nodes; backends without nodes may ignore it
    pub node_limit: Option<u64>,
}

impl Default for SolveLimits {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(300),
            max_gap: 0.05,
            node_limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub status: SolveStatus,
    /// One entry per variable, empty when no solution was found
    pub values: Vec<bool>,
    pub objective: Option<f64>,
}

impl SolveResult {
    pub fn value(&self, var: VarId) -> bool {
        self.values.get(var.0).copied().unwrap_or(false)
    }
}

/// Backend able to solve small binary programs
pub trait IntegerProgram {
    fn add_binary_var(&mut self) -> VarId;

    /// Add `expr <= bound`
    fn add_constraint(&mut self, expr: LinearExpr, bound: f64);

    fn set_objective(&mut self, sense: Sense, expr: LinearExpr);

    fn solve(&mut self, limits: &SolveLimits) -> SolveResult;
}
