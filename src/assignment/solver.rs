//! Defender-to-attacker assignment as a binary integer program
//!
//! One binary variable per (free attacker, defender). A defender takes at most
//! two attackers (the largest capture group with a value function), and
//! attackers known to escape a defender, alone or as a pair, are never
//! assigned to it. The objective maximises the number of assignments.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::assignment::branch_bound::BranchAndBound;
use crate::assignment::program::{
    IntegerProgram, LinearExpr, Sense, SolveLimits, SolveStatus, VarId,
};
use crate::core::error::{GameError, Result};
use crate::game::status::AttackerStatus;
use crate::judge::EscapeSets;

/// Largest attacker group a single defender is assigned
pub const MAX_ATTACKERS_PER_DEFENDER: usize = 2;

/// Objective weight of an attacker that only a defender pair can capture
pub const WEAK_EDGE_WEIGHT: f64 = 0.5;

/// Which formulation to solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentVariant {
    /// Each attacker gets at most one defender
    #[default]
    Basic,
    /// Attackers may be shared by two defenders (1-vs-2 capture)
    Extended,
}

/// Attackers assigned to each defender, in ascending attacker order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment(pub Vec<Vec<usize>>);

impl Assignment {
    pub fn empty(num_defenders: usize) -> Self {
        Self(vec![Vec::new(); num_defenders])
    }

    pub fn num_defenders(&self) -> usize {
        self.0.len()
    }

    pub fn attackers_of(&self, defender: usize) -> &[usize] {
        &self.0[defender]
    }

    /// Defenders an attacker is assigned to
    pub fn defenders_of(&self, attacker: usize) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, list)| list.contains(&attacker))
            .map(|(j, _)| j)
            .collect()
    }

    pub fn is_assigned(&self, attacker: usize) -> bool {
        self.0.iter().any(|list| list.contains(&attacker))
    }

    pub fn total(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    pub assignment: Assignment,
    pub status: SolveStatus,
    pub objective: Option<f64>,
    /// (attacker, defender) edges weighted at half value (extended variant)
    pub weak_edges: Vec<(usize, usize)>,
}

/// Solver settings, loaded as part of the game configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentSettings {
    pub variant: AssignmentVariant,
    /// Wall-clock budget per solve
    pub time_limit_secs: f64,
    /// Accepted relative optimality gap
    pub max_gap: f64,
    /// Optional cap on explored search nodes, on top of the time limit
    pub node_limit: Option<u64>,
}

impl Default for AssignmentSettings {
    fn default() -> Self {
        Self {
            variant: AssignmentVariant::Basic,
            time_limit_secs: 300.0,
            max_gap: 0.05,
            node_limit: None,
        }
    }
}

impl AssignmentSettings {
    /// The time limit must fit a `Duration`; the gap is a fraction in [0, 1]
    pub fn validate(&self) -> Result<()> {
        let secs = self.time_limit_secs;
        if !(0.0..=Duration::MAX.as_secs_f64()).contains(&secs) {
            return Err(GameError::Config(format!(
                "assignment time_limit_secs must be finite and non-negative, got {secs}"
            )));
        }
        if !(0.0..=1.0).contains(&self.max_gap) {
            return Err(GameError::Config(format!(
                "assignment max_gap must lie in [0, 1], got {}",
                self.max_gap
            )));
        }
        Ok(())
    }

    pub fn limits(&self) -> SolveLimits {
        SolveLimits {
            time_limit: Duration::try_from_secs_f64(self.time_limit_secs.max(0.0))
                .unwrap_or(Duration::MAX),
            max_gap: self.max_gap,
            node_limit: self.node_limit,
        }
    }
}

/// Builds and solves the assignment program for one tick
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentSolver {
    pub settings: AssignmentSettings,
}

/// Variables e[free attacker][defender] plus the free-attacker index map
struct Variables {
    free: Vec<usize>,
    e: Vec<Vec<VarId>>,
}

impl Variables {
    fn build(program: &mut impl IntegerProgram, statuses: &[AttackerStatus], num_defenders: usize) -> Self {
        let free: Vec<usize> = statuses
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_free())
            .map(|(i, _)| i)
            .collect();
        let e = free
            .iter()
            .map(|_| (0..num_defenders).map(|_| program.add_binary_var()).collect())
            .collect();
        Self { free, e }
    }

    /// Variable for a global attacker index, if that attacker is free
    fn var(&self, attacker: usize, defender: usize) -> Option<VarId> {
        self.free
            .binary_search(&attacker)
            .ok()
            .map(|pos| self.e[pos][defender])
    }

    fn column(&self, defender: usize) -> LinearExpr {
        LinearExpr::sum(self.e.iter().map(|row| row[defender]))
    }

    fn decode(&self, values: impl Fn(VarId) -> bool, num_defenders: usize) -> Assignment {
        let mut assignment = Assignment::empty(num_defenders);
        for (pos, &attacker) in self.free.iter().enumerate() {
            for j in 0..num_defenders {
                if values(self.e[pos][j]) {
                    assignment.0[j].push(attacker);
                }
            }
        }
        assignment
    }
}

impl AssignmentSolver {
    pub fn new(settings: AssignmentSettings) -> Self {
        Self { settings }
    }

    /// Solve with the configured variant on the built-in backend
    pub fn solve(
        &self,
        num_defenders: usize,
        statuses: &[AttackerStatus],
        escapes: &EscapeSets,
    ) -> AssignmentOutcome {
        let mut backend = BranchAndBound::new();
        match self.settings.variant {
            AssignmentVariant::Basic => self.solve_basic(&mut backend, num_defenders, statuses, escapes),
            AssignmentVariant::Extended => {
                self.solve_extended(&mut backend, num_defenders, statuses, escapes)
            }
        }
    }

    /// Each attacker to at most one defender
    pub fn solve_basic(
        &self,
        program: &mut impl IntegerProgram,
        num_defenders: usize,
        statuses: &[AttackerStatus],
        escapes: &EscapeSets,
    ) -> AssignmentOutcome {
        let vars = Variables::build(program, statuses, num_defenders);

        for j in 0..num_defenders {
            program.add_constraint(vars.column(j), MAX_ATTACKERS_PER_DEFENDER as f64);
        }
        for row in &vars.e {
            program.add_constraint(LinearExpr::sum(row.iter().copied()), 1.0);
        }
        for j in 0..num_defenders {
            for &attacker in &escapes.s1[j] {
                if let Some(v) = vars.var(attacker, j) {
                    program.add_constraint(LinearExpr::sum([v]), 0.0);
                }
            }
        }
        add_pair_constraints(program, &vars, escapes, num_defenders);

        let objective = LinearExpr::sum(vars.e.iter().flatten().copied());
        program.set_objective(Sense::Maximize, objective);

        self.finish(program, &vars, num_defenders, Vec::new())
    }

    /// Attackers may be shared by two defenders when together they capture it
    pub fn solve_extended(
        &self,
        program: &mut impl IntegerProgram,
        num_defenders: usize,
        statuses: &[AttackerStatus],
        escapes: &EscapeSets,
    ) -> AssignmentOutcome {
        let vars = Variables::build(program, statuses, num_defenders);
        let mut weights = vec![vec![1.0; num_defenders]; vars.free.len()];
        let mut weak_edges = Vec::new();

        for j in 0..num_defenders {
            program.add_constraint(vars.column(j), MAX_ATTACKERS_PER_DEFENDER as f64);
        }
        for row in &vars.e {
            program.add_constraint(LinearExpr::sum(row.iter().copied()), 2.0);
        }
        for &(attacker, j, k) in &escapes.t1v2 {
            if let (Some(a), Some(b)) = (vars.var(attacker, j), vars.var(attacker, k)) {
                program.add_constraint(LinearExpr::sum([a, b]), 1.0);
            }
        }

        for j in 0..num_defenders {
            for &attacker in &escapes.s1[j] {
                let Ok(pos) = vars.free.binary_search(&attacker) else {
                    continue;
                };
                let v = vars.e[pos][j];
                if escapes.escapes_1v2(attacker, j) {
                    program.add_constraint(LinearExpr::sum([v]), 0.0);
                    continue;
                }
                // Escapes j alone but not a pair containing j: j only helps
                weights[pos][j] = WEAK_EDGE_WEIGHT;
                weak_edges.push((attacker, j));
                let mut helpers = LinearExpr::new().term(v, 1.0);
                for k in (0..num_defenders).filter(|&k| k != j) {
                    helpers = helpers.term(vars.e[pos][k], -1.0);
                }
                program.add_constraint(helpers, 0.0);
            }
        }
        add_pair_constraints(program, &vars, escapes, num_defenders);

        let mut objective = LinearExpr::new();
        for (pos, row) in vars.e.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                objective = objective.term(v, weights[pos][j]);
            }
        }
        program.set_objective(Sense::Maximize, objective);

        self.finish(program, &vars, num_defenders, weak_edges)
    }

    fn finish(
        &self,
        program: &mut impl IntegerProgram,
        vars: &Variables,
        num_defenders: usize,
        weak_edges: Vec<(usize, usize)>,
    ) -> AssignmentOutcome {
        let result = program.solve(&self.settings.limits());
        match result.status {
            SolveStatus::Optimal => {
                tracing::debug!("Optimal assignment found, objective {:?}", result.objective)
            }
            SolveStatus::Feasible => tracing::info!(
                "Assignment solve hit its time limit, using feasible objective {:?}",
                result.objective
            ),
            SolveStatus::NoSolutionFound => {
                tracing::warn!("No feasible assignment found, defenders left unassigned");
                return AssignmentOutcome {
                    assignment: Assignment::empty(num_defenders),
                    status: result.status,
                    objective: None,
                    weak_edges,
                };
            }
        }
        AssignmentOutcome {
            assignment: vars.decode(|v| result.value(v), num_defenders),
            status: result.status,
            objective: result.objective,
            weak_edges,
        }
    }
}

/// Pairs escaping defender j may not both be assigned to j
fn add_pair_constraints(
    program: &mut impl IntegerProgram,
    vars: &Variables,
    escapes: &EscapeSets,
    num_defenders: usize,
) {
    for j in 0..num_defenders {
        for &(i, k) in &escapes.p2[j] {
            if let (Some(a), Some(b)) = (vars.var(i, j), vars.var(k, j)) {
                program.add_constraint(LinearExpr::sum([a, b]), 1.0);
            }
        }
    }
}
