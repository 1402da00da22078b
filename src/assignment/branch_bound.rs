//! Depth-first branch and bound for small binary programs
//!
//! Variables are branched in creation order, trying the objective-improving
//! value first. Nodes are pruned by constraint feasibility and by an upper
//! bound built from single-constraint knapsack relaxations. The search is
//! fully deterministic; among equally good solutions the first one found is
//! kept.

use std::time::Instant;

use crate::assignment::program::{
    IntegerProgram, LinearExpr, Sense, SolveLimits, SolveResult, SolveStatus, VarId,
};

const EPS: f64 = 1e-9;

/// Deadline is checked once every this many nodes
const DEADLINE_CHECK_INTERVAL: u64 = 256;

#[derive(Debug, Clone)]
struct Row {
    /// Merged terms, one entry per variable
    terms: Vec<(usize, f64)>,
    bound: f64,
}

/// In-process binary program solver
#[derive(Debug, Clone)]
pub struct BranchAndBound {
    num_vars: usize,
    rows: Vec<Row>,
    sense: Sense,
    objective: Vec<f64>,
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchAndBound {
    pub fn new() -> Self {
        Self {
            num_vars: 0,
            rows: Vec::new(),
            sense: Sense::Maximize,
            objective: Vec::new(),
        }
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_constraints(&self) -> usize {
        self.rows.len()
    }
}

fn merge_terms(expr: LinearExpr) -> Vec<(usize, f64)> {
    let mut terms: Vec<(usize, f64)> = Vec::with_capacity(expr.terms.len());
    for (VarId(v), coef) in expr.terms {
        match terms.iter_mut().find(|(u, _)| *u == v) {
            Some(t) => t.1 += coef,
            None => terms.push((v, coef)),
        }
    }
    terms.retain(|&(_, c)| c != 0.0);
    terms
}

impl IntegerProgram for BranchAndBound {
    fn add_binary_var(&mut self) -> VarId {
        self.num_vars += 1;
        self.objective.push(0.0);
        VarId(self.num_vars - 1)
    }

    fn add_constraint(&mut self, expr: LinearExpr, bound: f64) {
        self.rows.push(Row {
            terms: merge_terms(expr),
            bound,
        });
    }

    fn set_objective(&mut self, sense: Sense, expr: LinearExpr) {
        self.sense = sense;
        self.objective = vec![0.0; self.num_vars];
        for (v, coef) in merge_terms(expr) {
            // Search always maximises
            self.objective[v] = match sense {
                Sense::Maximize => coef,
                Sense::Minimize => -coef,
            };
        }
    }

    fn solve(&mut self, limits: &SolveLimits) -> SolveResult {
        let mut search = Search::new(self, limits);
        let status = search.run();
        let nodes = search.nodes;
        let result = match search.best {
            Some((obj, values)) if status.has_solution() => SolveResult {
                status,
                values,
                objective: Some(match self.sense {
                    Sense::Maximize => obj,
                    Sense::Minimize => -obj,
                }),
            },
            _ => SolveResult {
                status: SolveStatus::NoSolutionFound,
                values: Vec::new(),
                objective: None,
            },
        };
        tracing::debug!(
            "Branch and bound: {} vars, {} constraints, {} nodes, {:?}",
            self.num_vars,
            self.rows.len(),
            nodes,
            result.status
        );
        result
    }
}

struct Search<'a> {
    model: &'a BranchAndBound,
    /// Per variable: (row, coefficient)
    occurrences: Vec<Vec<(usize, f64)>>,
    fixed: Vec<bool>,
    fixed_lhs: Vec<f64>,
    /// Sum of negative coefficients over still-free variables, per row
    min_rest: Vec<f64>,
    fixed_obj: f64,
    best: Option<(f64, Vec<bool>)>,
    started: Instant,
    limits: SolveLimits,
    nodes: u64,
    timed_out: bool,
}

impl<'a> Search<'a> {
    fn new(model: &'a BranchAndBound, limits: &SolveLimits) -> Self {
        let mut occurrences = vec![Vec::new(); model.num_vars];
        let mut min_rest = vec![0.0; model.rows.len()];
        for (r, row) in model.rows.iter().enumerate() {
            for &(v, coef) in &row.terms {
                occurrences[v].push((r, coef));
                if coef < 0.0 {
                    min_rest[r] += coef;
                }
            }
        }
        Self {
            model,
            occurrences,
            fixed: vec![false; model.num_vars],
            fixed_lhs: vec![0.0; model.rows.len()],
            min_rest,
            fixed_obj: 0.0,
            best: None,
            started: Instant::now(),
            limits: *limits,
            nodes: 0,
            timed_out: false,
        }
    }

    fn run(&mut self) -> SolveStatus {
        let root_feasible = (0..self.model.rows.len()).all(|r| self.row_feasible(r));
        if root_feasible {
            self.dfs(0);
        }
        match (&self.best, self.timed_out) {
            (None, _) => SolveStatus::NoSolutionFound,
            (Some(_), true) => SolveStatus::Feasible,
            (Some(_), false) => SolveStatus::Optimal,
        }
    }

    #[inline]
    fn row_feasible(&self, r: usize) -> bool {
        self.fixed_lhs[r] + self.min_rest[r] <= self.model.rows[r].bound + EPS
    }

    fn dfs(&mut self, var: usize) {
        self.nodes += 1;
        if self.out_of_budget() {
            self.timed_out = true;
        }
        if self.timed_out {
            return;
        }

        if var == self.model.num_vars {
            let improves = match &self.best {
                None => true,
                Some((best, _)) => self.fixed_obj > best + EPS,
            };
            if improves {
                self.best = Some((self.fixed_obj, self.fixed.clone()));
            }
            return;
        }

        if let Some((best, _)) = &self.best {
            let bound = self.upper_bound(var);
            let tolerance = (self.limits.max_gap * best.abs()).max(EPS);
            if bound <= best + tolerance {
                return;
            }
        }

        let first = self.model.objective[var] > 0.0;
        for choice in [first, !first] {
            if self.assign(var, choice) {
                self.dfs(var + 1);
            }
            self.unassign(var, choice);
            if self.timed_out {
                return;
            }
        }
    }

    fn out_of_budget(&self) -> bool {
        if self.limits.node_limit.is_some_and(|limit| self.nodes > limit) {
            return true;
        }
        self.nodes % DEADLINE_CHECK_INTERVAL == 1 && self.started.elapsed() >= self.limits.time_limit
    }

    /// Fix `var`; returns whether every touched row is still satisfiable
    fn assign(&mut self, var: usize, value: bool) -> bool {
        let mut feasible = true;
        for i in 0..self.occurrences[var].len() {
            let (r, coef) = self.occurrences[var][i];
            if coef < 0.0 {
                self.min_rest[r] -= coef;
            }
            if value {
                self.fixed_lhs[r] += coef;
            }
            feasible &= self.row_feasible(r);
        }
        self.fixed[var] = value;
        if value {
            self.fixed_obj += self.model.objective[var];
        }
        feasible
    }

    fn unassign(&mut self, var: usize, value: bool) {
        for &(r, coef) in &self.occurrences[var] {
            if coef < 0.0 {
                self.min_rest[r] += coef;
            }
            if value {
                self.fixed_lhs[r] -= coef;
            }
        }
        self.fixed[var] = false;
        if value {
            self.fixed_obj -= self.model.objective[var];
        }
    }

    /// A free variable can still be set to 1 without breaking any row on its own
    fn admissible(&self, var: usize) -> bool {
        self.model.objective[var] > 0.0
            && self.occurrences[var].iter().all(|&(r, coef)| {
                coef <= 0.0
                    || self.fixed_lhs[r] + self.min_rest[r] + coef
                        <= self.model.rows[r].bound + EPS
            })
    }

    /// Upper bound on the objective of any completion from `var` on
    fn upper_bound(&self, var: usize) -> f64 {
        let n = self.model.num_vars;
        let mut candidate = vec![false; n];
        let mut loose = self.fixed_obj;
        for v in var..n {
            if self.admissible(v) {
                candidate[v] = true;
                loose += self.model.objective[v];
            }
        }
        let rows = self.model.rows.len();
        let forward = self.cover_bound(&candidate, 0..rows);
        let backward = self.cover_bound(&candidate, (0..rows).rev());
        loose.min(forward).min(backward)
    }

    /// Partition candidates by the first row (in `order`) that limits them and
    /// relax every other row: each group becomes a fractional knapsack.
    fn cover_bound(&self, candidate: &[bool], order: impl Iterator<Item = usize>) -> f64 {
        let mut covered = vec![false; candidate.len()];
        let mut total = self.fixed_obj;
        for r in order {
            let row = &self.model.rows[r];
            let mut group: Vec<(usize, f64)> = row
                .terms
                .iter()
                .filter(|&&(v, coef)| coef > 0.0 && candidate[v] && !covered[v])
                .copied()
                .collect();
            if group.is_empty() {
                continue;
            }
            let mut capacity = (row.bound - self.fixed_lhs[r] - self.min_rest[r]).max(0.0);
            group.sort_by(|a, b| {
                let ra = self.model.objective[a.0] / a.1;
                let rb = self.model.objective[b.0] / b.1;
                rb.total_cmp(&ra).then(a.0.cmp(&b.0))
            });
            for (v, coef) in group {
                covered[v] = true;
                if capacity <= EPS {
                    continue;
                }
                let take = (capacity / coef).min(1.0);
                total += take * self.model.objective[v];
                capacity -= take * coef;
            }
        }
        for (v, &is_candidate) in candidate.iter().enumerate() {
            if is_candidate && !covered[v] {
                total += self.model.objective[v];
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_simple_knapsack() {
        // max 3a + 2b + 2c  s.t. a + b + c <= 2, a + b <= 1
        let mut bb = BranchAndBound::new();
        let a = bb.add_binary_var();
        let b = bb.add_binary_var();
        let c = bb.add_binary_var();
        bb.add_constraint(LinearExpr::sum([a, b, c]), 2.0);
        bb.add_constraint(LinearExpr::sum([a, b]), 1.0);
        bb.set_objective(
            Sense::Maximize,
            LinearExpr::new().term(a, 3.0).term(b, 2.0).term(c, 2.0),
        );
        let result = bb.solve(&SolveLimits::default());
        assert_eq!(result.status, SolveStatus::Optimal);
        assert_eq!(result.objective, Some(5.0));
        assert!(result.value(a) && !result.value(b) && result.value(c));
    }

    #[test]
    fn test_negative_coefficients_link_variables() {
        // x may only be 1 if y is 1: x - y <= 0; y costs via y <= 0
        let mut bb = BranchAndBound::new();
        let x = bb.add_binary_var();
        let y = bb.add_binary_var();
        bb.add_constraint(LinearExpr::new().term(x, 1.0).term(y, -1.0), 0.0);
        bb.add_constraint(LinearExpr::sum([y]), 0.0);
        bb.set_objective(Sense::Maximize, LinearExpr::sum([x]));
        let result = bb.solve(&SolveLimits::default());
        assert_eq!(result.status, SolveStatus::Optimal);
        assert_eq!(result.objective, Some(0.0));
        assert!(!result.value(x));
    }

    #[test]
    fn test_minimize() {
        // min a + b  s.t. -a - b <= -1  (at least one)
        let mut bb = BranchAndBound::new();
        let a = bb.add_binary_var();
        let b = bb.add_binary_var();
        bb.add_constraint(LinearExpr::new().term(a, -1.0).term(b, -1.0), -1.0);
        bb.set_objective(Sense::Minimize, LinearExpr::sum([a, b]));
        let result = bb.solve(&SolveLimits::default());
        assert_eq!(result.objective, Some(1.0));
    }

    #[test]
    fn test_infeasible_reports_no_solution() {
        let mut bb = BranchAndBound::new();
        let a = bb.add_binary_var();
        bb.add_constraint(LinearExpr::new().term(a, -1.0), -2.0);
        bb.set_objective(Sense::Maximize, LinearExpr::sum([a]));
        let result = bb.solve(&SolveLimits::default());
        assert_eq!(result.status, SolveStatus::NoSolutionFound);
        assert!(result.values.is_empty());
    }

    #[test]
    fn test_zero_budget_gives_up() {
        let mut bb = BranchAndBound::new();
        let a = bb.add_binary_var();
        bb.set_objective(Sense::Maximize, LinearExpr::sum([a]));
        let limits = SolveLimits {
            time_limit: Duration::ZERO,
            ..SolveLimits::default()
        };
        assert_eq!(bb.solve(&limits).status, SolveStatus::NoSolutionFound);
    }

    #[test]
    fn test_budget_after_first_leaf_keeps_incumbent() {
        // Six binaries, each row caps a pair at one: the first dive is a leaf
        // at node 7, and the node cap stops the search right after it
        let mut bb = BranchAndBound::new();
        let vars: Vec<VarId> = (0..6).map(|_| bb.add_binary_var()).collect();
        for pair in vars.chunks(2) {
            bb.add_constraint(LinearExpr::sum(pair.iter().copied()), 1.0);
        }
        bb.set_objective(Sense::Maximize, LinearExpr::sum(vars.iter().copied()));
        let limits = SolveLimits {
            node_limit: Some(7),
            ..SolveLimits::default()
        };
        let result = bb.solve(&limits);
        assert_eq!(result.status, SolveStatus::Feasible);
        assert_eq!(result.objective, Some(3.0));
        assert_eq!(result.values, vec![true, false, true, false, true, false]);
    }

    #[test]
    fn test_node_limit_before_any_leaf_finds_nothing() {
        let mut bb = BranchAndBound::new();
        let vars: Vec<VarId> = (0..4).map(|_| bb.add_binary_var()).collect();
        bb.set_objective(Sense::Maximize, LinearExpr::sum(vars.iter().copied()));
        let limits = SolveLimits {
            node_limit: Some(3),
            ..SolveLimits::default()
        };
        assert_eq!(bb.solve(&limits).status, SolveStatus::NoSolutionFound);
    }

    #[test]
    fn test_empty_program_is_optimal() {
        let mut bb = BranchAndBound::new();
        let result = bb.solve(&SolveLimits::default());
        assert_eq!(result.status, SolveStatus::Optimal);
        assert_eq!(result.objective, Some(0.0));
    }
}
