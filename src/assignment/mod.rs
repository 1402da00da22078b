//! Task assignment: which defender pursues which attackers this tick

pub mod branch_bound;
pub mod program;
pub mod solver;

pub use branch_bound::BranchAndBound;
pub use program::{
    IntegerProgram, LinearExpr, Sense, SolveLimits, SolveResult, SolveStatus, VarId,
};
pub use solver::{
    Assignment, AssignmentOutcome, AssignmentSettings, AssignmentSolver, AssignmentVariant,
    MAX_ATTACKERS_PER_DEFENDER, WEAK_EDGE_WEIGHT,
};
