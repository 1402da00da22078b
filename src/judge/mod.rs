//! Outcome judgment between small agent groups

pub mod outcome;

pub use outcome::{defender_wins, EscapeSets, OutcomeEvaluator, DEFAULT_EPSILON_1V2};
