//! Independent episodes run in parallel over one shared value-function store

use rayon::prelude::*;

use crate::core::config::ScenarioConfig;
use crate::core::error::Result;
use crate::game::episode::{Episode, EpisodeResult};
use crate::value::ValueFunctionStore;

/// Run independent episodes in parallel against one shared store.
/// Results come back in scenario order.
pub fn run_batch(
    scenarios: &[ScenarioConfig],
    store: &ValueFunctionStore,
) -> Vec<Result<EpisodeResult>> {
    tracing::info!("Running {} episodes", scenarios.len());
    scenarios
        .par_iter()
        .map(|scenario| Episode::new(scenario, store)?.run())
        .collect()
}
