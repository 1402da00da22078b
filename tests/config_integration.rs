//! Scenario files and fail-fast configuration checks

mod common;

use reach_avoid::assignment::AssignmentVariant;
use reach_avoid::core::types::{Configuration, Role};
use reach_avoid::dynamics::DynamicsConfig;
use reach_avoid::game::Episode;
use reach_avoid::value::ValueFunctionStore;
use reach_avoid::{GameError, ScenarioConfig};

#[test]
fn test_bundled_scenarios_load() {
    for name in ["1vs1", "2vs1", "8vs4", "1vs2"] {
        let scenario = ScenarioConfig::load_named(name)
            .unwrap_or_else(|e| panic!("scenario {name} failed to load: {e}"));
        assert_eq!(scenario.name, name);
        assert_eq!(scenario.attackers.len(), scenario.num_attackers);
    }
    let big = ScenarioConfig::load_named("8vs4").unwrap();
    assert_eq!(big.game.max_ticks, 300);
    assert_eq!(big.game.capture_radius, 0.1);

    let pair = ScenarioConfig::load_named("1vs2").unwrap();
    assert_eq!(pair.game.assignment.variant, AssignmentVariant::Extended);
}

#[test]
fn test_count_mismatch_fails_before_loop() {
    let store = common::store(
        common::idle_1v0(),
        common::escape_1v1(),
        common::escape_2v1(),
    );
    let mut scenario = ScenarioConfig::new(vec![vec![0.0, 0.0]], vec![vec![0.5, 0.0]]);
    scenario.num_defenders = 2;
    let err = Episode::new(&scenario, &store).err().unwrap();
    assert!(matches!(
        err,
        GameError::AgentCountMismatch {
            role: Role::Defender,
            declared: 2,
            supplied: 1
        }
    ));
}

#[test]
fn test_dynamics_must_match_store() {
    let store = common::store(
        common::idle_1v0(),
        common::escape_1v1(),
        common::escape_2v1(),
    );
    let mut scenario = ScenarioConfig::new(vec![vec![0.0, 0.0, 0.0]], vec![vec![0.5, 0.0, 0.0]]);
    scenario.game.attacker_dynamics = DynamicsConfig::dubins(1.0, 1.0);
    scenario.game.defender_dynamics = DynamicsConfig::dubins(1.5, 1.0);
    assert!(matches!(
        Episode::new(&scenario, &store),
        Err(GameError::Config(_))
    ));
}

#[test]
fn test_missing_value_function_fails_fast() {
    let store = ValueFunctionStore::new(2, 2)
        .with(Configuration::OneVsZero, common::idle_1v0())
        .unwrap()
        .with(Configuration::OneVsOne, common::escape_1v1())
        .unwrap();
    let scenario = ScenarioConfig::new(vec![vec![0.0, 0.0]], vec![vec![0.5, 0.0]]);
    assert!(matches!(
        Episode::new(&scenario, &store),
        Err(GameError::MissingValueFunction(Configuration::TwoVsOne))
    ));
}

#[test]
fn test_store_rejects_wrong_dimensionality() {
    let mut store = ValueFunctionStore::new(2, 2);
    let err = store
        .insert(Configuration::TwoVsOne, common::escape_1v1())
        .unwrap_err();
    assert!(matches!(err, GameError::TensorShape { .. }));
}
