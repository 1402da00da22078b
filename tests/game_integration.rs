//! End-to-end games on synthetic value functions
//!
//! The tensors here are small hand-built fields whose outcome is known in
//! advance, so each test can check the whole tick pipeline.

mod common;

use reach_avoid::assignment::{AssignmentSolver, SolveStatus};
use reach_avoid::control::{ControlSynthesizer, HjControlLaw};
use reach_avoid::dynamics::DynamicsConfig;
use reach_avoid::game::{run_batch, AttackerStatus, Episode};
use reach_avoid::judge::OutcomeEvaluator;
use reach_avoid::ScenarioConfig;

/// Attacker at (-0.4, 0) runs for the goal, defender at (0.5, 0) cannot win
#[test]
fn test_scenario_attacker_escapes_and_arrives() {
    let store = common::store(
        common::seeking_1v0(),
        common::escape_1v1(),
        common::escape_2v1(),
    );
    let scenario = ScenarioConfig::load_named("1vs1").unwrap();
    let mut episode = Episode::new(&scenario, &store).unwrap();
    let result = episode.run().unwrap();

    assert_eq!(result.statuses, vec![AttackerStatus::Arrived]);
    assert!(result.terminated);
    assert!(result.ticks < scenario.game.max_ticks);
    assert!(episode
        .history()
        .iter()
        .all(|s| s.statuses[0] != AttackerStatus::Captured));

    // Escape every tick: the defender is never assigned and never moves
    assert_eq!(episode.defenders()[0], vec![0.5, 0.0]);
    assert!((result.total_reward - (-(result.ticks as f64) - 10.0)).abs() < 1e-9);
}

/// Idle attacker is run down by a faster defender that wins the 1v1 game
#[test]
fn test_assigned_defender_captures() {
    let store = common::store(
        common::idle_1v0(),
        common::chasing_1v1(),
        common::capture_2v1(),
    );
    let scenario = ScenarioConfig::new(vec![vec![-0.4, 0.0]], vec![vec![0.5, 0.0]]);
    let mut episode = Episode::new(&scenario, &store).unwrap();

    let first = episode.tick().unwrap();
    assert_eq!(first.solve_status, SolveStatus::Optimal);
    assert!(first.newly_captured.is_empty());
    assert!(episode.defenders()[0][0] < 0.5);
    assert_eq!(episode.attackers()[0], vec![-0.4, 0.0]);

    let result = episode.run().unwrap();
    assert_eq!(result.statuses, vec![AttackerStatus::Captured]);
    assert_eq!(result.summary.captured, vec![0]);
    assert!((result.total_reward - (10.0 - result.ticks as f64)).abs() < 1e-9);
}

/// A pair escaping both one-on-one and together leaves the defender idle
#[test]
fn test_scenario_escaping_pair_leaves_defender_unassigned() {
    let store = common::store(
        common::idle_1v0(),
        common::escape_1v1(),
        common::escape_2v1(),
    );
    let scenario = ScenarioConfig::load_named("2vs1").unwrap();
    let statuses = vec![AttackerStatus::Free; 2];

    let escapes = OutcomeEvaluator::default()
        .escape_sets(&store, &scenario.attackers, &scenario.defenders, &statuses)
        .unwrap();
    assert_eq!(escapes.p2[0], vec![(0, 1)]);

    let outcome = AssignmentSolver::default().solve(1, &statuses, &escapes);
    assert!(outcome.assignment.attackers_of(0).is_empty());

    let law = HjControlLaw::new(
        DynamicsConfig::single_integrator(1.0).build(),
        DynamicsConfig::single_integrator(1.5).build(),
    );
    let controls = ControlSynthesizer::new(&store, &law)
        .defender_controls(
            &scenario.attackers,
            &scenario.defenders,
            &statuses,
            &outcome.assignment,
        )
        .unwrap();
    assert_eq!(controls, vec![vec![0.0, 0.0]]);

    let mut episode = Episode::new(&scenario, &store).unwrap();
    episode.tick().unwrap();
    let snapshot = episode.snapshot();
    assert_eq!(snapshot.defenders, scenario.defenders);
    assert_eq!(
        snapshot.assignment.as_ref().map(|a| a.total()),
        Some(0)
    );
}

/// An attacker starting in the goal is ARRIVED before the first tick
#[test]
fn test_scenario_attacker_starts_in_goal() {
    let store = common::store(
        common::seeking_1v0(),
        common::escape_1v1(),
        common::escape_2v1(),
    );
    let scenario = ScenarioConfig::new(
        vec![vec![0.7, 0.2], vec![-0.4, 0.0]],
        vec![vec![0.5, 0.0]],
    );
    let mut episode = Episode::new(&scenario, &store).unwrap();
    assert_eq!(episode.tick_count(), 0);
    assert_eq!(
        episode.snapshot().statuses,
        vec![AttackerStatus::Arrived, AttackerStatus::Free]
    );

    episode.tick().unwrap();
    assert_eq!(episode.statuses()[0], AttackerStatus::Arrived);
    assert_eq!(episode.attackers()[0], vec![0.7, 0.2]);
    assert_ne!(episode.attackers()[1], vec![-0.4, 0.0]);

    // Alone in the goal: nothing left to play
    let lone = ScenarioConfig::new(vec![vec![0.7, 0.2]], vec![vec![0.5, 0.0]]);
    let result = Episode::new(&lone, &store).unwrap().run().unwrap();
    assert_eq!(result.ticks, 0);
    assert!(result.terminated);
    assert_eq!(result.summary.arrived, vec![0]);
}

#[test]
fn test_statuses_are_monotonic() {
    let store = common::store(
        common::seeking_1v0(),
        common::chasing_1v1(),
        common::capture_2v1(),
    );
    let scenario = ScenarioConfig::load_named("8vs4").unwrap();
    let mut episode = Episode::new(&scenario, &store).unwrap();
    let result = episode.run().unwrap();

    assert!(result.terminated || result.truncated);
    assert!(result.ticks <= scenario.game.max_ticks);
    let history = episode.history();
    assert_eq!(history.len() as u64, result.ticks + 1);
    for pair in history.windows(2) {
        assert_eq!(pair[1].tick, pair[0].tick + 1);
        for (before, after) in pair[0].statuses.iter().zip(&pair[1].statuses) {
            if before.is_terminal() {
                assert_eq!(before, after);
            }
        }
        // Frozen attackers keep their final position
        for (i, status) in pair[0].statuses.iter().enumerate() {
            if status.is_terminal() {
                assert_eq!(pair[0].attackers[i], pair[1].attackers[i]);
            }
        }
    }
}

#[test]
fn test_judge_and_assign_are_deterministic() {
    let store = common::store(
        common::idle_1v0(),
        common::mixed_1v1(),
        common::mixed_2v1(),
    );
    let scenario = ScenarioConfig::load_named("8vs4").unwrap();
    let statuses = vec![AttackerStatus::Free; scenario.num_attackers];
    let evaluator = OutcomeEvaluator::default();
    let solver = AssignmentSolver::default();

    let first = evaluator
        .escape_sets(&store, &scenario.attackers, &scenario.defenders, &statuses)
        .unwrap();
    let second = evaluator
        .escape_sets(&store, &scenario.attackers, &scenario.defenders, &statuses)
        .unwrap();
    assert_eq!(first, second);

    let a = solver.solve(scenario.num_defenders, &statuses, &first);
    let b = solver.solve(scenario.num_defenders, &statuses, &second);
    assert_eq!(a.assignment, b.assignment);
    assert_eq!(a.objective, b.objective);
}

#[test]
fn test_batch_matches_sequential_runs() {
    let store = common::store(
        common::seeking_1v0(),
        common::escape_1v1(),
        common::escape_2v1(),
    );
    let scenarios = vec![
        ScenarioConfig::load_named("1vs1").unwrap(),
        ScenarioConfig::load_named("2vs1").unwrap(),
    ];
    let batch = run_batch(&scenarios, &store);
    assert_eq!(batch.len(), 2);
    for (scenario, result) in scenarios.iter().zip(batch) {
        let sequential = Episode::new(scenario, &store).unwrap().run().unwrap();
        assert_eq!(result.unwrap(), sequential);
    }
}

#[test]
fn test_history_exports_as_json() {
    let store = common::store(
        common::idle_1v0(),
        common::chasing_1v1(),
        common::capture_2v1(),
    );
    let scenario = ScenarioConfig::new(vec![vec![-0.4, 0.0]], vec![vec![0.5, 0.0]]);
    let mut episode = Episode::new(&scenario, &store).unwrap();
    for _ in 0..3 {
        episode.tick().unwrap();
    }
    let json: serde_json::Value = serde_json::from_str(&episode.to_json().unwrap()).unwrap();
    let snapshots = json["snapshots"].as_array().unwrap();
    assert_eq!(snapshots.len(), 4);
    assert!(snapshots[0]["assignment"].is_null());
    assert_eq!(snapshots[3]["tick"], 3);
}

/// Neither defender wins alone but the pair does: the extended variant
/// assigns the attacker to both and steers them with the 1-vs-2 field
#[test]
fn test_extended_variant_pursues_jointly() {
    use reach_avoid::assignment::AssignmentVariant;
    use reach_avoid::core::types::Configuration;

    let store = common::store(
        common::idle_1v0(),
        common::escape_1v1(),
        common::escape_2v1(),
    )
    .with(Configuration::OneVsTwo, common::pincer_1v2())
    .unwrap();

    let extended = ScenarioConfig::load_named("1vs2").unwrap();
    let mut scenario = extended.clone();
    scenario.game.assignment.variant = AssignmentVariant::Basic;
    let mut idle = Episode::new(&scenario, &store).unwrap();
    idle.tick().unwrap();
    assert_eq!(idle.defenders(), scenario.defenders.as_slice());

    let mut episode = Episode::new(&extended, &store).unwrap();
    episode.tick().unwrap();
    let snapshot = episode.snapshot();
    let assignment = snapshot.assignment.as_ref().unwrap();
    assert_eq!(assignment.defenders_of(0), vec![0, 1]);

    let (d0, d1) = (&snapshot.defenders[0], &snapshot.defenders[1]);
    assert!(d0[0] > -0.5 && d0[1] < 0.8);
    assert!(d1[0] > -0.5 && d1[1] > -0.6);
}
