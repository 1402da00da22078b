//! One reach-avoid episode: the fixed per-tick pipeline
//!
//! judge -> assign -> defender control -> defender step -> attacker control
//! -> attacker step -> status update. Every tick appends an immutable
//! snapshot to the episode history.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::assignment::{AssignmentSolver, AssignmentVariant, SolveStatus};
use crate::control::{ControlSynthesizer, HjControlLaw};
use crate::core::config::{GameConfig, ScenarioConfig};
use crate::core::error::{GameError, Result};
use crate::core::types::{AgentState, Configuration, Tick};
use crate::game::snapshot::GameSnapshot;
use crate::game::status::{AttackerStatus, StatusMachine, StatusSummary};
use crate::judge::OutcomeEvaluator;
use crate::value::ValueFunctionStore;

/// Reward from the defenders' point of view
pub const TICK_REWARD: f64 = -1.0;
pub const CAPTURE_REWARD: f64 = 10.0;
pub const ARRIVAL_REWARD: f64 = -10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number of the snapshot this tick produced
    pub tick: Tick,
    pub reward: f64,
    pub newly_captured: Vec<usize>,
    pub newly_arrived: Vec<usize>,
    pub solve_status: SolveStatus,
    /// Every attacker is captured or arrived
    pub terminated: bool,
    /// Tick limit reached first
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub name: String,
    pub ticks: Tick,
    pub statuses: Vec<AttackerStatus>,
    pub summary: StatusSummary,
    pub total_reward: f64,
    pub terminated: bool,
    pub truncated: bool,
}

/// Exported trajectory log
#[derive(Debug, Serialize)]
struct EpisodeLog<'e> {
    name: &'e str,
    dt: f64,
    snapshots: &'e [GameSnapshot],
}

pub struct Episode<'a> {
    name: String,
    config: GameConfig,
    store: &'a ValueFunctionStore,
    law: HjControlLaw,
    evaluator: OutcomeEvaluator,
    solver: AssignmentSolver,
    machine: StatusMachine,
    attackers: Vec<AgentState>,
    defenders: Vec<AgentState>,
    statuses: Vec<AttackerStatus>,
    tick: Tick,
    total_reward: f64,
    history: Vec<GameSnapshot>,
}

impl<'a> Episode<'a> {
    /// Validate the scenario against the store and record the initial
    /// snapshot. Attackers starting inside a goal are already ARRIVED.
    pub fn new(scenario: &ScenarioConfig, store: &'a ValueFunctionStore) -> Result<Self> {
        scenario.validate()?;
        let config = scenario.game.clone();

        let attacker_dims = config.attacker_dynamics.state_dims();
        let defender_dims = config.defender_dynamics.state_dims();
        if store.attacker_dims() != attacker_dims || store.defender_dims() != defender_dims {
            return Err(GameError::Config(format!(
                "value functions are built for {}D attackers and {}D defenders, dynamics give {}D and {}D",
                store.attacker_dims(),
                store.defender_dims(),
                attacker_dims,
                defender_dims
            )));
        }
        for configuration in [
            Configuration::OneVsZero,
            Configuration::OneVsOne,
            Configuration::TwoVsOne,
        ] {
            store.get(configuration)?;
        }

        let machine = StatusMachine::new(config.capture_radius, config.goals.clone());
        let statuses = machine.check_arrivals(
            &scenario.attackers,
            &vec![AttackerStatus::Free; scenario.attackers.len()],
        );
        for (i, status) in statuses.iter().enumerate() {
            if !status.is_free() {
                tracing::info!("Attacker {} starts inside the goal", i);
            }
        }

        let initial = GameSnapshot {
            tick: 0,
            attackers: scenario.attackers.clone(),
            defenders: scenario.defenders.clone(),
            statuses: statuses.clone(),
            assignment: None,
        };

        tracing::info!(
            "Episode '{}' ready: {} attackers vs {} defenders, {:?} assignment",
            scenario.name,
            scenario.num_attackers,
            scenario.num_defenders,
            config.assignment.variant
        );

        Ok(Self {
            name: scenario.name.clone(),
            law: HjControlLaw::new(
                config.attacker_dynamics.build(),
                config.defender_dynamics.build(),
            ),
            evaluator: OutcomeEvaluator::new(config.epsilon_1v2),
            solver: AssignmentSolver::new(config.assignment),
            machine,
            attackers: scenario.attackers.clone(),
            defenders: scenario.defenders.clone(),
            statuses,
            tick: 0,
            total_reward: 0.0,
            history: vec![initial],
            config,
            store,
        })
    }

    pub fn tick_count(&self) -> Tick {
        self.tick
    }

    pub fn statuses(&self) -> &[AttackerStatus] {
        &self.statuses
    }

    pub fn attackers(&self) -> &[AgentState] {
        &self.attackers
    }

    pub fn defenders(&self) -> &[AgentState] {
        &self.defenders
    }

    pub fn history(&self) -> &[GameSnapshot] {
        &self.history
    }

    /// Latest snapshot
    pub fn snapshot(&self) -> &GameSnapshot {
        // history always holds at least the initial snapshot
        &self.history[self.history.len() - 1]
    }

    pub fn is_terminated(&self) -> bool {
        self.statuses.iter().all(|s| s.is_terminal())
    }

    pub fn is_truncated(&self) -> bool {
        !self.is_terminated() && self.tick >= self.config.max_ticks
    }

    /// Advance the game by one control tick
    pub fn tick(&mut self) -> Result<TickReport> {
        let dt = self.config.dt();
        let num_defenders = self.defenders.len();

        let escapes =
            self.evaluator
                .escape_sets(self.store, &self.attackers, &self.defenders, &self.statuses)?;
        let outcome = self.solver.solve(num_defenders, &self.statuses, &escapes);
        tracing::debug!("Tick {}: assignment {:?}", self.tick, outcome.assignment.0);

        let synthesizer = ControlSynthesizer::new(self.store, &self.law)
            .cooperative(self.config.assignment.variant == AssignmentVariant::Extended);

        let defender_controls = synthesizer.defender_controls(
            &self.attackers,
            &self.defenders,
            &self.statuses,
            &outcome.assignment,
        )?;
        let defender_dynamics = self.law.defender_dynamics();
        for (state, control) in self.defenders.iter_mut().zip(&defender_controls) {
            *state = defender_dynamics.step(state, control, dt);
        }

        let attacker_controls = synthesizer.attacker_controls(&self.attackers, &self.statuses)?;
        let attacker_dynamics = self.law.attacker_dynamics();
        for ((state, control), status) in self
            .attackers
            .iter_mut()
            .zip(&attacker_controls)
            .zip(&self.statuses)
        {
            // Captured and arrived attackers stay where they stopped
            if status.is_free() {
                *state = attacker_dynamics.step(state, control, dt);
            }
        }

        let next = self.machine.update(
            &self.attackers,
            &self.defenders,
            &self.statuses,
            &outcome.assignment,
        );
        let mut newly_captured = Vec::new();
        let mut newly_arrived = Vec::new();
        for (i, (before, after)) in self.statuses.iter().zip(&next).enumerate() {
            if before == after {
                continue;
            }
            match after {
                AttackerStatus::Captured => {
                    tracing::info!("Tick {}: attacker {} captured", self.tick + 1, i);
                    newly_captured.push(i);
                }
                AttackerStatus::Arrived => {
                    tracing::info!("Tick {}: attacker {} arrived", self.tick + 1, i);
                    newly_arrived.push(i);
                }
                AttackerStatus::Free => {}
            }
        }
        self.statuses = next;
        self.tick += 1;

        let reward = TICK_REWARD
            + CAPTURE_REWARD * newly_captured.len() as f64
            + ARRIVAL_REWARD * newly_arrived.len() as f64;
        self.total_reward += reward;

        self.history.push(GameSnapshot {
            tick: self.tick,
            attackers: self.attackers.clone(),
            defenders: self.defenders.clone(),
            statuses: self.statuses.clone(),
            assignment: Some(outcome.assignment),
        });

        Ok(TickReport {
            tick: self.tick,
            reward,
            newly_captured,
            newly_arrived,
            solve_status: outcome.status,
            terminated: self.is_terminated(),
            truncated: self.is_truncated(),
        })
    }

    /// Tick until every attacker is terminal or the tick limit is reached
    pub fn run(&mut self) -> Result<EpisodeResult> {
        while !self.is_terminated() && !self.is_truncated() {
            self.tick()?;
        }
        let result = self.result();
        tracing::info!(
            "Episode '{}' over after {} ticks ({:.3}s): captured {:?}, arrived {:?}",
            self.name,
            result.ticks,
            result.ticks as f64 * self.config.dt(),
            result.summary.captured,
            result.summary.arrived
        );
        Ok(result)
    }

    pub fn result(&self) -> EpisodeResult {
        EpisodeResult {
            name: self.name.clone(),
            ticks: self.tick,
            statuses: self.statuses.clone(),
            summary: StatusSummary::from_statuses(&self.statuses),
            total_reward: self.total_reward,
            terminated: self.is_terminated(),
            truncated: self.is_truncated(),
        }
    }

    /// Snapshot history as JSON
    pub fn to_json(&self) -> Result<String> {
        let log = EpisodeLog {
            name: &self.name,
            dt: self.config.dt(),
            snapshots: &self.history,
        };
        Ok(serde_json::to_string_pretty(&log)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
