//! Game and scenario configuration with documented defaults
//!
//! Defaults reproduce the reference game: a unit-square arena, a single goal
//! rectangle, 200 Hz control for ten seconds and single-integrator agents
//! with faster defenders.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::assignment::AssignmentSettings;
use crate::core::error::{GameError, Result};
use crate::core::types::{AgentState, Role};
use crate::dynamics::DynamicsConfig;
use crate::judge::DEFAULT_EPSILON_1V2;
use crate::spatial::Region;

/// Rules and timing of one reach-avoid game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === TIMING ===
    /// Control ticks per second; one tick advances every agent by `1 / ctrl_freq`
    pub ctrl_freq: f64,

    /// Episode truncation limit in ticks
    ///
    /// The default 2000 ticks is 10 s of game time at 200 Hz.
    pub max_ticks: u64,

    // === RULES ===
    /// Planar distance at which an assigned defender captures its attacker
    pub capture_radius: f64,

    /// Attackers win on entering any of these rectangles
    pub goals: Vec<Region>,

    /// Margin on the 1-vs-2 value before the defender pair counts as winning
    ///
    /// The six dimensional tensor is coarse; values just above zero are
    /// treated as escapes.
    pub epsilon_1v2: f32,

    // === AGENTS ===
    pub attacker_dynamics: DynamicsConfig,
    pub defender_dynamics: DynamicsConfig,

    // === ASSIGNMENT ===
    pub assignment: AssignmentSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ctrl_freq: 200.0,
            max_ticks: 2000,

            capture_radius: 0.1,
            goals: vec![Region::new(0.6, 0.8, 0.1, 0.3)],
            epsilon_1v2: DEFAULT_EPSILON_1V2,

            // Defenders are 1.5x faster than attackers
            attacker_dynamics: DynamicsConfig::single_integrator(1.0),
            defender_dynamics: DynamicsConfig::single_integrator(1.5),

            assignment: AssignmentSettings::default(),
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds per tick
    pub fn dt(&self) -> f64 {
        1.0 / self.ctrl_freq
    }

    pub fn validate(&self) -> Result<()> {
        // Negated comparisons so NaN fails every check
        if !(self.ctrl_freq > 0.0 && self.ctrl_freq.is_finite()) {
            return Err(GameError::Config(format!(
                "ctrl_freq must be positive and finite, got {}",
                self.ctrl_freq
            )));
        }
        if !(self.capture_radius >= 0.0 && self.capture_radius.is_finite()) {
            return Err(GameError::Config(format!(
                "capture_radius must be non-negative and finite, got {}",
                self.capture_radius
            )));
        }
        if !self.epsilon_1v2.is_finite() {
            return Err(GameError::Config(format!(
                "epsilon_1v2 must be finite, got {}",
                self.epsilon_1v2
            )));
        }
        if let Some(bad) = self.goals.iter().find(|g| !g.is_well_formed()) {
            return Err(GameError::Config(format!("goal region {bad:?} has inverted bounds")));
        }
        self.assignment.validate()?;
        self.attacker_dynamics.validate()?;
        self.defender_dynamics.validate()?;
        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}

/// Initial placement of both teams plus the game rules they play under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub name: String,
    pub num_attackers: usize,
    pub num_defenders: usize,
    pub attackers: Vec<AgentState>,
    pub defenders: Vec<AgentState>,
    #[serde(default)]
    pub game: GameConfig,
}

impl ScenarioConfig {
    /// Scenario with default rules; counts are taken from the state lists
    pub fn new(attackers: Vec<AgentState>, defenders: Vec<AgentState>) -> Self {
        Self {
            name: String::new(),
            num_attackers: attackers.len(),
            num_defenders: defenders.len(),
            attackers,
            defenders,
            game: GameConfig::default(),
        }
    }

    pub fn with_game(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    /// Parse and validate
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let scenario: ScenarioConfig = toml::from_str(contents)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut scenario = Self::from_toml_str(&fs::read_to_string(path)?)?;
        if scenario.name.is_empty() {
            if let Some(stem) = path.file_stem() {
                scenario.name = stem.to_string_lossy().into_owned();
            }
        }
        Ok(scenario)
    }

    /// Load `data/scenarios/{name}.toml`
    pub fn load_named(name: &str) -> Result<Self> {
        Self::load(scenario_path(name))
    }

    /// Declared counts must match the supplied states, and every state must
    /// fit its team's dynamics
    pub fn validate(&self) -> Result<()> {
        self.game.validate()?;
        check_team(
            Role::Attacker,
            self.num_attackers,
            &self.attackers,
            self.game.attacker_dynamics.state_dims(),
        )?;
        check_team(
            Role::Defender,
            self.num_defenders,
            &self.defenders,
            self.game.defender_dynamics.state_dims(),
        )
    }
}

fn check_team(role: Role, declared: usize, states: &[AgentState], dims: usize) -> Result<()> {
    if declared != states.len() {
        return Err(GameError::AgentCountMismatch {
            role,
            declared,
            supplied: states.len(),
        });
    }
    for (index, state) in states.iter().enumerate() {
        if state.len() != dims {
            return Err(GameError::StateDimension {
                role,
                index,
                expected: dims,
                found: state.len(),
            });
        }
    }
    Ok(())
}

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from("data/scenarios").join(format!("{}.toml", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::AssignmentVariant;

    #[test]
    fn test_defaults_validate() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_ticks, 2000);
        assert!((config.dt() - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_partial_game_override() {
        let config = GameConfig::from_toml_str(
            r#"
            capture_radius = 0.05

            [assignment]
            variant = "extended"
            time_limit_secs = 10.0
            max_gap = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(config.capture_radius, 0.05);
        assert_eq!(config.assignment.variant, AssignmentVariant::Extended);
        assert_eq!(config.ctrl_freq, 200.0);
        assert_eq!(config.goals.len(), 1);
    }

    #[test]
    fn test_invalid_game_rejected() {
        let config = GameConfig {
            ctrl_freq: 0.0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::Config(_))));

        let config = GameConfig {
            goals: vec![Region::new(1.0, 0.0, 0.0, 1.0)],
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        for bad in [f64::NAN, f64::INFINITY] {
            let config = GameConfig {
                ctrl_freq: bad,
                ..GameConfig::default()
            };
            assert!(config.validate().is_err());
            let config = GameConfig {
                capture_radius: bad,
                ..GameConfig::default()
            };
            assert!(config.validate().is_err());
        }
        let config = GameConfig {
            attacker_dynamics: DynamicsConfig::single_integrator(f64::NAN),
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unrepresentable_time_limit_rejected() {
        for limit in ["1e20", "inf", "nan", "-1.0"] {
            let toml = format!(
                r#"
                num_attackers = 1
                num_defenders = 1
                attackers = [[-0.5, 0.0]]
                defenders = [[0.3, -0.3]]

                [game.assignment]
                time_limit_secs = {limit}
                "#
            );
            let err = ScenarioConfig::from_toml_str(&toml).unwrap_err();
            assert!(matches!(err, GameError::Config(_)), "{limit}: {err:?}");
        }
    }

    #[test]
    fn test_scenario_count_mismatch() {
        let err = ScenarioConfig::from_toml_str(
            r#"
            num_attackers = 2
            num_defenders = 1
            attackers = [[-0.5, 0.0]]
            defenders = [[0.3, -0.3]]
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GameError::AgentCountMismatch {
                role: Role::Attacker,
                declared: 2,
                supplied: 1
            }
        ));
    }

    #[test]
    fn test_scenario_state_dimension_mismatch() {
        let err = ScenarioConfig::from_toml_str(
            r#"
            num_attackers = 1
            num_defenders = 1
            attackers = [[-0.5, 0.0]]
            defenders = [[0.3, -0.3, 0.0]]
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GameError::StateDimension {
                role: Role::Defender,
                index: 0,
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn test_dubins_scenario_accepts_headings() {
        let scenario = ScenarioConfig::from_toml_str(
            r#"
            num_attackers = 1
            num_defenders = 1
            attackers = [[-0.5, 0.0, 0.0]]
            defenders = [[0.3, -0.3, 1.57]]

            [game.attacker_dynamics]
            kind = "dubins"
            speed = 0.5

            [game.defender_dynamics]
            kind = "dubins"
            speed = 1.0
            turn_rate = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(scenario.game.defender_dynamics.state_dims(), 3);
    }
}
