pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{GameConfig, ScenarioConfig};
pub use error::{GameError, Result};
pub use logging::init_tracing;
pub use types::{AgentState, Configuration, Control, Role, Tick};
