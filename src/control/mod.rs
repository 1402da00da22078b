//! Control synthesis for both teams

pub mod law;
pub mod synthesizer;

pub use law::{ControlLaw, HjControlLaw};
pub use synthesizer::{nearest_free_attacker, ControlSynthesizer};
