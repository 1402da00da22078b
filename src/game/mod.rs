//! Game state machine and the simulation loop

pub mod batch;
pub mod episode;
pub mod snapshot;
pub mod status;

pub use batch::run_batch;
pub use episode::{Episode, EpisodeResult, TickReport};
pub use snapshot::GameSnapshot;
pub use status::{AttackerStatus, StatusMachine, StatusSummary};
