pub mod orchestrator;
pub mod pipeline;
pub mod types;

pub use orchestrator::{Orchestrator, ReplayRunner, RunOutcome};
pub use pipeline::run_source;
pub use types::{IngestionError, Summary};
