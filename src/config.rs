use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use thiserror::Error;

/// Default batch capacity in bytes (128 KiB).
pub const DEFAULT_BATCH_CAPACITY: usize = 131_072;

/// Tunables shared by every replay pipeline.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ReplayConfig {
    /// Maximum aggregate payload size of one batch, in bytes.
    #[builder(default = "DEFAULT_BATCH_CAPACITY")]
    pub batch_capacity: usize,

    /// Lower bound of the randomized inter-batch delay.
    #[builder(default = "100")]
    pub min_delay_ms: u64,

    /// Upper bound of the randomized inter-batch delay.
    #[builder(default = "1000")]
    pub max_delay_ms: u64,

    /// Progress lines are emitted every this many batches.
    #[builder(default = "10")]
    pub progress_interval: usize,

    /// Overall deadline after which all pipelines are cancelled.
    /// `None` runs until the sources are exhausted.
    #[builder(default)]
    pub run_for: Option<Duration>,
}

impl ReplayConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.batch_capacity == Some(0) {
            return Err("batch_capacity must be greater than zero".to_string());
        }
        if self.progress_interval == Some(0) {
            return Err("progress_interval must be greater than zero".to_string());
        }
        let min = self.min_delay_ms.unwrap_or(100);
        let max = self.max_delay_ms.unwrap_or(1000);
        if min > max {
            return Err(format!(
                "min_delay_ms ({min}) must not exceed max_delay_ms ({max})"
            ));
        }
        Ok(())
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        ReplayConfig {
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            min_delay_ms: 100,
            max_delay_ms: 1000,
            progress_interval: 10,
            run_for: None,
        }
    }
}

/// Errors raised before any pipeline starts. Fails the whole process fast.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ReplayConfigBuilderError),

    #[error("invalid endpoint `{endpoint}`: {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    #[error("cannot read data directory {}: {source}", .dir.display())]
    DataDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{prefix} file must be named {prefix}_<index>: {}", .path.display())]
    SourceFileName { prefix: String, path: PathBuf },

    #[error("no {prefix} files found in {}", .dir.display())]
    NoSourceFiles { prefix: String, dir: PathBuf },
}
