use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::batch::BatchError;
use crate::record::ParseError;
use crate::sink::SendError;

/// Outcome of one replay run.
///
/// `cancelled` is not a failure; a cancelled run simply stopped early with a
/// partial line/batch count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Data lines consumed (the header does not count).
    pub lines_read: usize,
    /// Batches successfully handed to the sink.
    pub batches_sent: usize,
    /// Whether the run stopped at a cancellation check point.
    pub cancelled: bool,
}

impl Summary {
    /// Folds the summary of a later file into this one.
    pub fn absorb(&mut self, other: Summary) {
        self.lines_read += other.lines_read;
        self.batches_sent += other.batches_sent;
        self.cancelled |= other.cancelled;
    }
}

/// Fatal errors of one replay run. Each aborts only the run it occurred in;
/// sibling runs keep going.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("{source_name}: cannot open {}: {source}", .path.display())]
    OpenSource {
        source_name: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{source_name}: failed reading line {line_number} of {}: {source}", .path.display())]
    ReadLine {
        source_name: &'static str,
        path: PathBuf,
        line_number: usize,
        #[source]
        source: io::Error,
    },

    #[error("{source_name}: invalid record at line {line_number}: {source}")]
    InvalidRecord {
        source_name: &'static str,
        line_number: usize,
        #[source]
        source: ParseError,
    },

    #[error("{source_name}: cannot serialize record at line {line_number}: {source}")]
    Serialize {
        source_name: &'static str,
        line_number: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("{source_name}: event at line {line_number} cannot fit any batch: {source}")]
    EventTooLarge {
        source_name: &'static str,
        line_number: usize,
        #[source]
        source: BatchError,
    },

    #[error("{source_name}: failed to send batch {batch_index}: {source}")]
    SendFailed {
        source_name: &'static str,
        batch_index: usize,
        #[source]
        source: SendError,
    },

    #[error("replay task failed: {0}")]
    TaskFailed(String),
}
