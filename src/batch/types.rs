use thiserror::Error;

/// Errors that can occur while partitioning events into batches.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// A single event is larger than the batch capacity and can never be
    /// packed. The event appears in no batch.
    #[error("event of {size} bytes exceeds batch capacity of {capacity} bytes")]
    EventTooLarge { size: usize, capacity: usize },
}
