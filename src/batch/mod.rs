pub mod event;
pub mod partitioner;
pub mod types;

pub use event::{Batch, SerializedEvent};
pub use partitioner::{partition, BatchPartitioner, Partition};
pub use types::BatchError;
