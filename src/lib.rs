//! # replay-rust
//!
//! Replays historical taxi trip records from files into a message-ingestion
//! endpoint at a throttled rate, simulating a live stream of events for
//! downstream testing.
//!
//! ## Features
//!
//! - **Size-bounded batch partitioning** with greedy, order-preserving packing
//! - **Throttled, cancellable replay pipelines**, one per input source
//! - **Decoupled progress logging** so slow console I/O never backpressures
//!   the producers
//! - **Graceful cancellation** via deadline or Ctrl-C
//!
//! ## Modules
//!
//! - [`batch`] - Size-bounded batch partitioning of serialized events
//! - [`console`] - Non-blocking, ordered progress-log sink
//! - [`pipeline`] - Per-source replay pipeline and the orchestrator
//! - [`record`] - Taxi record parsing and event serialization
//! - [`sink`] - Transport seam batches are handed to
//! - [`source`] - Source-file discovery

pub mod batch;
pub mod config;
pub mod console;
pub mod pipeline;
pub mod record;
pub mod sink;
pub mod source;
