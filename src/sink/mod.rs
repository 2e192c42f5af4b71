pub mod http;
pub mod types;

pub use http::HttpSink;
pub use types::SendError;

use async_trait::async_trait;

use crate::batch::Batch;

/// Transport endpoint accepting batches of serialized events.
///
/// `send` must be awaited before the same pipeline hands over its next batch;
/// pipelines never overlap sends.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn send(&self, batch: Batch) -> Result<(), SendError>;
}

#[async_trait]
impl<F, Fut> EventSink for F
where
    F: Fn(Batch) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<(), SendError>> + Send,
{
    async fn send(&self, batch: Batch) -> Result<(), SendError> {
        self(batch).await
    }
}
