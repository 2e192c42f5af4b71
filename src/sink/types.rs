use thiserror::Error;

/// A transport failure while delivering one batch.
///
/// Fatal to the sending pipeline; no retry is performed.
#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct SendError(String);

impl SendError {
    pub fn new(message: impl Into<String>) -> Self {
        SendError(message.into())
    }
}
