use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;

use super::types::SendError;
use super::EventSink;
use crate::batch::Batch;
use crate::config::ConfigError;

/// Sink delivering batches to an HTTP ingestion endpoint.
///
/// A batch is posted as one `application/x-ndjson` body, one event payload
/// per line. Keyed batches carry their key in the `x-partition-key` header.
#[derive(Debug)]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSink {
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        Ok(HttpSink {
            client: reqwest::Client::new(),
            endpoint,
        })
    }
}

#[async_trait]
impl EventSink for HttpSink {
    async fn send(&self, batch: Batch) -> Result<(), SendError> {
        let mut body = Vec::with_capacity(batch.size() + batch.len());
        for event in batch.events() {
            body.extend_from_slice(event.payload());
            body.push(b'\n');
        }

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(body);
        if let Some(key) = batch.partition_key() {
            request = request.header("x-partition-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SendError::new(e.to_string()))?;
        response
            .error_for_status()
            .map_err(|e| SendError::new(e.to_string()))?;
        Ok(())
    }
}
