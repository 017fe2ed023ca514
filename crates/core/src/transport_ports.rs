//! Port interface for the single-request transport

use async_trait::async_trait;
use batchgate_domain::{HttpMethod, TransportResponse, TransportResult};
use serde_json::Value;

/// Sends one HTTP request.
///
/// Base URL resolution, authentication and error-response shaping belong to
/// the implementation. The batcher only sees a payload or a
/// [`TransportError`](batchgate_domain::TransportError).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> TransportResult<TransportResponse>;

    async fn post(&self, url: &str, body: Option<&Value>) -> TransportResult<TransportResponse>;

    async fn put(&self, url: &str, body: Option<&Value>) -> TransportResult<TransportResponse>;

    async fn patch(&self, url: &str, body: Option<&Value>) -> TransportResult<TransportResponse>;

    async fn delete(&self, url: &str) -> TransportResult<TransportResponse>;

    /// Dispatch by verb
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
    ) -> TransportResult<TransportResponse> {
        match method {
            HttpMethod::Get => self.get(url).await,
            HttpMethod::Post => self.post(url, body).await,
            HttpMethod::Put => self.put(url, body).await,
            HttpMethod::Patch => self.patch(url, body).await,
            HttpMethod::Delete => self.delete(url).await,
        }
    }

    /// Called once before a batch of `batch_len` requests is dispatched.
    ///
    /// An error rejects every request of that batch.
    async fn prepare_batch(&self, _batch_len: usize) -> TransportResult<()> {
        Ok(())
    }
}
