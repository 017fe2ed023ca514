//! Verb-oriented facade over the batcher

use batchgate_domain::{
    BatchRequest, BatcherMetrics, Envelope, HttpMethod, QueueStatus, RequestOptions,
};
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, instrument};

use super::error::{ApiError, ApiResult};
use crate::batcher::RequestBatcher;

/// Conventional async API on top of a [`RequestBatcher`].
///
/// Every call goes through the batcher queue; responses are unwrapped from
/// their `{success, data, error}` envelope and decoded into the caller's
/// type.
#[derive(Debug, Clone)]
pub struct ApiClient {
    batcher: RequestBatcher,
}

impl ApiClient {
    pub fn new(batcher: RequestBatcher) -> Self {
        Self { batcher }
    }

    pub fn batcher(&self) -> &RequestBatcher {
        &self.batcher
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str, options: RequestOptions) -> ApiResult<T> {
        self.request(HttpMethod::Get, url, None, options).await
    }

    pub async fn post<T, B>(&self, url: &str, data: &B, options: RequestOptions) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_with_body(HttpMethod::Post, url, data, options).await
    }

    pub async fn put<T, B>(&self, url: &str, data: &B, options: RequestOptions) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_with_body(HttpMethod::Put, url, data, options).await
    }

    pub async fn patch<T, B>(&self, url: &str, data: &B, options: RequestOptions) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_with_body(HttpMethod::Patch, url, data, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.request(HttpMethod::Delete, url, None, options).await
    }

    async fn send_with_body<T, B>(
        &self,
        method: HttpMethod,
        url: &str,
        data: &B,
        options: RequestOptions,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = match serde_json::to_value(data) {
            Ok(body) => body,
            Err(err) => return Err(log_failure(method, url, err.into())),
        };
        self.request(method, url, Some(body), options).await
    }

    /// Type-erased entry point shared by every verb.
    ///
    /// Failures are logged with method and url before being returned.
    #[instrument(level = "debug", skip(self, method, data, options), fields(method = %method))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: &str,
        data: Option<Value>,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.execute(method, url, data, options).await.map_err(|err| log_failure(method, url, err))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: &str,
        data: Option<Value>,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let payload = self.batcher.add_request(url, method, data, options).await?;
        let value = unwrap_envelope(payload)?;
        serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// Run every request concurrently through the queue.
    ///
    /// Results come back in input order; the first failure fails the call.
    pub async fn batch(&self, requests: Vec<BatchRequest>) -> ApiResult<Vec<Value>> {
        try_join_all(requests.into_iter().map(|request| async move {
            let options = RequestOptions::with_priority(request.priority);
            self.request::<Value>(request.method, &request.url, request.data, options).await
        }))
        .await
    }

    pub fn get_queue_status(&self) -> QueueStatus {
        self.batcher.get_queue_status()
    }

    pub fn clear_queue(&self) -> usize {
        self.batcher.clear_queue()
    }

    pub fn metrics(&self) -> BatcherMetrics {
        self.batcher.metrics()
    }
}

/// Turn a transport payload into the `data` it carries.
pub fn unwrap_envelope(payload: Value) -> ApiResult<Value> {
    if !payload.is_object() {
        return Err(ApiError::Decode("expected a response envelope object".to_string()));
    }
    let envelope: Envelope =
        serde_json::from_value(payload).map_err(|err| ApiError::Decode(err.to_string()))?;
    envelope.into_result().map_err(ApiError::Envelope)
}

fn log_failure(method: HttpMethod, url: &str, err: ApiError) -> ApiError {
    error!(method = %method, url, error = %err, "API request failed");
    err
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unwrap_success() {
        let data = unwrap_envelope(json!({"success": true, "data": [1]})).unwrap();
        assert_eq!(data, json!([1]));
    }

    #[test]
    fn test_unwrap_failure_uses_error_text() {
        let err = unwrap_envelope(json!({"success": false, "error": "Too many requests"}))
            .unwrap_err();
        assert_eq!(err, ApiError::Envelope("Too many requests".into()));
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_unwrap_failure_fallback() {
        let err = unwrap_envelope(json!({"success": false})).unwrap_err();
        assert_eq!(err.to_string(), "Request failed");
    }

    #[test]
    fn test_unwrap_rejects_non_object() {
        assert!(matches!(unwrap_envelope(json!([1, 2])), Err(ApiError::Decode(_))));
    }
}
