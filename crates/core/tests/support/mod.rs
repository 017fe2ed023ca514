//! Shared test helpers for `batchgate-core` integration tests.

#![allow(dead_code)]

pub mod mock_transport;

use std::sync::Arc;
use std::time::Duration;

use batchgate_core::{ApiClient, RequestBatcher};
use batchgate_domain::BatchConfig;
use serde_json::{json, Value};

pub use mock_transport::{Call, MockTransport};

/// `{success: true, data}`
pub fn ok_envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

/// `{success: false, error}`
pub fn err_envelope(error: &str) -> Value {
    json!({ "success": false, "error": error })
}

/// Default pacing with a custom batch size
pub fn config_with_batch_size(max_batch_size: usize) -> BatchConfig {
    BatchConfig { max_batch_size, ..Default::default() }
}

pub fn batcher(transport: &Arc<MockTransport>, config: BatchConfig) -> RequestBatcher {
    RequestBatcher::new(transport.clone(), config).expect("valid batch config")
}

pub fn api_client(transport: &Arc<MockTransport>, config: BatchConfig) -> ApiClient {
    ApiClient::new(batcher(transport, config))
}

pub fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}
