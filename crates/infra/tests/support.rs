#![allow(dead_code)]

use std::time::Duration;

use batchgate_core::ApiClient;
use batchgate_domain::{ApiConfig, AppConfig, BatchConfig};
use batchgate_infra::build_api_client;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "test-token";

/// Tight pacing so end-to-end tests run against a real clock quickly.
pub fn fast_batch_config() -> BatchConfig {
    BatchConfig {
        max_wait_time: Duration::from_millis(10),
        item_delay: Duration::from_millis(5),
        inter_batch_delay: Duration::from_millis(5),
        retry_delay: Duration::from_millis(20),
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

pub fn app_config(server: &MockServer) -> AppConfig {
    AppConfig {
        api: ApiConfig {
            base_url: format!("{}/api", server.uri()),
            token: Some(TEST_TOKEN.to_string()),
            ..Default::default()
        },
        batch: fast_batch_config(),
        ..Default::default()
    }
}

pub fn client_for(server: &MockServer) -> ApiClient {
    build_api_client(&app_config(server)).expect("api client should build")
}

pub fn ok_envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}
