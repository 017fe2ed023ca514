//! Composition root
//!
//! Wires one HTTP transport, one batcher and one facade from an
//! [`AppConfig`]. Callers keep the returned [`ApiClient`] (or clones of it)
//! for the lifetime of the process so every request shares the same queue.

use std::sync::Arc;

use batchgate_common::observability::{init_tracing, LoggingError};
use batchgate_core::{ApiClient, RequestBatcher};
use batchgate_domain::{AppConfig, LoggingConfig};
use tracing::info;

use crate::errors::InfraResult;
use crate::http::HttpTransport;

/// Install the global subscriber described by `config`.
///
/// A set `RUST_LOG` wins over the configured filter.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => None,
        _ => Some(config.filter.as_str()),
    };
    init_tracing(filter, config.json)
}

/// Batcher over a fresh [`HttpTransport`]. Queueing on it needs a Tokio
/// runtime.
pub fn build_batcher(config: &AppConfig) -> InfraResult<RequestBatcher> {
    config.validate()?;
    let transport = HttpTransport::new(&config.api)?;
    info!(
        base_url = transport.base_url(),
        max_batch_size = config.batch.max_batch_size,
        max_wait_ms = config.batch.max_wait_time.as_millis() as u64,
        "request batcher ready"
    );
    Ok(RequestBatcher::new(Arc::new(transport), config.batch.clone())?)
}

pub fn build_api_client(config: &AppConfig) -> InfraResult<ApiClient> {
    Ok(ApiClient::new(build_batcher(config)?))
}
