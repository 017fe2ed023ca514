//! Tracing subscriber initialization and structured log helpers

use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{ErrorClassification, ErrorSeverity};

/// Default filter when neither the caller nor `RUST_LOG` provides one
pub const DEFAULT_FILTER: &str = "batchgate=info";

/// Failure to install the global subscriber
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoggingError {
    /// The filter directive string could not be parsed
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),
    /// A global subscriber was already installed
    #[error("tracing subscriber already initialized")]
    AlreadyInitialized,
}

/// Install the global tracing subscriber.
///
/// `filter` takes precedence over `RUST_LOG`; an empty filter falls back to
/// `RUST_LOG` and then to [`DEFAULT_FILTER`]. With `json` set, events are
/// emitted as one JSON object per line.
pub fn init_tracing(filter: Option<&str>, json: bool) -> Result<(), LoggingError> {
    let filter = build_filter(filter)?;

    let result = if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_target(true))
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).try_init()
    };

    result.map_err(|_| LoggingError::AlreadyInitialized)
}

fn build_filter(filter: Option<&str>) -> Result<EnvFilter, LoggingError> {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|err| LoggingError::InvalidFilter(err.to_string())),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Log the outcome of a single dispatched request with structured fields.
///
/// Callers must not forward query strings carrying credentials in `url`.
#[inline]
pub fn log_request_outcome(method: &str, url: &str, elapsed: Duration, success: bool) {
    let duration_ms = elapsed.as_millis() as u64;

    if success {
        info!(method, url, duration_ms, "request_completed");
    } else {
        warn!(method, url, duration_ms, "request_failed");
    }
}

/// Stable label for an error, suitable for log fields.
#[inline]
pub fn error_label<E: ErrorClassification>(error: &E) -> &'static str {
    if error.is_retryable() {
        return "retryable";
    }
    match error.severity() {
        ErrorSeverity::Info => "info",
        ErrorSeverity::Warning => "warning",
        ErrorSeverity::Error => "error",
        ErrorSeverity::Critical => "critical",
    }
}
