//! Errors settled into a caller's [`ResponseHandle`](super::ResponseHandle)

use std::time::Duration;

use batchgate_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use batchgate_common::{impl_error_classification, RATE_LIMIT_MARKER};
use batchgate_domain::{TransportError, CANCELLED_MESSAGE};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    /// The transport call for this request failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request was still queued when the queue was cleared
    #[error("{}: queue cleared before {request_id} was dispatched", CANCELLED_MESSAGE)]
    Cancelled { request_id: String },

    /// The batch setup step failed before any request was sent
    #[error("{0}")]
    Preflight(String),

    #[error("Request to {url} timed out after {}ms", .after.as_millis())]
    Timeout { url: String, after: Duration },

    /// The batcher went away without settling the request
    #[error("Request was dropped before it could be settled")]
    Dropped,

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl BatchError {
    /// Whether the message signals upstream throttling.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_rate_limited(),
            Self::Common(err) => err.is_rate_limited(),
            Self::Preflight(message) => message.contains(RATE_LIMIT_MARKER),
            _ => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

impl_error_classification!(BatchError, Common,
    Self::Transport(err) => {
        retryable: err.is_retryable(),
        severity: err.severity(),
        critical: err.is_critical(),
        retry_after: err.retry_after(),
    },
    Self::Cancelled { .. } => {
        retryable: false,
        severity: ErrorSeverity::Info,
        critical: false,
    },
    Self::Preflight(_) => {
        retryable: true,
        severity: ErrorSeverity::Warning,
        critical: false,
    },
    Self::Timeout { .. } => {
        retryable: true,
        severity: ErrorSeverity::Warning,
        critical: false,
    },
    Self::Dropped => {
        retryable: false,
        severity: ErrorSeverity::Error,
        critical: false,
    }
);

/// Result type alias for batcher operations
pub type BatchResult<T> = Result<T, BatchError>;
