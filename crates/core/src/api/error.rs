//! Facade errors

use batchgate_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use batchgate_common::{impl_error_classification, impl_error_conversion, RATE_LIMIT_MARKER};
use thiserror::Error;

use crate::batcher::BatchError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// The envelope reported `success: false`
    #[error("{0}")]
    Envelope(String),

    /// The payload did not have the expected shape
    #[error("Unexpected response format: {0}")]
    Decode(String),

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl ApiError {
    /// Whether the message signals upstream throttling.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::Batch(err) => err.is_rate_limited(),
            Self::Envelope(message) => message.contains(RATE_LIMIT_MARKER),
            Self::Common(err) => err.is_rate_limited(),
            Self::Decode(_) => false,
        }
    }
}

impl_error_conversion!(ApiError, Common);

impl_error_classification!(ApiError, Common,
    Self::Batch(err) => {
        retryable: err.is_retryable(),
        severity: err.severity(),
        critical: err.is_critical(),
        retry_after: err.retry_after(),
    },
    Self::Envelope(message) => {
        retryable: message.contains(RATE_LIMIT_MARKER),
        severity: ErrorSeverity::Warning,
        critical: false,
    },
    Self::Decode(_) => {
        retryable: false,
        severity: ErrorSeverity::Error,
        critical: false,
    }
);

/// Result type alias for facade operations
pub type ApiResult<T> = Result<T, ApiError>;
