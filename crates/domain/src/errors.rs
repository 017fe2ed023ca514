//! Errors raised at the transport boundary

use std::time::Duration;

use batchgate_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use batchgate_common::{impl_error_classification, impl_error_conversion};
use thiserror::Error;

/// Failure of a single transport call.
///
/// The display text of each variant is what ends up in a hook's `error`
/// state, so it is written for end users.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Non-success HTTP status other than 429
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The upstream answered 429
    #[error("{}", rate_limit_message(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// The request never produced a response
    #[error("{0}")]
    Network(String),

    /// The response could not be interpreted
    #[error("{0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Common(#[from] CommonError),
}

fn rate_limit_message(retry_after: &Option<Duration>) -> String {
    CommonError::RateLimitExceeded { retry_after: *retry_after }.to_string()
}

impl TransportError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Whether the message signals upstream throttling.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Common(err) => err.is_rate_limited(),
            other => other.to_string().contains(batchgate_common::RATE_LIMIT_MARKER),
        }
    }
}

impl_error_conversion!(TransportError, Common);

impl_error_classification!(TransportError, Common,
    Self::Http { status, .. } => {
        retryable: *status >= 500,
        severity: ErrorSeverity::Error,
        critical: false,
    },
    Self::RateLimited { retry_after } => {
        retryable: true,
        severity: ErrorSeverity::Warning,
        critical: false,
        retry_after: *retry_after,
    },
    Self::Network(_) => {
        retryable: true,
        severity: ErrorSeverity::Warning,
        critical: false,
    },
    Self::InvalidResponse(_) => {
        retryable: false,
        severity: ErrorSeverity::Error,
        critical: false,
    }
);

/// Result type alias for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;
