//! Infrastructure errors

mod conversions;

use batchgate_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use batchgate_common::{impl_error_classification, impl_error_conversion};
use thiserror::Error;

pub use conversions::IntoTransportError;

#[derive(Error, Debug)]
pub enum InfraError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP stack failed before a response was received
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl_error_conversion!(InfraError, Common);

impl_error_classification!(InfraError, Common,
    Self::Config(_) => {
        retryable: false,
        severity: ErrorSeverity::Error,
        critical: true,
    },
    Self::Http(err) => {
        retryable: err.is_connect() || err.is_timeout(),
        severity: ErrorSeverity::Warning,
        critical: false,
    }
);

/// Result type alias for infrastructure operations
pub type InfraResult<T> = Result<T, InfraError>;
