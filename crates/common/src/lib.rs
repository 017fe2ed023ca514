//! Modular common utilities shared across batchgate crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error classification, serde helpers, enum macros
//! - `observability`: tracing subscriber setup and log helpers
//! - `runtime`: resilience primitives (backoff, jitter, retry schedules)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
#[macro_use]
pub mod utils;

// Observability tier
// -----------------------------------------------------------------
#[cfg(feature = "observability")]
pub mod observability;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{
    retry_after_minutes, CommonError, CommonResult, ErrorClassification, ErrorSeverity,
    RATE_LIMIT_MARKER,
};
#[cfg(feature = "observability")]
pub use observability::{init_tracing, LoggingError};
#[cfg(feature = "runtime")]
pub use resilience::{BackoffStrategy, Jitter, RetrySchedule};
#[cfg(feature = "foundation")]
pub use utils::serde::{duration_millis, option_duration_millis};
