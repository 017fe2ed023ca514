//! Observability primitives
//!
//! Subscriber setup and structured logging helpers. Every crate logs through
//! `tracing` macros; binaries and tests call [`init_tracing`] once.

pub mod logging;

pub use logging::{error_label, init_tracing, log_request_outcome, LoggingError};
