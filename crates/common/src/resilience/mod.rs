//! Resilience patterns shared across the batching stack
//!
//! Only backoff lives here: pacing itself (inter-request delays, flush
//! windows) is a batcher policy and stays in `batchgate-core`.

pub mod backoff;

pub use backoff::{BackoffStrategy, Jitter, RetrySchedule};
