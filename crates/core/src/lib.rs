//! # batchgate Core
//!
//! Request scheduling logic - no network code.
//!
//! This crate contains:
//! - The [`Transport`] port the scheduler sends through
//! - The request batcher (priority queue, flush policy, pacing)
//! - The API facade (verbs, envelope unwrap, composite loads)
//! - Data-fetching hooks with throttling-aware retry
//!
//! ## Architecture Principles
//! - Only depends on `batchgate-common` and `batchgate-domain`
//! - All I/O goes through [`Transport`]

pub mod api;
pub mod batcher;
pub mod hooks;

// Infrastructure ports
pub mod transport_ports;

pub use api::{ApiClient, ApiError, ApiResult, JobData, ProfileData};
pub use batcher::{BatchError, BatchResult, PriorityQueue, RequestBatcher, ResponseHandle};
pub use hooks::{BatchFetch, Fetch, Hook, HookOptions, ResourceState, SingleFetch};
pub use transport_ports::Transport;
