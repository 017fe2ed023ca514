//! Priority request batching
//!
//! [`RequestBatcher`] is the scheduler; [`PriorityQueue`] is its ordering
//! policy and is usable on its own.

pub mod error;
pub mod queue;
pub mod scheduler;

pub use error::{BatchError, BatchResult};
pub use queue::PriorityQueue;
pub use scheduler::{RequestBatcher, ResponseHandle};
