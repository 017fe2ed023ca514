//! Read-only batcher snapshots

use serde::{Deserialize, Serialize};

use crate::config::BatchConfig;

/// Snapshot returned by `get_queue_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub queue_length: usize,
    pub processing: bool,
    pub config: BatchConfig,
}

/// Cumulative counters since the batcher was built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatcherMetrics {
    pub enqueued: u64,
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub batches_drained: u64,
    pub largest_batch: usize,
}
