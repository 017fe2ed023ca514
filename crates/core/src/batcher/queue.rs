//! Priority-partitioned FIFO queue
//!
//! Entries stay sorted by [`Priority`] (`High` first) and keep arrival order
//! within a class, so the front of the queue is always the next to dispatch.

use std::collections::VecDeque;

use batchgate_domain::Priority;

/// Queue of `T` partitioned by priority class.
#[derive(Debug)]
pub struct PriorityQueue<T> {
    entries: VecDeque<(Priority, T)>,
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self { entries: VecDeque::new() }
    }
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert behind every entry of the same or a higher class.
    pub fn push(&mut self, priority: Priority, item: T) {
        let position = self.entries.partition_point(|(queued, _)| *queued <= priority);
        self.entries.insert(position, (priority, item));
    }

    /// Remove up to `max` entries from the front.
    pub fn take_front(&mut self, max: usize) -> Vec<T> {
        let count = max.min(self.entries.len());
        self.entries.drain(..count).map(|(_, item)| item).collect()
    }

    /// Remove every entry, front to back.
    pub fn drain_all(&mut self) -> Vec<T> {
        self.entries.drain(..).map(|(_, item)| item).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Priority classes in queue order
    pub fn priorities(&self) -> impl Iterator<Item = Priority> + '_ {
        self.entries.iter().map(|(priority, _)| *priority)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(|(_, item)| item)
    }
}
