//! The request batcher
//!
//! Requests are queued by priority class and drained in bounded batches.
//! Items of a batch go to the transport one at a time with `item_delay`
//! between sends; every caller is settled once the whole batch has been
//! attempted.
//!
//! Queue, `processing` latch, flush timer and metrics share one mutex, so
//! the decision to drain is atomic with the enqueue that triggered it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use batchgate_common::error::CommonResult;
use batchgate_common::observability::log_request_outcome;
use batchgate_domain::{
    BatchConfig, BatcherMetrics, HttpMethod, Priority, QueueStatus, RequestOptions,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::{BatchError, BatchResult};
use super::queue::PriorityQueue;
use crate::transport_ports::Transport;

/// One pending unit of work
#[derive(Debug)]
struct QueuedRequest {
    id: String,
    url: String,
    method: HttpMethod,
    body: Option<Value>,
    timeout: Option<Duration>,
    created_at: DateTime<Utc>,
    settle: oneshot::Sender<BatchResult<Value>>,
}

impl QueuedRequest {
    fn settle(self, outcome: BatchResult<Value>) {
        // The caller may have dropped its handle; nothing left to notify.
        let _ = self.settle.send(outcome);
    }
}

#[derive(Debug, Default)]
struct State {
    queue: PriorityQueue<QueuedRequest>,
    processing: bool,
    timer: Option<JoinHandle<()>>,
    timer_generation: u64,
    metrics: BatcherMetrics,
}

impl State {
    fn cancel_timer(&mut self) {
        self.timer_generation = self.timer_generation.wrapping_add(1);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct Inner {
    transport: Arc<dyn Transport>,
    config: BatchConfig,
    state: Mutex<State>,
}

/// Shared handle to one batching scheduler.
///
/// Cloning is cheap and every clone feeds the same queue. All methods that
/// may schedule work must run inside a Tokio runtime.
#[derive(Clone)]
pub struct RequestBatcher {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for RequestBatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBatcher").field("status", &self.get_queue_status()).finish()
    }
}

impl RequestBatcher {
    /// Build a batcher, rejecting configs that could never dispatch.
    pub fn new(transport: Arc<dyn Transport>, config: BatchConfig) -> CommonResult<Self> {
        config.validate()?;
        let state = Mutex::new(State::default());
        Ok(Self { inner: Arc::new(Inner { transport, config, state }) })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.inner.config
    }

    /// Queue a request and return a handle that resolves with its payload.
    ///
    /// Insertion and the flush decision happen before this returns; no I/O
    /// is performed on the caller's task.
    pub fn add_request(
        &self,
        url: impl Into<String>,
        method: HttpMethod,
        body: Option<Value>,
        options: RequestOptions,
    ) -> ResponseHandle {
        let (tx, rx) = oneshot::channel();
        let request = QueuedRequest {
            id: Uuid::now_v7().to_string(),
            url: url.into(),
            method,
            body,
            timeout: options.timeout,
            created_at: Utc::now(),
            settle: tx,
        };
        let id = request.id.clone();

        let mut state = self.inner.state.lock();
        debug!(
            request_id = %id,
            method = %request.method,
            url = %request.url,
            priority = %options.priority,
            queue_length = state.queue.len() + 1,
            "request queued"
        );
        state.queue.push(options.priority, request);
        state.metrics.enqueued += 1;
        Inner::schedule(&self.inner, &mut state);

        ResponseHandle { id, rx }
    }

    /// Shorthand for [`add_request`](Self::add_request) with only a priority
    pub fn enqueue(
        &self,
        url: impl Into<String>,
        method: HttpMethod,
        body: Option<Value>,
        priority: Priority,
    ) -> ResponseHandle {
        self.add_request(url, method, body, RequestOptions::with_priority(priority))
    }

    pub fn get_queue_status(&self) -> QueueStatus {
        let state = self.inner.state.lock();
        QueueStatus {
            queue_length: state.queue.len(),
            processing: state.processing,
            config: self.inner.config.clone(),
        }
    }

    pub fn metrics(&self) -> BatcherMetrics {
        self.inner.state.lock().metrics
    }

    /// Reject every queued request with a cancellation error.
    ///
    /// Requests already handed to the transport are not affected. Returns
    /// the number of cancelled requests.
    pub fn clear_queue(&self) -> usize {
        let cancelled = {
            let mut state = self.inner.state.lock();
            state.cancel_timer();
            let cancelled = state.queue.drain_all();
            state.metrics.cancelled += cancelled.len() as u64;
            cancelled
        };

        let count = cancelled.len();
        for request in cancelled {
            let request_id = request.id.clone();
            request.settle(Err(BatchError::Cancelled { request_id }));
        }

        info!(cancelled = count, "request queue cleared");
        count
    }
}

impl Inner {
    /// Decide what the queue needs after an insertion. Called with the lock
    /// held.
    fn schedule(this: &Arc<Self>, state: &mut State) {
        if state.processing {
            return;
        }

        if state.queue.len() >= this.config.max_batch_size {
            state.cancel_timer();
            Self::start_drain(this, state);
            return;
        }

        state.cancel_timer();
        let generation = state.timer_generation;
        let wait = this.config.max_wait_time;
        let weak = Arc::downgrade(this);
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            if let Some(inner) = weak.upgrade() {
                Self::fire_timer(&inner, generation);
            }
        }));
    }

    fn fire_timer(this: &Arc<Self>, generation: u64) {
        let mut state = this.state.lock();
        if state.timer_generation != generation {
            return;
        }
        state.timer = None;
        if state.processing || state.queue.is_empty() {
            return;
        }
        Self::start_drain(this, &mut state);
    }

    /// Follow-up drain after `inter_batch_delay`
    fn resume(this: &Arc<Self>) {
        let mut state = this.state.lock();
        if state.processing || state.queue.is_empty() {
            return;
        }
        state.cancel_timer();
        Self::start_drain(this, &mut state);
    }

    fn start_drain(this: &Arc<Self>, state: &mut State) {
        state.processing = true;
        let batch = state.queue.take_front(this.config.max_batch_size);
        state.metrics.batches_drained += 1;
        state.metrics.largest_batch = state.metrics.largest_batch.max(batch.len());

        let inner = Arc::clone(this);
        tokio::spawn(async move {
            let guard = DrainGuard { inner };
            guard.inner.process_batch(batch).await;
        });
    }

    async fn process_batch(&self, batch: Vec<QueuedRequest>) {
        let size = batch.len();
        let started = Instant::now();
        info!(size, "draining batch");

        if let Err(err) = self.transport.prepare_batch(size).await {
            warn!(size, error = %err, "batch pre-flight failed");
            let message = err.to_string();
            self.record_outcomes(0, size);
            for request in batch {
                request.settle(Err(BatchError::Preflight(message.clone())));
            }
            return;
        }
        self.state.lock().metrics.dispatched += size as u64;

        let mut outcomes = Vec::with_capacity(size);
        for (index, request) in batch.iter().enumerate() {
            if index > 0 && !self.config.item_delay.is_zero() {
                tokio::time::sleep(self.config.item_delay).await;
            }
            outcomes.push(self.dispatch(request).await);
        }

        let succeeded = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        self.record_outcomes(succeeded, size - succeeded);
        for (request, outcome) in batch.into_iter().zip(outcomes) {
            request.settle(outcome);
        }

        info!(
            size,
            succeeded,
            failed = size - succeeded,
            duration_ms = started.elapsed().as_millis() as u64,
            "batch drained"
        );
    }

    async fn dispatch(&self, request: &QueuedRequest) -> BatchResult<Value> {
        let timeout = request.timeout.unwrap_or(self.config.request_timeout);
        let started = Instant::now();
        debug!(
            request_id = %request.id,
            queued_ms = (Utc::now() - request.created_at).num_milliseconds(),
            "dispatching request"
        );

        let call = self.transport.send(request.method, &request.url, request.body.as_ref());
        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(response)) => Ok(response.data),
            Ok(Err(err)) => {
                if err.is_rate_limited() {
                    warn!(url = %request.url, error = %err, "upstream is throttling requests");
                }
                Err(BatchError::Transport(err))
            }
            Err(_) => Err(BatchError::Timeout { url: request.url.clone(), after: timeout }),
        };

        log_request_outcome(
            request.method.as_str(),
            &request.url,
            started.elapsed(),
            outcome.is_ok(),
        );
        outcome
    }

    fn record_outcomes(&self, succeeded: usize, failed: usize) {
        let mut state = self.state.lock();
        state.metrics.succeeded += succeeded as u64;
        state.metrics.failed += failed as u64;
    }

    /// Release the latch and schedule the next drain if backlog remains.
    fn finish_batch(this: &Arc<Self>) {
        let mut state = this.state.lock();
        state.processing = false;
        if state.queue.is_empty() {
            return;
        }

        let delay = this.config.inter_batch_delay;
        let weak = Arc::downgrade(this);
        debug!(backlog = state.queue.len(), "scheduling follow-up drain");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                Self::resume(&inner);
            }
        });
    }
}

/// Releases the `processing` latch even if a drain task unwinds.
struct DrainGuard {
    inner: Arc<Inner>,
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        Inner::finish_batch(&self.inner);
    }
}

/// Future resolving to the settled outcome of one queued request
#[derive(Debug)]
#[must_use = "the request is still sent, but its outcome is lost if the handle is dropped"]
pub struct ResponseHandle {
    id: String,
    rx: oneshot::Receiver<BatchResult<Value>>,
}

impl ResponseHandle {
    /// Traceability id assigned at enqueue time
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Future for ResponseHandle {
    type Output = BatchResult<Value>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(BatchError::Dropped)))
    }
}
