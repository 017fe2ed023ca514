//! Scriptable in-memory transport
//!
//! Records every call with the (paused) Tokio clock so tests can assert on
//! dispatch order, pacing and concurrency.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use batchgate_core::Transport;
use batchgate_domain::{HttpMethod, TransportError, TransportResponse, TransportResult};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::time::Instant;

pub type Outcome = Result<Value, TransportError>;

/// One observed transport call
#[derive(Debug, Clone)]
pub struct Call {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<Value>,
    pub at: Instant,
}

#[derive(Default)]
struct Script {
    queued: VecDeque<Outcome>,
    fallback: Option<Outcome>,
}

#[derive(Default)]
pub struct MockTransport {
    scripts: Mutex<HashMap<String, Script>>,
    hanging: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Call>>,
    latency: Mutex<Duration>,
    preflight_failure: Mutex<Option<TransportError>>,
    preflight_sizes: Mutex<Vec<usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `url` with `outcome` once scripted answers run out
    pub fn respond(&self, url: &str, outcome: Outcome) -> &Self {
        self.scripts.lock().entry(url.to_string()).or_default().fallback = Some(outcome);
        self
    }

    /// Answer the next calls to `url` with `outcomes`, in order
    pub fn respond_sequence(&self, url: &str, outcomes: Vec<Outcome>) -> &Self {
        self.scripts.lock().entry(url.to_string()).or_default().queued.extend(outcomes);
        self
    }

    /// Calls to `url` never complete
    pub fn hang_on(&self, url: &str) -> &Self {
        self.hanging.lock().insert(url.to_string());
        self
    }

    pub fn set_latency(&self, latency: Duration) -> &Self {
        *self.latency.lock() = latency;
        self
    }

    /// Fail the next pre-flight check only
    pub fn fail_next_preflight(&self, err: TransportError) -> &Self {
        *self.preflight_failure.lock() = Some(err);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_urls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|call| call.url.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn preflight_sizes(&self) -> Vec<usize> {
        self.preflight_sizes.lock().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_outcome(&self, url: &str) -> Outcome {
        let mut scripts = self.scripts.lock();
        match scripts.get_mut(url) {
            Some(script) => match script.queued.pop_front() {
                Some(outcome) => outcome,
                None => script.fallback.clone().unwrap_or_else(|| Ok(default_payload(url))),
            },
            None => Ok(default_payload(url)),
        }
    }

    async fn handle(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
    ) -> TransportResult<TransportResponse> {
        self.calls.lock().push(Call {
            method,
            url: url.to_string(),
            body: body.cloned(),
            at: Instant::now(),
        });

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.hanging.lock().contains(url) {
            std::future::pending::<()>().await;
        }

        let outcome = self.next_outcome(url);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome.map(TransportResponse::ok)
    }
}

fn default_payload(url: &str) -> Value {
    json!({ "success": true, "data": { "url": url } })
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> TransportResult<TransportResponse> {
        self.handle(HttpMethod::Get, url, None).await
    }

    async fn post(&self, url: &str, body: Option<&Value>) -> TransportResult<TransportResponse> {
        self.handle(HttpMethod::Post, url, body).await
    }

    async fn put(&self, url: &str, body: Option<&Value>) -> TransportResult<TransportResponse> {
        self.handle(HttpMethod::Put, url, body).await
    }

    async fn patch(&self, url: &str, body: Option<&Value>) -> TransportResult<TransportResponse> {
        self.handle(HttpMethod::Patch, url, body).await
    }

    async fn delete(&self, url: &str) -> TransportResult<TransportResponse> {
        self.handle(HttpMethod::Delete, url, None).await
    }

    async fn prepare_batch(&self, batch_len: usize) -> TransportResult<()> {
        self.preflight_sizes.lock().push(batch_len);
        match self.preflight_failure.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
