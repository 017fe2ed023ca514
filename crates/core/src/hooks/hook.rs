//! Lifecycle-bound data fetching
//!
//! A [`Hook`] is mounted with [`Hook::activate`] and unmounted by
//! [`Hook::deactivate`] or by dropping it. While mounted it fetches through
//! the facade, publishes `{data, loading, error}` on a watch channel and
//! retries throttled fetches with linear backoff.

use std::sync::{Arc, Weak};

use batchgate_common::observability::error_label;
use batchgate_domain::KeyedRequest;
use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::fetch::{BatchFetch, Fetch, SingleFetch};
use super::state::{HookOptions, ResourceState};
use crate::api::ApiClient;

#[derive(Debug, Default)]
struct Control {
    active: bool,
    enabled: bool,
    /// Bumped by every externally triggered fetch and by unmounting; results
    /// of older generations are dropped.
    generation: u64,
    retry_count: u32,
    retry_task: Option<JoinHandle<()>>,
}

impl Control {
    fn next_generation(&mut self) -> u64 {
        if let Some(task) = self.retry_task.take() {
            task.abort();
        }
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

struct HookInner<F: Fetch> {
    api: ApiClient,
    fetcher: Mutex<Arc<F>>,
    options: HookOptions,
    control: Mutex<Control>,
    state: watch::Sender<ResourceState<F::Output>>,
}

/// Data-fetching hook driving one [`Fetch`] through the facade
pub struct Hook<F: Fetch> {
    inner: Arc<HookInner<F>>,
}

impl<F: Fetch> Hook<F> {
    pub fn new(api: ApiClient, fetcher: F, options: HookOptions) -> Self {
        let (state, _) = watch::channel(ResourceState::default());
        let control = Control { enabled: options.enabled, ..Default::default() };
        Self {
            inner: Arc::new(HookInner {
                api,
                fetcher: Mutex::new(Arc::new(fetcher)),
                options,
                control: Mutex::new(control),
                state,
            }),
        }
    }

    /// Mount: fetch if enabled and wait for the first attempt.
    pub async fn activate(&self) {
        let generation = {
            let mut control = self.inner.control.lock();
            control.active = true;
            if !control.enabled {
                return;
            }
            control.next_generation()
        };
        HookInner::fetch_once(Arc::clone(&self.inner), generation).await;
    }

    /// Unmount: cancel pending retries and ignore in-flight results.
    pub fn deactivate(&self) {
        let mut control = self.inner.control.lock();
        control.active = false;
        control.next_generation();
        self.inner.state.send_modify(|state| state.loading = false);
    }

    /// Reset the retry count and fetch unconditionally.
    ///
    /// Works on an unmounted hook too; its result is published, but a
    /// throttled response is not retried automatically.
    pub async fn refetch(&self) {
        let generation = {
            let mut control = self.inner.control.lock();
            control.retry_count = 0;
            control.next_generation()
        };
        self.inner.state.send_modify(|state| state.retry_count = 0);
        HookInner::fetch_once(Arc::clone(&self.inner), generation).await;
    }

    /// Fetch again if the retry cap allows it. Returns whether a fetch ran.
    pub async fn retry(&self) -> bool {
        let generation = {
            let mut control = self.inner.control.lock();
            if control.retry_count >= self.inner.options.retry_attempts {
                return false;
            }
            control.retry_count += 1;
            let retry_count = control.retry_count;
            self.inner.state.send_modify(|state| state.retry_count = retry_count);
            control.next_generation()
        };
        HookInner::fetch_once(Arc::clone(&self.inner), generation).await;
        true
    }

    /// Toggle the `enabled` dependency.
    ///
    /// Enabling a mounted hook fetches; disabling cancels pending work.
    pub async fn set_enabled(&self, enabled: bool) {
        let generation = {
            let mut control = self.inner.control.lock();
            if control.enabled == enabled {
                return;
            }
            control.enabled = enabled;
            let generation = control.next_generation();
            if !enabled || !control.active {
                drop(control);
                self.inner.state.send_modify(|state| state.loading = false);
                return;
            }
            generation
        };
        HookInner::fetch_once(Arc::clone(&self.inner), generation).await;
    }

    /// Replace what is fetched and re-run if mounted and enabled.
    pub async fn set_fetcher(&self, fetcher: F) {
        *self.inner.fetcher.lock() = Arc::new(fetcher);
        let generation = {
            let mut control = self.inner.control.lock();
            if !control.active || !control.enabled {
                return;
            }
            control.retry_count = 0;
            control.next_generation()
        };
        HookInner::fetch_once(Arc::clone(&self.inner), generation).await;
    }

    /// What the hook currently fetches
    pub fn fetcher(&self) -> Arc<F> {
        Arc::clone(&*self.inner.fetcher.lock())
    }

    /// Current snapshot
    pub fn state(&self) -> ResourceState<F::Output> {
        self.inner.state.borrow().clone()
    }

    pub fn data(&self) -> Option<F::Output> {
        self.inner.state.borrow().data.clone()
    }

    pub fn loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<F::Output>> {
        self.inner.state.subscribe()
    }

    /// Wait until no fetch or automatic retry is outstanding.
    pub async fn settled(&self) -> ResourceState<F::Output> {
        let mut receiver = self.subscribe();
        let settled = match receiver.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }
}

impl<T> Hook<SingleFetch<T>>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Change the `url` dependency
    pub async fn set_url(&self, url: impl Into<String>) {
        let options = self.fetcher().options;
        self.set_fetcher(SingleFetch::new(url, options)).await;
    }
}

impl Hook<BatchFetch> {
    /// Change the request list dependency
    pub async fn set_requests(&self, requests: Vec<KeyedRequest>) {
        self.set_fetcher(BatchFetch::new(requests)).await;
    }
}

impl<F: Fetch> Drop for Hook<F> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl<F: Fetch> HookInner<F> {
    fn fetch_once(this: Arc<Self>, generation: u64) -> BoxFuture<'static, ()> {
        async move {
            {
                let control = this.control.lock();
                if control.generation != generation {
                    return;
                }
                this.state.send_modify(|state| state.loading = true);
            }
            let fetcher = Arc::clone(&*this.fetcher.lock());
            let result = fetcher.fetch(&this.api).await;

            let mut control = this.control.lock();
            if control.generation != generation {
                debug!(generation, "discarding superseded fetch result");
                return;
            }

            match result {
                Ok(data) => {
                    control.retry_count = 0;
                    drop(control);
                    this.state.send_modify(|state| {
                        state.data = Some(data);
                        state.loading = false;
                        state.error = None;
                        state.retry_count = 0;
                    });
                }
                Err(err) => {
                    let message = err.to_string();
                    // Unmounted hooks surface throttling instead of retrying.
                    let delay = if err.is_rate_limited() && control.active {
                        this.options.schedule().next_delay(control.retry_count)
                    } else {
                        None
                    };

                    if let Some(delay) = delay {
                        control.retry_count += 1;
                        let retry_count = control.retry_count;
                        warn!(
                            retry_count,
                            delay_ms = delay.as_millis() as u64,
                            "rate limited, scheduling automatic retry"
                        );
                        control.retry_task =
                            Some(Self::schedule_retry(Arc::downgrade(&this), generation, delay));
                        drop(control);
                        this.state.send_modify(|state| state.retry_count = retry_count);
                        return;
                    }

                    drop(control);
                    debug!(error = %err, label = error_label(&err), "fetch failed");
                    this.state.send_modify(|state| {
                        state.loading = false;
                        state.error = Some(message.clone());
                    });
                    if let Some(callback) = &this.options.on_error {
                        callback(&message);
                    }
                }
            }
        }
        .boxed()
    }

    fn schedule_retry(
        weak: Weak<Self>,
        generation: u64,
        delay: std::time::Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                Self::fetch_once(inner, generation).await;
            }
        })
    }
}
