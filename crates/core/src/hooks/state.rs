//! Observable hook state and hook options

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use batchgate_common::resilience::{BackoffStrategy, RetrySchedule};
use batchgate_domain::BatchConfig;

/// What a consumer renders from
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
    /// Consecutive retries since the last success
    pub retry_count: u32,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self { data: None, loading: false, error: None, retry_count: 0 }
    }
}

/// Callback invoked with every error a hook surfaces
pub type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Behaviour knobs of a hook
#[derive(Clone)]
pub struct HookOptions {
    /// Fetch on activation and on dependency changes
    pub enabled: bool,
    /// Automatic retries for throttled fetches
    pub retry_attempts: u32,
    /// Base of the linear retry backoff
    pub retry_delay: Duration,
    pub on_error: Option<ErrorCallback>,
}

impl Default for HookOptions {
    fn default() -> Self {
        Self::from_config(&BatchConfig::default())
    }
}

impl fmt::Debug for HookOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookOptions")
            .field("enabled", &self.enabled)
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_delay", &self.retry_delay)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl HookOptions {
    /// Retry policy taken from the batcher configuration
    pub fn from_config(config: &BatchConfig) -> Self {
        Self {
            enabled: true,
            retry_attempts: config.retry_attempts,
            retry_delay: config.retry_delay,
            on_error: None,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// `retry_delay * (n + 1)` for the n-th consecutive retry
    pub(crate) fn schedule(&self) -> RetrySchedule {
        RetrySchedule::new(self.retry_attempts, BackoffStrategy::linear(self.retry_delay))
    }
}
