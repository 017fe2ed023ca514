use std::time::Duration;

use batchgate_common::resilience::{BackoffStrategy, Jitter, RetrySchedule};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::{InfraError, InfraResult};

/// HTTP client with built-in retry and timeout support.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    schedule: RetrySchedule,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> InfraResult<Self> {
        Self::builder().build()
    }

    /// Total attempts per call, counting the first one
    pub fn max_attempts(&self) -> usize {
        self.schedule.max_retries as usize + 1
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// Connection failures, timeouts and 5xx responses are retried until the
    /// attempt budget runs out; the last 5xx response is returned as is.
    pub async fn send(&self, builder: RequestBuilder) -> InfraResult<Response> {
        let mut retries = 0u32;

        loop {
            let request = builder
                .try_clone()
                .ok_or_else(|| {
                    InfraError::Config(
                        "request body cannot be cloned; buffer the body to enable retries".into(),
                    )
                })?
                .build()?;

            let method = request.method().clone();
            let url = request.url().clone();
            let attempt = retries + 1;
            debug!(attempt, %method, %url, "sending HTTP request");

            let delay = match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, %method, %url, %status, "received HTTP response");

                    match self.schedule.next_delay(retries) {
                        Some(delay) if status.is_server_error() => delay,
                        _ => return Ok(response),
                    }
                }
                Err(err) => {
                    debug!(attempt, %method, %url, error = %err, "HTTP request failed");

                    match self.schedule.next_delay(retries) {
                        Some(delay) if should_retry_error(&err) => delay,
                        _ => return Err(err.into()),
                    }
                }
            };

            retries += 1;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    max_backoff: Duration,
    jitter: Jitter,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(10),
            jitter: Jitter::Equal,
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    pub fn jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> InfraResult<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build()?;
        let retries = u32::try_from(self.max_attempts.max(1) - 1).unwrap_or(u32::MAX);
        let schedule = RetrySchedule::new(
            retries,
            BackoffStrategy::exponential(self.base_backoff, self.max_backoff),
        )
        .with_jitter(self.jitter);

        Ok(HttpClient { client, schedule })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
