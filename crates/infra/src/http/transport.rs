//! reqwest-backed implementation of the `Transport` port
//!
//! Relative request paths are joined onto the configured base URL. Error
//! responses are turned into [`TransportError`]s whose text can be shown to
//! end users as is; successful bodies that are empty or not JSON become a
//! failed envelope so the facade rejects them the usual way.

use std::time::Duration;

use async_trait::async_trait;
use batchgate_common::CommonError;
use batchgate_core::Transport;
use batchgate_domain::{
    ApiConfig, Envelope, HttpMethod, TransportError, TransportResponse, TransportResult,
    DEFAULT_RETRY_AFTER_SECS, EMPTY_RESPONSE_MESSAGE, INVALID_JSON_MESSAGE,
    REQUEST_FAILED_MESSAGE, SERVER_UNAVAILABLE_MESSAGE,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::client::HttpClient;
use crate::errors::{InfraResult, IntoTransportError};

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: HttpClient,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    /// Build a transport and its HTTP client from `config`.
    pub fn new(config: &ApiConfig) -> InfraResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(config.max_attempts)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self::with_client(config, client))
    }

    /// Use an already configured client.
    pub fn with_client(config: &ApiConfig, client: HttpClient) -> Self {
        Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|token| !token.trim().is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`; absolute inputs are used unchanged.
    pub fn resolve(&self, path: &str) -> TransportResult<Url> {
        let target = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        };

        Url::parse(&target).map_err(|err| {
            TransportError::Common(CommonError::validation_with_value(
                "url",
                err.to_string(),
                target.clone(),
            ))
        })
    }

    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> TransportResult<TransportResponse> {
        let url = self.resolve(path)?;
        let mut request = self.client.request(to_reqwest(method), url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.client.send(request).await.map_err(IntoTransportError::into_transport)?;
        let status = response.status();
        let retry_after = retry_after_header(response.headers());
        let text = response.text().await.map_err(IntoTransportError::into_transport)?;

        let shaped = shape_response(status, retry_after, &text);
        if let Err(err) = &shaped {
            if err.is_rate_limited() {
                warn!(%method, path, status = status.as_u16(), "upstream rate limit hit");
            } else {
                debug!(%method, path, status = status.as_u16(), error = %err, "request rejected");
            }
        }
        shaped
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> TransportResult<TransportResponse> {
        self.execute(HttpMethod::Get, url, None).await
    }

    async fn post(&self, url: &str, body: Option<&Value>) -> TransportResult<TransportResponse> {
        self.execute(HttpMethod::Post, url, body).await
    }

    async fn put(&self, url: &str, body: Option<&Value>) -> TransportResult<TransportResponse> {
        self.execute(HttpMethod::Put, url, body).await
    }

    async fn patch(&self, url: &str, body: Option<&Value>) -> TransportResult<TransportResponse> {
        self.execute(HttpMethod::Patch, url, body).await
    }

    async fn delete(&self, url: &str) -> TransportResult<TransportResponse> {
        self.execute(HttpMethod::Delete, url, None).await
    }

    async fn prepare_batch(&self, batch_len: usize) -> TransportResult<()> {
        let invalid = |reason: String| {
            TransportError::Common(CommonError::config_field(
                "base_url",
                format!("unusable base URL '{}': {reason}", self.base_url),
            ))
        };

        let base = Url::parse(&self.base_url).map_err(|err| invalid(err.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
        }

        debug!(batch_len, base_url = %self.base_url, "transport ready for batch");
        Ok(())
    }
}

fn to_reqwest(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn retry_after_header(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Map a raw HTTP response onto the transport contract.
pub fn shape_response(
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &str,
) -> TransportResult<TransportResponse> {
    let code = status.as_u16();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = retry_after
            .or_else(|| body_retry_after(body))
            .unwrap_or(Duration::from_secs(DEFAULT_RETRY_AFTER_SECS));
        return Err(TransportError::RateLimited { retry_after: Some(retry_after) });
    }

    if status.is_server_error() {
        return Err(TransportError::Http {
            status: code,
            message: SERVER_UNAVAILABLE_MESSAGE.to_string(),
        });
    }

    if !status.is_success() {
        return Err(TransportError::Http { status: code, message: client_error_message(body) });
    }

    Ok(TransportResponse { status: code, data: decode_body(body) })
}

fn decode_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Envelope::failure(EMPTY_RESPONSE_MESSAGE).to_value();
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) => Envelope::failure(EMPTY_RESPONSE_MESSAGE).to_value(),
        Ok(value) => value,
        Err(_) => Envelope::failure(INVALID_JSON_MESSAGE).to_value(),
    }
}

/// `message`, then `error`, then a generic fallback
fn client_error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    parsed
        .as_ref()
        .and_then(|value| {
            ["message", "error"].iter().find_map(|key| {
                value.get(*key).and_then(Value::as_str).filter(|text| !text.trim().is_empty())
            })
        })
        .map(str::to_string)
        .unwrap_or_else(|| REQUEST_FAILED_MESSAGE.to_string())
}

fn body_retry_after(body: &str) -> Option<Duration> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("retryAfter")
        .and_then(Value::as_u64)
        .map(Duration::from_secs)
}
