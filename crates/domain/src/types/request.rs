//! Request descriptors accepted by the batcher and the facade

use std::time::Duration;

use batchgate_common::impl_status_conversions;
use batchgate_common::option_duration_millis;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Priority class of a queued request.
///
/// Ordering follows dispatch order: `High < Normal < Low`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl_status_conversions!(Priority {
    High => "high",
    Normal => "normal",
    Low => "low",
});

/// HTTP verbs the transport supports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] =
        [HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch, HttpMethod::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Whether the verb sends a request body
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == upper)
            .ok_or_else(|| format!("Invalid HttpMethod: {s}"))
    }
}

/// Per-call options of the facade verbs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    pub priority: Priority,
    /// Overrides the batcher-wide request timeout for this call
    #[serde(with = "option_duration_millis")]
    pub timeout: Option<Duration>,
    /// Advisory; retries are driven by the hook layer
    pub retries: Option<u32>,
}

impl RequestOptions {
    pub fn with_priority(priority: Priority) -> Self {
        Self { priority, ..Default::default() }
    }

    pub fn high() -> Self {
        Self::with_priority(Priority::High)
    }

    pub fn low() -> Self {
        Self::with_priority(Priority::Low)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }
}

/// One entry of a facade `batch` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default)]
    pub priority: Priority,
}

impl BatchRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self { url: url.into(), method, data: None, priority: Priority::Normal }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>, data: Value) -> Self {
        Self::new(HttpMethod::Post, url).with_data(data)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Attach the key under which a batch hook publishes this result
    pub fn keyed(self, key: impl Into<String>) -> KeyedRequest {
        KeyedRequest { key: key.into(), request: self }
    }
}

/// A batch entry addressed by key rather than by position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedRequest {
    pub key: String,
    #[serde(flatten)]
    pub request: BatchRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High < Priority::Normal);
        assert!(Priority::Normal < Priority::Low);
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn test_priority_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), r#""high""#);
        let parsed: Priority = serde_json::from_str(r#""low""#).unwrap();
        assert_eq!(parsed, Priority::Low);
        assert_eq!("Normal".parse::<Priority>(), Ok(Priority::Normal));
    }

    #[test]
    fn test_http_method_parsing() {
        assert_eq!("patch".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert!("TRACE".parse::<HttpMethod>().is_err());
        assert!(HttpMethod::Put.has_body());
        assert!(!HttpMethod::Get.has_body());
    }

    #[test]
    fn test_batch_request_defaults() {
        let req: BatchRequest = serde_json::from_str(r#"{"url":"/a"}"#).unwrap();
        assert_eq!(req, BatchRequest::get("/a"));
    }

    #[test]
    fn test_keyed_request_flattens() {
        let keyed: KeyedRequest =
            serde_json::from_str(r#"{"key":"posts","url":"/posts","priority":"low"}"#).unwrap();
        assert_eq!(keyed.key, "posts");
        assert_eq!(keyed.request.priority, Priority::Low);
        assert_eq!(keyed.request.method, HttpMethod::Get);
    }
}
