//! Configuration structures
//!
//! All durations are written in milliseconds in config files.

use std::time::Duration;

use batchgate_common::error::{CommonError, CommonResult};
use batchgate_common::duration_millis;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Tunables of the request batcher, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Max items pulled from the queue per drain
    pub max_batch_size: usize,
    /// Max delay before an under-full queue is flushed anyway
    #[serde(with = "duration_millis")]
    pub max_wait_time: Duration,
    /// Automatic retries granted to throttled hook fetches
    pub retry_attempts: u32,
    /// Base of the linear retry backoff
    #[serde(with = "duration_millis")]
    pub retry_delay: Duration,
    /// Pause between consecutive sends within a batch
    #[serde(with = "duration_millis")]
    pub item_delay: Duration,
    /// Pause before the next drain when backlog remains
    #[serde(with = "duration_millis")]
    pub inter_batch_delay: Duration,
    /// Upper bound on a single transport call
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_wait_time: Duration::from_millis(DEFAULT_MAX_WAIT_MS),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            item_delay: Duration::from_millis(DEFAULT_ITEM_DELAY_MS),
            inter_batch_delay: Duration::from_millis(DEFAULT_INTER_BATCH_DELAY_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl BatchConfig {
    /// Slower pacing for backends with tight rate limits
    pub fn conservative() -> Self {
        Self {
            max_batch_size: 5,
            max_wait_time: Duration::from_millis(2000),
            retry_delay: Duration::from_millis(5000),
            item_delay: Duration::from_millis(500),
            inter_batch_delay: Duration::from_millis(250),
            ..Default::default()
        }
    }

    /// Faster pacing for backends that tolerate bursts
    pub fn aggressive() -> Self {
        Self {
            max_batch_size: 25,
            max_wait_time: Duration::from_millis(250),
            retry_attempts: 2,
            retry_delay: Duration::from_millis(1000),
            item_delay: Duration::from_millis(50),
            inter_batch_delay: Duration::from_millis(25),
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> CommonResult<()> {
        if self.max_batch_size == 0 {
            return Err(CommonError::config_field(
                "max_batch_size",
                "Max batch size must be greater than 0",
            ));
        }

        if self.max_wait_time.is_zero() {
            return Err(CommonError::config_field(
                "max_wait_time",
                "Max wait time must be greater than 0",
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(CommonError::config_field(
                "request_timeout",
                "Request timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Connection settings for the HTTP transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL that relative request paths are joined onto
    pub base_url: String,
    /// Bearer token sent with every request
    pub token: Option<String>,
    #[serde(with = "duration_millis")]
    pub timeout: Duration,
    pub user_agent: String,
    /// Attempts per call inside the HTTP client, counting the first one
    pub max_attempts: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout: Duration::from_millis(DEFAULT_API_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> CommonResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(CommonError::config_field("base_url", "Base URL must not be empty"));
        }
        if self.timeout.is_zero() {
            return Err(CommonError::config_field("timeout", "Timeout must be greater than 0"));
        }
        if self.max_attempts == 0 {
            return Err(CommonError::config_field("max_attempts", "At least one attempt is required"));
        }
        Ok(())
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives
    pub filter: String,
    /// Emit one JSON object per event
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: DEFAULT_LOG_FILTER.to_string(), json: false }
    }
}

/// Configuration for the application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub batch: BatchConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> CommonResult<()> {
        self.api.validate()?;
        self.batch.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pacing_policy() {
        let config = BatchConfig::default();
        assert_eq!(config.max_batch_size, 10);
        assert_eq!(config.max_wait_time, Duration::from_millis(1000));
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay, Duration::from_millis(2000));
        assert_eq!(config.item_delay, Duration::from_millis(200));
        assert_eq!(config.inter_batch_delay, Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(BatchConfig::conservative().validate().is_ok());
        assert!(BatchConfig::aggressive().validate().is_ok());
        assert!(BatchConfig::conservative().item_delay > BatchConfig::aggressive().item_delay);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = BatchConfig { max_batch_size: 0, ..Default::default() };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_batch_size"));
        assert!(matches!(
            err,
            CommonError::Config { field: Some(ref field), .. } if field == "max_batch_size"
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BatchConfig =
            serde_json::from_str(r#"{"max_batch_size":2,"item_delay":0}"#).unwrap();
        assert_eq!(config.max_batch_size, 2);
        assert_eq!(config.item_delay, Duration::ZERO);
        assert_eq!(config.max_wait_time, Duration::from_millis(1000));
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        let config = AppConfig {
            api: ApiConfig { base_url: "  ".into(), ..Default::default() },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
