//! Configuration loader
//!
//! Loads [`AppConfig`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. A `.env` file in the working directory (or a parent) is applied first
//! 2. If `BATCHGATE_API_URL` is set, configuration comes from the environment
//! 3. Otherwise the first config file found by [`probe_config_paths`] is used
//! 4. With neither, built-in defaults apply
//!
//! ## Environment Variables
//! - `BATCHGATE_API_URL`: Base URL of the backend (required for env loading)
//! - `BATCHGATE_API_TOKEN`: Bearer token
//! - `BATCHGATE_API_TIMEOUT_MS`: HTTP timeout
//! - `BATCHGATE_HTTP_MAX_ATTEMPTS`: Attempts per HTTP call
//! - `BATCHGATE_MAX_BATCH_SIZE`, `BATCHGATE_MAX_WAIT_MS`
//! - `BATCHGATE_RETRY_ATTEMPTS`, `BATCHGATE_RETRY_DELAY_MS`
//! - `BATCHGATE_ITEM_DELAY_MS`, `BATCHGATE_INTER_BATCH_DELAY_MS`
//! - `BATCHGATE_REQUEST_TIMEOUT_MS`
//! - `BATCHGATE_LOG_FILTER`, `BATCHGATE_LOG_JSON`
//!
//! ## File Locations
//! `batchgate.toml`, `batchgate.json`, `config.toml`, `config.json` in the
//! working directory, its parent and grandparent, then next to the
//! executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use batchgate_domain::AppConfig;

use crate::errors::{InfraError, InfraResult};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["batchgate.toml", "batchgate.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `InfraError::Config` if a source exists but cannot be parsed or
/// yields an invalid configuration.
pub fn load() -> InfraResult<AppConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Applied .env file");
    }

    if std::env::var_os("BATCHGATE_API_URL").is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No configuration source found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load configuration from environment variables
///
/// `BATCHGATE_API_URL` is required; every other variable overrides the
/// corresponding default when present.
///
/// # Errors
/// Returns `InfraError::Config` if the required variable is missing or a
/// value cannot be parsed.
pub fn load_from_env() -> InfraResult<AppConfig> {
    let mut config = AppConfig::default();

    config.api.base_url = env_var("BATCHGATE_API_URL")?;
    config.api.token = std::env::var("BATCHGATE_API_TOKEN").ok().filter(|t| !t.is_empty());
    if let Some(timeout) = env_millis("BATCHGATE_API_TIMEOUT_MS")? {
        config.api.timeout = timeout;
    }
    if let Some(attempts) = env_parse("BATCHGATE_HTTP_MAX_ATTEMPTS")? {
        config.api.max_attempts = attempts;
    }

    let batch = &mut config.batch;
    if let Some(size) = env_parse("BATCHGATE_MAX_BATCH_SIZE")? {
        batch.max_batch_size = size;
    }
    if let Some(wait) = env_millis("BATCHGATE_MAX_WAIT_MS")? {
        batch.max_wait_time = wait;
    }
    if let Some(attempts) = env_parse("BATCHGATE_RETRY_ATTEMPTS")? {
        batch.retry_attempts = attempts;
    }
    if let Some(delay) = env_millis("BATCHGATE_RETRY_DELAY_MS")? {
        batch.retry_delay = delay;
    }
    if let Some(delay) = env_millis("BATCHGATE_ITEM_DELAY_MS")? {
        batch.item_delay = delay;
    }
    if let Some(delay) = env_millis("BATCHGATE_INTER_BATCH_DELAY_MS")? {
        batch.inter_batch_delay = delay;
    }
    if let Some(timeout) = env_millis("BATCHGATE_REQUEST_TIMEOUT_MS")? {
        batch.request_timeout = timeout;
    }

    if let Ok(filter) = std::env::var("BATCHGATE_LOG_FILTER") {
        config.logging.filter = filter;
    }
    config.logging.json = env_bool("BATCHGATE_LOG_JSON", config.logging.json);

    validated(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected by
/// extension (`.toml` or `.json`); missing fields take their defaults.
///
/// # Errors
/// Returns `InfraError::Config` if the file is missing, unreadable, in an
/// unsupported format or invalid.
pub fn load_from_file(path: Option<PathBuf>) -> InfraResult<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(InfraError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            InfraError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| InfraError::Config(format!("Failed to read config file: {}", e)))?;

    validated(parse_config(&contents, &config_path)?)
}

fn parse_config(contents: &str, path: &Path) -> InfraResult<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| InfraError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| InfraError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(InfraError::Config(format!("Unsupported config format: {}", extension))),
    }
}

fn validated(config: AppConfig) -> InfraResult<AppConfig> {
    config.validate()?;
    Ok(config)
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> InfraResult<String> {
    std::env::var(key)
        .map_err(|_| InfraError::Config(format!("Missing required environment variable: {}", key)))
}

fn env_parse<T>(key: &str) -> InfraResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| InfraError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

fn env_millis(key: &str) -> InfraResult<Option<Duration>> {
    Ok(env_parse::<u64>(key)?.map(Duration::from_millis))
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
