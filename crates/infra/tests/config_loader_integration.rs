//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::time::Duration;

use batchgate_infra::{config, InfraError};
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write config file");
    path
}

#[test]
fn test_load_config_from_toml_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        "batchgate.toml",
        r#"
[api]
base_url = "https://jobs.example.com/api"
token = "toml-token"
timeout = 15000

[batch]
max_batch_size = 5
max_wait_time = 500
retry_attempts = 2
item_delay = 250

[logging]
filter = "batchgate=debug"
json = true
"#,
    );

    let config = config::load_from_file(Some(path)).expect("config from TOML");

    assert_eq!(config.api.base_url, "https://jobs.example.com/api");
    assert_eq!(config.api.token.as_deref(), Some("toml-token"));
    assert_eq!(config.api.timeout, Duration::from_secs(15));
    assert_eq!(config.batch.max_batch_size, 5);
    assert_eq!(config.batch.max_wait_time, Duration::from_millis(500));
    assert_eq!(config.batch.retry_attempts, 2);
    assert_eq!(config.batch.item_delay, Duration::from_millis(250));
    // Unset fields keep their defaults
    assert_eq!(config.batch.inter_batch_delay, Duration::from_millis(100));
    assert_eq!(config.logging.filter, "batchgate=debug");
    assert!(config.logging.json);
}

#[test]
fn test_load_config_from_json_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        "config.json",
        r#"{
            "api": { "base_url": "http://127.0.0.1:8080/api", "max_attempts": 3 },
            "batch": { "retry_delay": 500 }
        }"#,
    );

    let config = config::load_from_file(Some(path)).expect("config from JSON");

    assert_eq!(config.api.base_url, "http://127.0.0.1:8080/api");
    assert_eq!(config.api.max_attempts, 3);
    assert_eq!(config.api.token, None);
    assert_eq!(config.batch.retry_delay, Duration::from_millis(500));
    assert_eq!(config.batch.max_batch_size, 10);
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "batchgate.toml", "[batch]\nmax_batch_size = 0\n");

    let err = config::load_from_file(Some(path)).unwrap_err();

    assert!(err.to_string().contains("max_batch_size"), "unexpected error: {err}");
}

#[test]
fn test_malformed_file_is_a_config_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(&dir, "batchgate.json", r#"{ "api": "#);

    let err = config::load_from_file(Some(path)).unwrap_err();

    assert!(matches!(err, InfraError::Config(message) if message.starts_with("Invalid JSON")));
}

#[test]
fn test_missing_file_is_reported() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let err = config::load_from_file(Some(dir.path().join("absent.toml"))).unwrap_err();

    assert!(matches!(err, InfraError::Config(message) if message.contains("not found")));
}
