//! Domain constants
//!
//! Default pacing policy and the user-facing messages produced when a
//! transport response cannot be used.

// Batching defaults
pub const DEFAULT_MAX_BATCH_SIZE: usize = 10;
pub const DEFAULT_MAX_WAIT_MS: u64 = 1000;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;
pub const DEFAULT_ITEM_DELAY_MS: u64 = 200;
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 100;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

// Transport defaults
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_API_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;
pub const DEFAULT_HTTP_MAX_ATTEMPTS: usize = 1;
pub const DEFAULT_USER_AGENT: &str = concat!("batchgate/", env!("CARGO_PKG_VERSION"));

// Logging defaults
pub const DEFAULT_LOG_FILTER: &str = "batchgate=info";

// User-facing failure messages
pub const SERVER_UNAVAILABLE_MESSAGE: &str =
    "Server is temporarily unavailable. Please try again in a few moments.";
pub const NETWORK_FAILURE_MESSAGE: &str =
    "Network connection failed. Please check your internet connection and try again.";
pub const EMPTY_RESPONSE_MESSAGE: &str = "Empty response from server";
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON response from server";
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";
pub const CANCELLED_MESSAGE: &str = "Request cancelled";
