//! # batchgate Infrastructure
//!
//! Impure adapters behind the ports defined in `batchgate-core`:
//! - the reqwest-backed [`HttpTransport`] and its retrying [`HttpClient`]
//! - configuration loading from the environment and TOML/JSON files
//! - composition-root helpers that wire transport, batcher and facade

pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod http;

pub use bootstrap::{build_api_client, build_batcher, init_logging};
pub use errors::{InfraError, InfraResult, IntoTransportError};
pub use http::{HttpClient, HttpClientBuilder, HttpTransport};
