//! HTTP adapters

pub mod client;
pub mod transport;

pub use client::{HttpClient, HttpClientBuilder};
pub use transport::{shape_response, HttpTransport};
