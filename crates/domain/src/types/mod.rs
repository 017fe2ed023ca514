//! Domain types and models

pub mod envelope;
pub mod request;
pub mod status;

pub use envelope::{Envelope, TransportResponse};
pub use request::{BatchRequest, HttpMethod, KeyedRequest, Priority, RequestOptions};
pub use status::{BatcherMetrics, QueueStatus};
