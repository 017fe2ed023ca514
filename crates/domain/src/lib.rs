//! # batchgate Domain
//!
//! Plain data types shared by the scheduler and its adapters.
//!
//! This crate contains:
//! - Request descriptors (`Priority`, `HttpMethod`, `BatchRequest`)
//! - Response shapes (`Envelope`, `TransportResponse`)
//! - Configuration structures
//! - The transport error type and constants
//!
//! ## Architecture
//! - Depends only on `batchgate-common`
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use constants::*;
pub use errors::*;
pub use types::*;
