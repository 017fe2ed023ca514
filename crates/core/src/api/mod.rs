//! Global API facade
//!
//! - [`ApiClient`]: verb methods, `batch`, queue pass-throughs
//! - [`loaders`]: composite screen loads

pub mod client;
pub mod error;
pub mod loaders;

pub use client::{unwrap_envelope, ApiClient};
pub use error::{ApiError, ApiResult};
pub use loaders::{endpoints, JobData, ProfileData};
