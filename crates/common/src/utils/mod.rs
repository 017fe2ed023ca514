//! Common utility functions and helper macros
//!
//! - **[`macros`]**: enum string conversions
//! - **[`serde`]**: millisecond duration helpers

#[macro_use]
pub mod macros;
pub mod serde;

pub use self::serde::{duration_millis, option_duration_millis};
