//! Data-fetching hooks
//!
//! Consumer-side adapters over the facade: lifecycle, observable state and
//! retry of throttled fetches.

pub mod fetch;
pub mod hook;
pub mod presets;
pub mod state;

pub use fetch::{BatchFetch, Fetch, SingleFetch};
pub use hook::Hook;
pub use presets::{
    connections_hook, job_data_hook, notifications_hook, profile_data_hook, user_posts_hook,
    BatchHook, ListHook,
};
pub use state::{ErrorCallback, HookOptions, ResourceState};
