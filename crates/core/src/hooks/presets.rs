//! Fixed-parameter hooks for the job portal screens

use batchgate_domain::RequestOptions;
use serde_json::Value;

use super::fetch::{BatchFetch, SingleFetch};
use super::hook::Hook;
use super::state::HookOptions;
use crate::api::loaders::{job_requests, profile_requests};
use crate::api::{endpoints, ApiClient};

/// Keyed results of a batch hook
pub type BatchHook = Hook<BatchFetch>;

/// List-valued single-resource hook
pub type ListHook = Hook<SingleFetch<Vec<Value>>>;

/// Profile screen: `profile`, `posts`, `connections`, `notifications`
pub fn profile_data_hook(api: ApiClient, user_id: &str, options: HookOptions) -> BatchHook {
    Hook::new(api, BatchFetch::new(profile_requests(user_id)), options)
}

/// Job screen: `job`, `applications`, `similar_jobs`
pub fn job_data_hook(api: ApiClient, job_id: &str, options: HookOptions) -> BatchHook {
    Hook::new(api, BatchFetch::new(job_requests(job_id)), options)
}

pub fn user_posts_hook(api: ApiClient, user_id: &str, options: HookOptions) -> ListHook {
    Hook::new(api, SingleFetch::new(endpoints::user_posts(user_id), RequestOptions::default()), options)
}

pub fn connections_hook(api: ApiClient, options: HookOptions) -> ListHook {
    Hook::new(api, SingleFetch::new(endpoints::CONNECTIONS, RequestOptions::default()), options)
}

pub fn notifications_hook(api: ApiClient, options: HookOptions) -> ListHook {
    Hook::new(api, SingleFetch::new(endpoints::NOTIFICATIONS, RequestOptions::low()), options)
}
