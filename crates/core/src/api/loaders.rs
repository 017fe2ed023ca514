//! Screen-level composite loads
//!
//! Each loader issues a fixed set of GETs through [`ApiClient::batch`] with
//! critical data at `high`, secondary data at `normal` and nice-to-have data
//! at `low`, then reshapes the results into named fields.

use batchgate_domain::{BatchRequest, KeyedRequest, Priority};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::ApiClient;
use super::error::ApiResult;

/// Endpoint paths used by the composite loaders and hook presets
pub mod endpoints {
    pub fn user_profile(user_id: &str) -> String {
        format!("/users/{user_id}/profile")
    }

    pub fn user_posts(user_id: &str) -> String {
        format!("/posts/user/{user_id}")
    }

    pub const CONNECTIONS: &str = "/connections";

    pub const NOTIFICATIONS: &str = "/notifications";

    pub fn job(job_id: &str) -> String {
        format!("/jobs/{job_id}")
    }

    pub fn job_applications(job_id: &str) -> String {
        format!("/jobs/{job_id}/applications")
    }

    pub fn similar_jobs(job_id: &str) -> String {
        format!("/jobs/{job_id}/similar")
    }
}

/// Everything the profile screen needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub profile: Value,
    pub posts: Vec<Value>,
    pub connections: Vec<Value>,
    pub notifications: Vec<Value>,
}

/// Everything the job detail screen needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobData {
    pub job: Value,
    pub applications: Vec<Value>,
    pub similar_jobs: Vec<Value>,
}

/// Keyed requests behind [`ProfileData`]
pub fn profile_requests(user_id: &str) -> Vec<KeyedRequest> {
    vec![
        BatchRequest::get(endpoints::user_profile(user_id))
            .with_priority(Priority::High)
            .keyed("profile"),
        BatchRequest::get(endpoints::user_posts(user_id)).keyed("posts"),
        BatchRequest::get(endpoints::CONNECTIONS).keyed("connections"),
        BatchRequest::get(endpoints::NOTIFICATIONS)
            .with_priority(Priority::Low)
            .keyed("notifications"),
    ]
}

/// Keyed requests behind [`JobData`]
pub fn job_requests(job_id: &str) -> Vec<KeyedRequest> {
    vec![
        BatchRequest::get(endpoints::job(job_id)).with_priority(Priority::High).keyed("job"),
        BatchRequest::get(endpoints::job_applications(job_id)).keyed("applications"),
        BatchRequest::get(endpoints::similar_jobs(job_id))
            .with_priority(Priority::Low)
            .keyed("similar_jobs"),
    ]
}

/// Non-array payloads become an empty list.
pub fn list_or_empty(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

fn unkeyed(requests: Vec<KeyedRequest>) -> Vec<BatchRequest> {
    requests.into_iter().map(|keyed| keyed.request).collect()
}

impl ApiClient {
    /// Load profile, posts, connections and notifications of a user
    pub async fn load_profile_data(&self, user_id: &str) -> ApiResult<ProfileData> {
        let mut results = self.batch(unkeyed(profile_requests(user_id))).await?.into_iter();
        let mut next = || results.next().unwrap_or(Value::Null);

        Ok(ProfileData {
            profile: next(),
            posts: list_or_empty(next()),
            connections: list_or_empty(next()),
            notifications: list_or_empty(next()),
        })
    }

    /// Load a job posting with its applications and similar postings
    pub async fn load_job_data(&self, job_id: &str) -> ApiResult<JobData> {
        let mut results = self.batch(unkeyed(job_requests(job_id))).await?.into_iter();
        let mut next = || results.next().unwrap_or(Value::Null);

        Ok(JobData {
            job: next(),
            applications: list_or_empty(next()),
            similar_jobs: list_or_empty(next()),
        })
    }
}
