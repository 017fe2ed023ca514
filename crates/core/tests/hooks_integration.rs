//! Integration tests for data-fetching hooks: state transitions, throttling
//! retries, manual refetch/retry and dependency changes.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use batchgate_core::hooks::{profile_data_hook, Hook};
use batchgate_core::{HookOptions, SingleFetch};
use batchgate_domain::{BatchConfig, BatchRequest, RequestOptions};
use serde_json::{json, Value};
use support::{api_client, err_envelope, millis, ok_envelope, MockTransport};

fn value_hook(
    transport: &Arc<MockTransport>,
    url: &str,
    options: HookOptions,
) -> Hook<SingleFetch<Value>> {
    let api = api_client(transport, BatchConfig::default());
    Hook::new(api, SingleFetch::new(url, RequestOptions::default()), options)
}

fn options() -> HookOptions {
    HookOptions::default()
        .retry_attempts(3)
        .retry_delay(Duration::from_millis(2000))
}

#[tokio::test(start_paused = true)]
async fn successful_fetch_publishes_data() {
    let transport = Arc::new(MockTransport::new());
    transport.respond("/jobs", Ok(ok_envelope(json!([{"id": 1}]))));
    let hook = value_hook(&transport, "/jobs", options());
    let mut updates = hook.subscribe();

    assert!(!hook.loading());
    hook.activate().await;

    let state = hook.state();
    assert_eq!(state.data, Some(json!([{"id": 1}])));
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert!(updates.has_changed().unwrap_or(false));
    assert!(!updates.borrow_and_update().loading);
}

/// Three automatic retries, each waiting `retry_delay * (n + 1)` longer.
#[tokio::test(start_paused = true)]
async fn throttled_fetch_retries_with_linear_backoff() {
    let transport = Arc::new(MockTransport::new());
    transport.respond("/limited", Ok(err_envelope("Too many requests")));
    let reported = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reported);
    let hook = value_hook(
        &transport,
        "/limited",
        options().on_error(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    hook.activate().await;
    assert!(hook.loading());
    assert_eq!(hook.error(), None);

    let state = hook.settled().await;
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("Too many requests"));
    assert_eq!(state.retry_count, 3);
    assert_eq!(reported.load(Ordering::SeqCst), 1);

    let calls = transport.calls();
    assert_eq!(calls.len(), 4);
    for (n, pair) in calls.windows(2).enumerate() {
        let gap = millis(pair[1].at - pair[0].at);
        assert!(gap >= 2000 * (n as u64 + 1), "retry {n} came after {gap}ms");
    }
}

#[tokio::test(start_paused = true)]
async fn other_errors_are_not_retried() {
    let transport = Arc::new(MockTransport::new());
    transport.respond("/missing", Ok(err_envelope("Job not found")));
    let hook = value_hook(&transport, "/missing", options());

    hook.activate().await;
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(transport.call_count(), 1);
    assert!(!hook.loading());
    assert_eq!(hook.error().as_deref(), Some("Job not found"));
    assert_eq!(hook.state().retry_count, 0);
}

#[tokio::test(start_paused = true)]
async fn success_after_throttling_clears_retry_count() {
    let transport = Arc::new(MockTransport::new());
    transport.respond_sequence("/jobs", vec![Ok(err_envelope("Too many requests"))]);
    let hook = value_hook(&transport, "/jobs", options());

    hook.activate().await;
    let state = hook.settled().await;

    assert_eq!(transport.call_count(), 2);
    assert_eq!(state.data, Some(json!({"url": "/jobs"})));
    assert_eq!(state.error, None);
    assert_eq!(state.retry_count, 0);
}

#[tokio::test(start_paused = true)]
async fn manual_retry_is_capped_and_refetch_resets() {
    let transport = Arc::new(MockTransport::new());
    transport.respond("/broken", Ok(err_envelope("Internal failure")));
    let hook = value_hook(&transport, "/broken", options().retry_attempts(1));

    hook.activate().await;
    assert!(hook.retry().await);
    assert_eq!(hook.state().retry_count, 1);
    assert!(!hook.retry().await);
    assert_eq!(transport.call_count(), 2);

    hook.refetch().await;
    assert_eq!(hook.state().retry_count, 0);
    assert!(hook.retry().await);
    assert_eq!(transport.call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn disabled_hook_waits_for_enable() {
    let transport = Arc::new(MockTransport::new());
    let hook = value_hook(&transport, "/jobs", options().enabled(false));

    hook.activate().await;
    assert_eq!(transport.call_count(), 0);
    assert!(!hook.loading());
    assert_eq!(hook.data(), None);

    hook.set_enabled(true).await;
    assert_eq!(transport.call_count(), 1);
    assert_eq!(hook.data(), Some(json!({"url": "/jobs"})));
}

#[tokio::test(start_paused = true)]
async fn refetch_ignores_enabled_flag() {
    let transport = Arc::new(MockTransport::new());
    let hook = value_hook(&transport, "/jobs", options().enabled(false));

    hook.activate().await;
    hook.refetch().await;

    assert_eq!(transport.call_count(), 1);
    assert!(hook.data().is_some());
}

#[tokio::test(start_paused = true)]
async fn changing_url_refetches() {
    let transport = Arc::new(MockTransport::new());
    let hook = value_hook(&transport, "/a", options());

    hook.activate().await;
    hook.set_url("/b").await;

    assert_eq!(transport.call_urls(), vec!["/a", "/b"]);
    assert_eq!(hook.data(), Some(json!({"url": "/b"})));
    assert_eq!(hook.fetcher().url, "/b");
}

/// A result that arrives after its dependencies changed is dropped.
#[tokio::test(start_paused = true)]
async fn superseded_results_are_discarded() {
    let transport = Arc::new(MockTransport::new());
    let hook = value_hook(&transport, "/a", options());

    tokio::join!(hook.activate(), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        hook.set_url("/b").await;
    });

    assert_eq!(transport.call_count(), 2);
    assert_eq!(hook.data(), Some(json!({"url": "/b"})));
    assert!(!hook.loading());
}

#[tokio::test(start_paused = true)]
async fn deactivate_cancels_pending_retry() {
    let transport = Arc::new(MockTransport::new());
    transport.respond("/limited", Ok(err_envelope("Too many requests")));
    let hook = value_hook(&transport, "/limited", options());

    hook.activate().await;
    assert!(hook.loading());
    hook.deactivate();
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(transport.call_count(), 1);
    assert!(!hook.loading());
    assert_eq!(hook.error(), None);
}

#[tokio::test(start_paused = true)]
async fn refetch_on_unmounted_hook_publishes_result() {
    let transport = Arc::new(MockTransport::new());
    transport.respond("/jobs", Ok(ok_envelope(json!([{"id": 7}]))));
    let hook = value_hook(&transport, "/jobs", options());

    hook.refetch().await;

    let state = tokio::time::timeout(Duration::from_secs(60), hook.settled())
        .await
        .expect("hook settles");
    assert_eq!(transport.call_count(), 1);
    assert_eq!(state.data, Some(json!([{"id": 7}])));
    assert!(!state.loading);
}

#[tokio::test(start_paused = true)]
async fn manual_retry_on_unmounted_hook_surfaces_throttling() {
    let transport = Arc::new(MockTransport::new());
    transport.respond("/limited", Ok(err_envelope("Too many requests")));
    let hook = value_hook(&transport, "/limited", options());

    assert!(hook.retry().await);
    tokio::time::sleep(Duration::from_secs(30)).await;

    let state = hook.state();
    assert_eq!(transport.call_count(), 1);
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("Too many requests"));
    assert_eq!(state.retry_count, 1);
}

#[tokio::test(start_paused = true)]
async fn dropped_hook_stops_retrying() {
    let transport = Arc::new(MockTransport::new());
    transport.respond("/limited", Ok(err_envelope("Too many requests")));
    let hook = value_hook(&transport, "/limited", options());

    hook.activate().await;
    drop(hook);
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(transport.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn profile_hook_publishes_results_by_key() {
    let transport = Arc::new(MockTransport::new());
    transport.respond("/users/5/profile", Ok(ok_envelope(json!({"name": "Grace"}))));
    let api = api_client(&transport, BatchConfig::default());
    let hook = profile_data_hook(api, "5", options());

    hook.activate().await;

    let data = hook.data().expect("keyed data");
    let mut keys: Vec<_> = data.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["connections", "notifications", "posts", "profile"]);
    assert_eq!(data["profile"], json!({"name": "Grace"}));
}

#[tokio::test(start_paused = true)]
async fn batch_hook_follows_request_changes() {
    let transport = Arc::new(MockTransport::new());
    let api = api_client(&transport, BatchConfig::default());
    let hook = profile_data_hook(api, "5", options());

    hook.activate().await;
    hook.set_requests(vec![BatchRequest::get("/jobs/1").keyed("job")]).await;

    let data = hook.data().expect("keyed data");
    assert_eq!(data.len(), 1);
    assert_eq!(data["job"], json!({"url": "/jobs/1"}));
}
