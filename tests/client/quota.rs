//! Quota gate integration tests
//!
//! Drives a quota layer over the fake API and records the pauses.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use parking_lot::Mutex;
use verdict_client::{
    ApiRequest, FakeApi, Octo, QuotaAwareClient, QuotaConfig, QuotaLayer, RemoteApi,
};

fn recorded(config: QuotaConfig, api: FakeApi) -> (QuotaLayer<FakeApi>, Arc<Mutex<Vec<Duration>>>) {
    let pauses = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&pauses);
    let layer = QuotaLayer::new(api, config).with_sleeper(move |d| log.lock().push(d));
    (layer, pauses)
}

#[test]
fn pauses_once_per_window_when_low() {
    let config = QuotaConfig::new(Duration::from_secs(3), 4, 10).unwrap();
    let (layer, pauses) = recorded(config, FakeApi::new().with_remaining(2));
    for _ in 0..12 {
        layer.call(&ApiRequest::get("/users/yegor256")).unwrap();
    }
    assert_eq!(*pauses.lock(), vec![Duration::from_secs(3); 3]);
    assert_eq!(layer.requests(), 0);
}

#[test]
fn plenty_of_quota_never_pauses() {
    let config = QuotaConfig::new(Duration::from_secs(1), 1, 10).unwrap();
    let (layer, pauses) = recorded(config, FakeApi::new().with_remaining(10));
    for _ in 0..5 {
        layer.call(&ApiRequest::get("/rate_limit")).unwrap();
    }
    assert!(pauses.lock().is_empty());
    assert_eq!(layer.requests(), 5);
}

#[test]
fn quota_draining_during_use_eventually_pauses() {
    let config = QuotaConfig::new(Duration::from_secs(1), 2, 3).unwrap();
    let (layer, pauses) = recorded(config, FakeApi::new().with_remaining(6).consuming());
    for issue in 0..6 {
        layer
            .call(&ApiRequest::post(
                format!("/repos/yegor256/test/issues/{issue}/comments"),
                serde_json::json!({ "body": "hi" }),
            ))
            .unwrap();
    }
    // Remaining after each call: 5 4 3 2 1 0. Checks after calls 4 and 6 see it below 3.
    assert_eq!(pauses.lock().len(), 2);
    assert_eq!(layer.inner().remaining(), 0);
}

#[test]
fn failed_requests_count_but_never_pause() {
    let config = QuotaConfig::new(Duration::from_secs(1), 1, 1000).unwrap();
    let (layer, pauses) = recorded(config, FakeApi::new());
    assert!(layer.call(&ApiRequest::get("/no/such/thing")).unwrap_err().is_not_found());
    assert!(pauses.lock().is_empty());
    assert_eq!(layer.requests(), 1);
}

#[test]
fn exhaustion_follows_remaining_quota() {
    let api = FakeApi::new().with_remaining(5);
    let handle = api.remaining_handle();
    let octo = Octo::new(Box::new(api), QuotaConfig::default());
    assert!(!octo.is_exhausted().unwrap());
    handle.store(4, Ordering::SeqCst);
    assert!(octo.is_exhausted().unwrap());
}
