//! Quota-aware judge integration tests

use std::sync::Arc;
use std::sync::atomic::Ordering;

use verdict_client::{FakeApi, Global, OCTO, Octo, QuotaConfig};
use verdict_engine::Conclude;
use verdict_foundation::{Options, Result};

use crate::issues;

fn judge_with(api: FakeApi) -> Conclude {
    let global = Global::new();
    global.insert(OCTO, Octo::new(Box::new(api), QuotaConfig::default()));
    Conclude::new("counted", Arc::new(Options::new()), Arc::new(global))
}

#[test]
fn exhausted_before_start_derives_nothing() {
    let mut fb = issues();
    let mut j = judge_with(FakeApi::new().with_remaining(0));
    j.on("(exists issue)").unwrap().quota_aware();
    let outcome = j
        .draw(&mut fb, |_, _| -> Result<Option<String>> { Ok(None) })
        .unwrap();
    assert!(outcome.interrupted);
    assert_eq!((outcome.seen, outcome.derived), (0, 0));
    assert_eq!(fb.len(), 3);
}

#[test]
fn exhaustion_mid_run_keeps_earlier_work() {
    let api = FakeApi::new();
    let remaining = api.remaining_handle();
    let mut fb = issues();
    let mut j = judge_with(api);
    j.on("(exists issue)").unwrap().quota_aware();
    let outcome = j
        .draw(&mut fb, |_, _| -> Result<Option<String>> {
            remaining.store(1, Ordering::SeqCst);
            Ok(None)
        })
        .unwrap();
    assert!(outcome.interrupted);
    assert_eq!((outcome.seen, outcome.derived), (1, 1));
    assert_eq!(fb.len(), 4);
}

#[test]
fn quota_is_ignored_unless_asked() {
    let mut fb = issues();
    let mut j = judge_with(FakeApi::new().with_remaining(0));
    j.on("(exists issue)").unwrap();
    let outcome = j
        .draw(&mut fb, |_, _| -> Result<Option<String>> { Ok(None) })
        .unwrap();
    assert!(!outcome.interrupted);
    assert_eq!(outcome.derived, 3);
}
