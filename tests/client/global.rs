//! Shared registry integration tests

use std::sync::Arc;
use std::thread;

use verdict_client::{FakeApi, Global, OCTO, Octo, QuotaAwareClient, QuotaConfig, octo};
use verdict_foundation::Options;

#[test]
fn judges_share_one_client() {
    let options = Arc::new(Options::new().with("testing", "true"));
    let global = Arc::new(Global::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let options = Arc::clone(&options);
            let global = Arc::clone(&global);
            thread::spawn(move || octo(&options, &global).unwrap())
        })
        .collect();
    let clients: Vec<Arc<Octo>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(clients.iter().all(|c| Arc::ptr_eq(c, &clients[0])));
}

#[test]
fn requests_from_all_judges_share_one_counter() {
    let global = Global::new();
    global.insert(OCTO, Octo::new(Box::new(FakeApi::new()), QuotaConfig::default()));
    let options = Options::new();
    octo(&options, &global).unwrap().user_name_by_id(444).unwrap();
    octo(&options, &global).unwrap().user_name_by_id(888).unwrap();
    assert_eq!(octo(&options, &global).unwrap().layer().requests(), 2);
}

#[test]
fn invalid_quota_option_is_reported() {
    let options = Options::new()
        .with("testing", "true")
        .with("quota_pause", "soon");
    let global = Global::new();
    assert!(octo(&options, &global).unwrap_err().is_configuration());
    assert!(!global.contains(OCTO));
}
