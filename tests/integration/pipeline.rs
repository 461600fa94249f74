//! Several judges over one factbase
//!
//! Chains judges the way a run does: each one sees what earlier ones derived.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use verdict::client::{FakeApi, Global, OCTO, Octo, QuotaAwareClient, QuotaConfig};
use verdict::engine::Conclude;
use verdict::foundation::{FactId, Options, Result, Value};
use verdict::storage::{Factbase, Query};

fn testing() -> (Arc<Options>, Arc<Global>) {
    (
        Arc::new(Options::new().with("testing", "true")),
        Arc::new(Global::new()),
    )
}

#[test]
fn foo_bar_scenario() {
    let (options, global) = testing();
    let mut fb = Factbase::new();
    fb.insert().set("foo", 1);
    fb.insert().set("bar", 2);

    let mut j = Conclude::new("judge-one", options, global);
    j.on("(exists foo)").unwrap();
    let outcome = j
        .draw(&mut fb, |n, _| -> Result<Option<String>> {
            n.set("x", 42);
            Ok(Some(String::from("hello")))
        })
        .unwrap();

    assert_eq!(outcome.derived, 1);
    assert_eq!(fb.len(), 3);
    let derived = fb.get(FactId::new(2)).unwrap();
    assert_eq!(derived.get("x"), Some(&Value::Int(42)));
    assert_eq!(derived.what(), Some("judge-one"));
    assert_eq!(derived.details(), Some("hello"));
    assert_eq!(derived.cause(), Some(FactId::new(0)));
}

#[test]
fn judges_chain_through_derived_facts() {
    let (options, global) = testing();
    let mut fb = Factbase::new();
    fb.insert().set("what", "issue-was-opened").set("who", 444).set("issue", 5);
    fb.insert().set("what", "issue-was-opened").set("who", 888).set("issue", 6);

    let mut names = Conclude::new("who-has-name", Arc::clone(&options), Arc::clone(&global));
    names.on("(and (eq what 'issue-was-opened') (exists who))").unwrap().follow("who issue").unwrap();
    let octo = names.octo().unwrap();
    names
        .draw(&mut fb, |n, prev| -> Result<Option<String>> {
            let id = prev.get("who").and_then(Value::as_int).unwrap_or(0);
            let login = octo.user_name_by_id(u64::try_from(id).unwrap_or(0))?;
            n.set("name", login.as_str());
            Ok(Some(format!("user #{id} is @{login}")))
        })
        .unwrap();

    let mut greet = Conclude::new("greeted", options, Arc::clone(&global));
    greet.on("(eq what 'who-has-name')").unwrap().follow("name issue").unwrap();
    let outcome = greet
        .maybe(&mut fb, |_, prev| -> Result<Option<String>> {
            Ok(Some(format!("hello @{}", prev.get("name").map_or(String::new(), ToString::to_string))))
        })
        .unwrap();
    assert_eq!(outcome.derived, 2);

    let greeted: Vec<_> = fb
        .query(&Query::parse("(eq what 'greeted')").unwrap())
        .filter_map(|f| f.get("name").and_then(Value::as_str).map(str::to_string))
        .collect();
    assert_eq!(greeted, vec!["yegor256", "torvalds"]);

    // One client for both judges.
    let shared = global.get::<Octo>(OCTO).unwrap().unwrap();
    assert_eq!(shared.layer().requests(), 2);
}

#[test]
fn failing_lookup_rolls_back_the_judge() {
    let (options, global) = testing();
    let mut fb = Factbase::new();
    fb.insert().set("who", 444);
    fb.insert().set("who", 1);

    let mut j = Conclude::new("names", options, global);
    j.on("(exists who)").unwrap();
    let octo = j.octo().unwrap();
    let err = j
        .draw(&mut fb, |n, prev| -> Result<Option<String>> {
            let id = prev.get("who").and_then(Value::as_int).unwrap_or(0);
            n.set("name", octo.user_name_by_id(u64::try_from(id).unwrap_or(0))?);
            Ok(None)
        })
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(fb.len(), 2);
}

#[test]
fn quota_abort_commits_partial_work() {
    let api = FakeApi::new();
    let remaining = api.remaining_handle();
    let global = Global::new();
    global.insert(OCTO, Octo::new(Box::new(api), QuotaConfig::default()));

    let mut fb = Factbase::new();
    for i in 0..3 {
        fb.insert().set("n", i);
    }
    let mut j = Conclude::new("counted", Arc::new(Options::new()), Arc::new(global));
    j.on("(exists n)").unwrap().quota_aware();
    let outcome = j
        .draw(&mut fb, |_, _| -> Result<Option<String>> {
            remaining.store(0, Ordering::SeqCst);
            Ok(Some(String::from("counted")))
        })
        .unwrap();

    assert!(outcome.interrupted);
    assert_eq!(outcome.derived, 1);
    assert_eq!(fb.len(), 4);
    assert_eq!(fb.get(FactId::new(3)).unwrap().cause(), Some(FactId::new(0)));
}

#[test]
fn results_survive_export_and_import() {
    let (options, global) = testing();
    let mut fb = Factbase::new();
    fb.insert().set("foo", 1);
    let mut j = Conclude::new("j", options, global);
    j.on("(exists foo)").unwrap();
    j.draw(&mut fb, |_, _| -> Result<Option<String>> { Ok(Some(String::from("done"))) })
        .unwrap();

    let mut restored = Factbase::new();
    restored.import(&fb.export().unwrap()).unwrap();
    let derived = restored
        .query(&Query::parse("(eq what 'j')").unwrap())
        .next()
        .unwrap();
    assert_eq!(derived.details(), Some("done"));
    assert!(restored.get(derived.cause().unwrap()).unwrap().has("foo"));
}
