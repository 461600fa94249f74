//! Consider-mode integration tests

use verdict_engine::{Mode, if_absent};
use verdict_foundation::{FactId, Result, Value};

use crate::{issues, judge};

#[test]
fn consider_can_update_and_insert() {
    let mut fb = issues();
    let mut j = judge("mark");
    j.on("(eq repository 42)").unwrap();
    let outcome = j
        .consider(&mut fb, |txn, prev| -> Result<()> {
            txn.fact_mut(prev.id())?.set("marked", true);
            if_absent(txn, |n| -> Result<()> {
                n.set("what", "repository-marked").set("repository", 42);
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();
    assert_eq!(outcome.mode, Mode::Consider);
    assert_eq!((outcome.seen, outcome.derived), (2, 0));
    assert_eq!(fb.len(), 4);
    assert_eq!(fb.get(FactId::new(0)).unwrap().get("marked"), Some(&Value::Bool(true)));
    assert!(!fb.get(FactId::new(2)).unwrap().has("marked"));
}

#[test]
fn consider_without_matches_does_nothing() {
    let mut fb = issues();
    let mut j = judge("j");
    j.on("(eq repository 1000)").unwrap();
    let mut calls = 0;
    let outcome = j
        .consider(&mut fb, |_, _| -> Result<()> {
            calls += 1;
            Ok(())
        })
        .unwrap();
    assert_eq!((calls, outcome.seen), (0, 0));
    assert!(!outcome.interrupted);
}
