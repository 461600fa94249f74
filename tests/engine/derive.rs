//! Draw and maybe integration tests

use verdict_engine::Mode;
use verdict_foundation::{Error, FactId, Result, Value};
use verdict_storage::Query;

use crate::{issues, judge};

#[test]
fn draw_links_every_derived_fact_to_its_cause() {
    let mut fb = issues();
    let mut j = judge("issue-seen");
    j.on("(eq what 'issue-was-opened')").unwrap().follow("repository issue").unwrap();
    let outcome = j
        .draw(&mut fb, |_, prev| -> Result<Option<String>> {
            let issue = prev.get("issue").and_then(Value::as_int).unwrap_or(0);
            Ok(Some(format!("issue {issue} seen")))
        })
        .unwrap();
    assert_eq!((outcome.mode, outcome.seen, outcome.derived), (Mode::Draw, 3, 3));

    let derived: Vec<_> = fb.query(&Query::parse("(eq what 'issue-seen')").unwrap()).collect();
    assert_eq!(derived.len(), 3);
    for fact in derived {
        let cause = fact.cause().and_then(|id| fb.get(id)).unwrap();
        assert_eq!(fact.get("repository"), cause.get("repository"));
        assert_eq!(fact.get("issue"), cause.get("issue"));
        assert!(fact.details().unwrap().starts_with("issue "));
    }
}

#[test]
fn follow_skips_fields_missing_on_the_match() {
    let mut fb = issues();
    let mut j = judge("j");
    j.on("(eq issue 2)").unwrap().follow("repository assignee").unwrap();
    j.draw(&mut fb, |_, _| -> Result<Option<String>> { Ok(None) })
        .unwrap();
    let derived = fb.get(FactId::new(3)).unwrap();
    assert_eq!(derived.get("repository"), Some(&Value::Int(42)));
    assert!(!derived.has("assignee"));
    assert_eq!(derived.cause(), Some(FactId::new(1)));
}

#[test]
fn closure_may_override_followed_fields() {
    let mut fb = issues();
    let mut j = judge("j");
    j.on("(eq issue 2)").unwrap().follow("repository").unwrap();
    j.draw(&mut fb, |n, _| -> Result<Option<String>> {
        n.set("repository", 0);
        Ok(None)
    })
    .unwrap();
    assert_eq!(fb.get(FactId::new(3)).unwrap().get("repository"), Some(&Value::Int(0)));
}

#[test]
fn maybe_derives_each_conclusion_once() {
    let mut fb = issues();
    let repo_seen = |fb: &mut verdict_storage::Factbase| {
        let mut j = judge("repo-seen");
        j.on("(eq what 'issue-was-opened')").unwrap().follow("repository").unwrap();
        j.maybe(fb, |n, _| -> Result<Option<String>> {
            // Drop the cause so issues of one repository collapse.
            n.remove("cause");
            Ok(Some(String::from("repository seen")))
        })
        .unwrap()
    };
    let first = repo_seen(&mut fb);
    assert_eq!((first.seen, first.derived), (3, 2));
    let second = repo_seen(&mut fb);
    assert_eq!((second.seen, second.derived), (3, 0));
    assert_eq!(fb.len(), 5);
}

#[test]
fn error_in_any_match_discards_the_whole_run() {
    let mut fb = issues();
    let mut j = judge("j");
    j.on("(exists issue)").unwrap();
    let err = j
        .draw(&mut fb, |_, prev| -> Result<Option<String>> {
            if prev.id() == FactId::new(2) {
                return Err(Error::internal("third match failed"));
            }
            Ok(None)
        })
        .unwrap_err();
    assert!(err.to_string().contains("third match failed"));
    assert_eq!(fb.len(), 3);
}

#[test]
fn derived_facts_are_not_matched_again() {
    let mut fb = issues();
    let mut j = judge("j");
    j.on("(exists issue)").unwrap().follow("issue").unwrap();
    let outcome = j
        .draw(&mut fb, |_, _| -> Result<Option<String>> { Ok(None) })
        .unwrap();
    assert_eq!(outcome.seen, 3);
    assert_eq!(fb.len(), 6);
}
