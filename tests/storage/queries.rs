//! Query term integration tests
//!
//! Tests parsing and evaluating queries against a factbase.

use chrono::{TimeZone, Utc};
use verdict_foundation::{ErrorKind, FactId};
use verdict_storage::{Factbase, Query};

fn issues() -> Factbase {
    let mut fb = Factbase::new();
    fb.insert()
        .set("what", "issue-was-opened")
        .set("issue", 1)
        .set("when", Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap());
    fb.insert()
        .set("what", "issue-was-closed")
        .set("issue", 1)
        .set("when", Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap());
    fb.insert()
        .set("what", "issue-was-opened")
        .set("issue", 2)
        .set("stars", 4.5);
    fb
}

fn ids(fb: &Factbase, text: &str) -> Vec<u64> {
    let q = Query::parse(text).unwrap();
    fb.query(&q).map(|f| f.id().index()).collect()
}

// =============================================================================
// Evaluation
// =============================================================================

#[test]
fn query_by_string_field() {
    let fb = issues();
    assert_eq!(ids(&fb, "(eq what 'issue-was-opened')"), vec![0, 2]);
}

#[test]
fn query_by_time_range() {
    let fb = issues();
    assert_eq!(ids(&fb, "(gt when 2024-02-01T00:00:00Z)"), vec![1]);
    assert_eq!(ids(&fb, "(lt when 2024-02-01T00:00:00+03:00)"), vec![0]);
}

#[test]
fn query_with_connectives() {
    let fb = issues();
    assert_eq!(
        ids(&fb, "(and (eq issue 1) (not (eq what \"issue-was-closed\")))"),
        vec![0]
    );
    assert_eq!(ids(&fb, "(or (exists stars) (eq issue 1))"), vec![0, 1, 2]);
    assert_eq!(ids(&fb, "(absent when)"), vec![2]);
}

#[test]
fn query_float_against_int() {
    let fb = issues();
    assert_eq!(ids(&fb, "(gt stars 4)"), vec![2]);
    assert_eq!(ids(&fb, "(lt issue 1.5)"), vec![0, 1]);
}

#[test]
fn query_by_id() {
    let fb = issues();
    assert_eq!(ids(&fb, "(gt _id 0)"), vec![1, 2]);
    assert_eq!(
        fb.query(&Query::parse("(eq _id 1)").unwrap()).next().map(|f| f.id()),
        Some(FactId::new(1))
    );
}

#[test]
fn query_with_comments_and_newlines() {
    let fb = issues();
    let text = "; opened issues only\n(and\n  (eq what 'issue-was-opened')\n  (eq issue 2))";
    assert_eq!(ids(&fb, text), vec![2]);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn parse_error_location() {
    let err = Query::parse("(and (exists foo)\n     (bogus x))").unwrap_err();
    match err.kind {
        ErrorKind::QueryParse { line, column, .. } => assert_eq!((line, column), (2, 7)),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn empty_query_is_error() {
    assert!(matches!(
        Query::parse("").unwrap_err().kind,
        ErrorKind::QueryParse { .. }
    ));
}

#[test]
fn query_renders_back() {
    let q = Query::parse("(and (exists foo)   (eq bar 'x'))").unwrap();
    assert_eq!(q.to_string(), "(and (exists foo) (eq bar 'x'))");
}
