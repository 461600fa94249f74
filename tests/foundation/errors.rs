//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use verdict_foundation::{Error, ErrorContext, ErrorKind, FactId};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_configuration() {
    let err = Error::configuration("limit must be positive");
    assert!(matches!(err.kind, ErrorKind::Configuration(_)));
    assert!(err.is_configuration());
    assert!(format!("{err}").contains("limit must be positive"));
}

#[test]
fn error_duplicate_configuration() {
    let err = Error::duplicate("follow");
    assert!(err.is_configuration());
    assert_eq!(format!("{err}"), "configuration error: follow is already set");
}

#[test]
fn error_not_found() {
    let err = Error::not_found("GitHub user #7");
    assert!(err.is_not_found());
    assert!(format!("{err}").contains("#7"));
}

#[test]
fn error_fact_not_found() {
    let err = Error::fact_not_found(FactId::new(42));
    assert!(matches!(err.kind, ErrorKind::FactNotFound(id) if id == FactId::new(42)));
    assert!(format!("{err}").contains("42"));
    assert!(!err.is_not_found());
}

#[test]
fn error_remote() {
    let err = Error::remote(502, "bad gateway");
    assert!(matches!(err.kind, ErrorKind::Remote { status: 502, .. }));
    assert_eq!(format!("{err}"), "remote API error 502: bad gateway");
}

#[test]
fn error_transport_and_serialization() {
    assert!(format!("{}", Error::transport("timed out")).contains("timed out"));
    assert!(format!("{}", Error::serialization("bad bytes")).contains("bad bytes"));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn error_context_display() {
    let ctx = ErrorContext::new()
        .with_source("issue-was-closed")
        .with_frame("draw")
        .with_frame("fill");
    let shown = format!("{ctx}");
    assert!(shown.starts_with("in issue-was-closed"));
    assert!(shown.contains("  at draw"));
    assert!(shown.contains("  at fill"));
}

#[test]
fn error_is_std_error() {
    fn takes_std_error(_: &dyn std::error::Error) {}
    takes_std_error(&Error::internal("x"));
}
