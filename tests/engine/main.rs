//! Integration tests for Layer 3: Engine
//!
//! Tests for judges deriving facts in draw, maybe, and consider modes.

mod consider;
mod derive;
mod quota;

use std::sync::Arc;

use verdict_client::Global;
use verdict_engine::Conclude;
use verdict_foundation::Options;
use verdict_storage::Factbase;

/// A judge in testing mode with its own registry.
fn judge(name: &str) -> Conclude {
    let options = Arc::new(Options::new().with("testing", "true"));
    Conclude::new(name, options, Arc::new(Global::new()))
}

/// Three issues, two of them in one repository.
fn issues() -> Factbase {
    let mut fb = Factbase::new();
    fb.insert()
        .set("what", "issue-was-opened")
        .set("repository", 42)
        .set("issue", 1);
    fb.insert()
        .set("what", "issue-was-opened")
        .set("repository", 42)
        .set("issue", 2);
    fb.insert()
        .set("what", "issue-was-opened")
        .set("repository", 7)
        .set("issue", 1);
    fb
}
