//! Persistence integration tests
//!
//! Tests MessagePack export and import of whole factbases.

use verdict_foundation::{FactId, Result};
use verdict_storage::{Factbase, Query};

#[test]
fn derived_links_survive_export() {
    let mut fb = Factbase::new();
    fb.insert().set("issue", 7);
    fb.txn(|txn| -> Result<()> {
        txn.insert().set("cause", FactId::new(0)).set("what", "seen");
        Ok(())
    })
    .unwrap();

    let bytes = fb.export().unwrap();
    let mut restored = Factbase::new();
    restored.import(&bytes).unwrap();

    let derived = restored
        .query(&Query::parse("(eq what 'seen')").unwrap())
        .next()
        .unwrap();
    let cause = derived.cause().and_then(|id| restored.get(id)).unwrap();
    assert_eq!(cause.id(), FactId::new(0));
    assert!(cause.has("issue"));
}

#[test]
fn empty_factbase_exports() {
    let bytes = Factbase::new().export().unwrap();
    let mut restored = Factbase::new();
    restored.import(&bytes).unwrap();
    assert!(restored.is_empty());
}

#[test]
fn import_appends_after_restored_ids() {
    let mut fb = Factbase::new();
    fb.insert().set("a", 1);
    let mut restored = Factbase::new();
    restored.import(&fb.export().unwrap()).unwrap();
    assert_eq!(restored.insert().id(), FactId::new(1));
}
