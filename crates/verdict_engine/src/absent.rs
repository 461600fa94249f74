//! Insert-if-absent.

use tracing::debug;
use verdict_foundation::FactId;
use verdict_storage::{Fact, Query, Term, Txn};

/// Builds a draft with `build` and inserts it unless the transaction already
/// holds a fact with all of the draft's fields at equal values.
///
/// Returns the id of the inserted fact, or `None` when an existing fact made
/// the draft redundant. A draft without fields is redundant as soon as any
/// fact exists.
///
/// # Errors
///
/// Returns the error of `build`, in which case nothing is inserted.
pub fn if_absent<E, F>(txn: &mut Txn, build: F) -> Result<Option<FactId>, E>
where
    F: FnOnce(&mut Fact) -> Result<(), E>,
{
    let mut draft = Fact::draft();
    build(&mut draft)?;
    let same = Query::from(Term::same_fields(&draft));
    if let Some(existing) = txn.query(&same).next() {
        debug!(existing = %existing.id(), "Identical fact exists already, nothing inserted");
        return Ok(None);
    }
    Ok(Some(txn.insert_fact(draft)))
}
