//! Facts: an id plus an open set of named fields.

use std::fmt;
use std::sync::Arc;

use im::OrdMap;
use verdict_foundation::{FactId, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Field holding the name of the judge that derived a fact.
pub const WHAT: &str = "what";
/// Field holding the human readable explanation of a derived fact.
pub const DETAILS: &str = "details";
/// Field holding the id of the fact a derived fact was made from.
pub const CAUSE: &str = "cause";
/// Pseudo-field naming the fact id in queries.
pub const ID: &str = "_id";

/// A single fact.
///
/// Fields are kept in name order. Cloning is cheap: the field map is a
/// persistent structure shared between clones until one of them changes.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fact {
    id: FactId,
    fields: OrdMap<Arc<str>, Value>,
}

impl Fact {
    pub(crate) fn new(id: FactId) -> Self {
        Self {
            id,
            fields: OrdMap::new(),
        }
    }

    /// Creates a fact that is not part of any factbase yet.
    ///
    /// Its id is [`FactId::null`] until it is inserted.
    #[must_use]
    pub fn draft() -> Self {
        Self::new(FactId::null())
    }

    /// The id of this fact.
    #[must_use]
    pub const fn id(&self) -> FactId {
        self.id
    }

    /// Returns true if the fact has not been inserted.
    #[must_use]
    pub const fn is_draft(&self) -> bool {
        self.id.is_null()
    }

    pub(crate) fn with_id(mut self, id: FactId) -> Self {
        self.id = id;
        self
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns true if the field is present.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(Arc::from(name), value.into());
        self
    }

    /// Removes a field, returning its old value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Iterates over fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the fact has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Name of the judge that derived this fact.
    #[must_use]
    pub fn what(&self) -> Option<&str> {
        self.get(WHAT).and_then(Value::as_str)
    }

    /// Explanation attached by the judge that derived this fact.
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        self.get(DETAILS).and_then(Value::as_str)
    }

    /// The fact this one was derived from.
    #[must_use]
    pub fn cause(&self) -> Option<FactId> {
        self.get(CAUSE).and_then(Value::as_fact_id)
    }
}

impl fmt::Debug for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Fact");
        s.field("id", &self.id);
        for (k, v) in &self.fields {
            s.field(k, v);
        }
        s.finish()
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        for (k, v) in &self.fields {
            write!(f, " {k}={v}")?;
        }
        Ok(())
    }
}
