//! Append-only fact storage with snapshot transactions.
//!
//! The factbase keeps its facts in an [`im::Vector`]. A transaction starts
//! from an O(1) clone of that vector and works on the clone; commit swaps the
//! clone in, rollback drops it. Nothing a transaction does is visible outside
//! it until commit.

use std::collections::BTreeSet;

use im::Vector;
use tracing::debug;
use verdict_foundation::{Error, FactId, Result};

use crate::fact::Fact;
use crate::term::Query;

/// The fact store.
#[derive(Clone, Debug, Default)]
pub struct Factbase {
    pub(crate) facts: Vector<Fact>,
}

impl Factbase {
    /// Creates an empty factbase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns true if there are no facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Returns a fact by id.
    #[must_use]
    pub fn get(&self, id: FactId) -> Option<&Fact> {
        usize::try_from(id.index())
            .ok()
            .and_then(|i| self.facts.get(i))
    }

    /// Iterates over all facts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }

    /// Iterates over the facts matching `query`, in insertion order.
    pub fn query<'f, 'q>(
        &'f self,
        query: &'q Query,
    ) -> impl Iterator<Item = &'f Fact> + use<'f, 'q> {
        self.facts.iter().filter(move |f| query.matches(f))
    }

    /// Appends a new empty fact outside of any transaction.
    pub fn insert(&mut self) -> &mut Fact {
        let index = self.facts.len();
        self.facts.push_back(Fact::new(FactId::new(index as u64)));
        &mut self.facts[index]
    }

    /// Runs `f` inside a transaction.
    ///
    /// On `Ok` every change made through the [`Txn`] becomes visible at once;
    /// on `Err` the factbase is left exactly as it was and the error is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns whatever error `f` returns.
    pub fn txn<T, E, F>(&mut self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Txn) -> std::result::Result<T, E>,
    {
        let mut txn = Txn::begin(self.facts.clone());
        match f(&mut txn) {
            Ok(value) => {
                debug!(
                    inserted = txn.inserted(),
                    modified = txn.modified(),
                    total = txn.len(),
                    "Transaction committed"
                );
                self.facts = txn.facts;
                Ok(value)
            }
            Err(e) => {
                debug!(
                    inserted = txn.inserted(),
                    modified = txn.modified(),
                    "Transaction rolled back"
                );
                Err(e)
            }
        }
    }
}

/// The view of the factbase inside a transaction.
#[derive(Debug)]
pub struct Txn {
    facts: Vector<Fact>,
    base_len: usize,
    touched: BTreeSet<FactId>,
}

impl Txn {
    fn begin(facts: Vector<Fact>) -> Self {
        let base_len = facts.len();
        Self {
            facts,
            base_len,
            touched: BTreeSet::new(),
        }
    }

    /// Number of facts visible in the transaction, new ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns true if no facts are visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Number of facts appended by this transaction.
    #[must_use]
    pub fn inserted(&self) -> usize {
        self.facts.len() - self.base_len
    }

    /// Number of pre-existing facts changed by this transaction.
    #[must_use]
    pub fn modified(&self) -> usize {
        self.touched.len()
    }

    /// Appends a new empty fact.
    pub fn insert(&mut self) -> &mut Fact {
        let index = self.facts.len();
        self.facts.push_back(Fact::new(FactId::new(index as u64)));
        &mut self.facts[index]
    }

    /// Appends a draft, assigning it the next id.
    pub fn insert_fact(&mut self, draft: Fact) -> FactId {
        let id = FactId::new(self.facts.len() as u64);
        self.facts.push_back(draft.with_id(id));
        id
    }

    /// Returns a fact by id.
    #[must_use]
    pub fn fact(&self, id: FactId) -> Option<&Fact> {
        usize::try_from(id.index())
            .ok()
            .and_then(|i| self.facts.get(i))
    }

    /// Returns a fact by id for in-place modification.
    ///
    /// # Errors
    ///
    /// Returns [`verdict_foundation::ErrorKind::FactNotFound`] for unknown ids.
    pub fn fact_mut(&mut self, id: FactId) -> Result<&mut Fact> {
        let index = usize::try_from(id.index())
            .ok()
            .filter(|&i| i < self.facts.len())
            .ok_or_else(|| Error::fact_not_found(id))?;
        if index < self.base_len {
            self.touched.insert(id);
        }
        Ok(&mut self.facts[index])
    }

    /// Iterates over the facts matching `query`, new ones included.
    pub fn query<'f, 'q>(
        &'f self,
        query: &'q Query,
    ) -> impl Iterator<Item = &'f Fact> + use<'f, 'q> {
        self.facts.iter().filter(move |f| query.matches(f))
    }

    /// Returns true if some fact matches `query`.
    #[must_use]
    pub fn exists(&self, query: &Query) -> bool {
        self.facts.iter().any(|f| query.matches(f))
    }

    /// Opens a forward-only cursor over the facts present right now.
    ///
    /// Facts appended after the cursor was opened are never visited, so a
    /// loop that derives facts while walking the cursor terminates.
    #[must_use]
    pub fn cursor(&self, query: Query) -> Cursor {
        Cursor {
            query,
            next: 0,
            end: self.facts.len(),
        }
    }
}

/// Lazy, forward-only walk over the matches of a query.
///
/// The cursor does not borrow the transaction, so the transaction can be
/// written to between two steps.
#[derive(Debug)]
pub struct Cursor {
    query: Query,
    next: usize,
    end: usize,
}

impl Cursor {
    /// Returns the next matching fact, or `None` when the walk is over.
    ///
    /// The fact is cloned (cheaply) so that the caller may keep it while
    /// changing the transaction. Changes made to a not-yet-visited fact are
    /// seen by the cursor when it gets there.
    pub fn next_match(&mut self, txn: &Txn) -> Option<Fact> {
        let end = self.end.min(txn.facts.len());
        while self.next < end {
            let fact = &txn.facts[self.next];
            self.next += 1;
            if self.query.matches(fact) {
                return Some(fact.clone());
            }
        }
        None
    }

    /// The query being walked.
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }
}
