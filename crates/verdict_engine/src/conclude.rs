//! Running one judge over a factbase.
//!
//! A [`Conclude`] is configured with a query (and optionally a follow-list
//! and quota awareness), then consumed by one of [`Conclude::draw`],
//! [`Conclude::maybe`] or [`Conclude::consider`]. All three walk the facts
//! matching the query inside a single transaction:
//!
//! ```text
//! begin txn
//! for each fact present at start, in store order, matching the query:
//!     if quota aware and GitHub quota exhausted: stop
//!     act on the fact (depends on the mode)
//! commit (also after stopping early)
//! ```
//!
//! An error from the judge's closure rolls the whole transaction back and is
//! returned as is.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};
use verdict_client::{Global, Octo, QuotaAwareClient, octo};
use verdict_foundation::{Error, Options};
use verdict_storage::fact::{CAUSE, DETAILS, WHAT};
use verdict_storage::{Fact, Factbase, Query, Txn};

use crate::absent::if_absent;

/// How a judge acts on each matching fact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Always derive a new fact.
    Draw,
    /// Derive a new fact unless an identical one exists.
    Maybe,
    /// Only look at the fact; the closure may change the transaction itself.
    Consider,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Draw => "draw",
            Self::Maybe => "maybe",
            Self::Consider => "consider",
        })
    }
}

/// Summary of one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Name of the judge.
    pub judge: String,
    /// How the judge acted.
    pub mode: Mode,
    /// Matching facts acted on.
    pub seen: usize,
    /// New facts inserted.
    pub derived: usize,
    /// True if the run stopped early because the quota ran out.
    pub interrupted: bool,
}

type Derive<'f, E> = dyn FnMut(&mut Fact, &Fact) -> Result<Option<String>, E> + 'f;
type Inspect<'f, E> = dyn FnMut(&mut Txn, &Fact) -> Result<(), E> + 'f;

/// The judge's closure, by mode.
enum Body<'f, E> {
    Draw(&'f mut Derive<'f, E>),
    Maybe(&'f mut Derive<'f, E>),
    Consider(&'f mut Inspect<'f, E>),
}

impl<E> Body<'_, E> {
    const fn mode(&self) -> Mode {
        match self {
            Self::Draw(_) => Mode::Draw,
            Self::Maybe(_) => Mode::Maybe,
            Self::Consider(_) => Mode::Consider,
        }
    }
}

/// One judge, configured and ready to run.
pub struct Conclude {
    judge: String,
    options: Arc<Options>,
    global: Arc<Global>,
    query: Option<Query>,
    follows: Option<Vec<String>>,
    quota_aware: bool,
}

impl Conclude {
    /// Creates a judge with nothing configured yet.
    #[must_use]
    pub fn new(judge: impl Into<String>, options: Arc<Options>, global: Arc<Global>) -> Self {
        Self {
            judge: judge.into(),
            options,
            global,
            query: None,
            follows: None,
            quota_aware: false,
        }
    }

    /// Sets the query selecting the facts to act on.
    ///
    /// # Errors
    ///
    /// Returns a duplicate configuration error if a query is set already
    /// (the first one stays), or a parse error for malformed text.
    pub fn on(&mut self, query: &str) -> verdict_foundation::Result<&mut Self> {
        if self.query.is_some() {
            return Err(Error::duplicate("query"));
        }
        self.query = Some(Query::parse(query)?);
        Ok(self)
    }

    /// Sets the fields, separated by whitespace, copied from each matching
    /// fact to the fact derived from it.
    ///
    /// # Errors
    ///
    /// Returns a duplicate configuration error if the follow-list is set
    /// already.
    pub fn follow(&mut self, fields: &str) -> verdict_foundation::Result<&mut Self> {
        if self.follows.is_some() {
            return Err(Error::duplicate("follow"));
        }
        self.follows = Some(fields.split_whitespace().map(str::to_string).collect());
        Ok(self)
    }

    /// Stops the run early once GitHub quota is nearly used up.
    pub fn quota_aware(&mut self) -> &mut Self {
        self.quota_aware = true;
        self
    }

    /// Name of the judge.
    #[must_use]
    pub fn judge(&self) -> &str {
        &self.judge
    }

    /// The configured query, if any.
    #[must_use]
    pub const fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    /// The shared GitHub client of this judge's run.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn octo(&self) -> verdict_foundation::Result<Arc<Octo>> {
        octo(&self.options, &self.global)
    }

    /// Derives a new fact from every match.
    ///
    /// The closure gets the new fact (already holding the followed fields
    /// and `cause`) and the matching fact. If it returns text, the text goes
    /// to `details` and the judge name to `what`.
    ///
    /// # Errors
    ///
    /// Returns the closure's error (after rolling back), or a configuration
    /// error if no query was set.
    pub fn draw<E, F>(self, fb: &mut Factbase, mut derive: F) -> Result<Outcome, E>
    where
        E: From<Error>,
        F: FnMut(&mut Fact, &Fact) -> Result<Option<String>, E>,
    {
        self.run(fb, Body::Draw(&mut derive))
    }

    /// Like [`Conclude::draw`], but a derived fact identical to an existing
    /// one is dropped, silently.
    ///
    /// # Errors
    ///
    /// Returns the closure's error (after rolling back), or a configuration
    /// error if no query was set.
    pub fn maybe<E, F>(self, fb: &mut Factbase, mut derive: F) -> Result<Outcome, E>
    where
        E: From<Error>,
        F: FnMut(&mut Fact, &Fact) -> Result<Option<String>, E>,
    {
        self.run(fb, Body::Maybe(&mut derive))
    }

    /// Hands every match, with the transaction, to the closure.
    ///
    /// # Errors
    ///
    /// Returns the closure's error (after rolling back), or a configuration
    /// error if no query was set.
    pub fn consider<E, F>(self, fb: &mut Factbase, mut inspect: F) -> Result<Outcome, E>
    where
        E: From<Error>,
        F: FnMut(&mut Txn, &Fact) -> Result<(), E>,
    {
        self.run(fb, Body::Consider(&mut inspect))
    }

    fn run<E: From<Error>>(self, fb: &mut Factbase, mut body: Body<'_, E>) -> Result<Outcome, E> {
        let Some(query) = self.query.clone() else {
            return Err(Error::configuration(format!(
                "judge {} has no query, call on() first",
                self.judge
            ))
            .into());
        };
        let mode = body.mode();
        debug!(judge = %self.judge, %query, %mode, "Judge started");

        let outcome = fb.txn(|txn| {
            let mut outcome = Outcome {
                judge: self.judge.clone(),
                mode,
                seen: 0,
                derived: 0,
                interrupted: false,
            };
            let mut cursor = txn.cursor(query);
            while let Some(matched) = cursor.next_match(txn) {
                if self.quota_aware && self.octo()?.is_exhausted()? {
                    outcome.interrupted = true;
                    break;
                }
                if self.act(txn, &matched, &mut body)? {
                    outcome.derived += 1;
                }
                outcome.seen += 1;
            }
            Ok::<_, E>(outcome)
        })?;

        debug!(
            judge = %outcome.judge,
            seen = outcome.seen,
            derived = outcome.derived,
            interrupted = outcome.interrupted,
            "Judge finished"
        );
        Ok(outcome)
    }

    /// Acts on one match; true if a fact was inserted.
    fn act<E>(&self, txn: &mut Txn, matched: &Fact, body: &mut Body<'_, E>) -> Result<bool, E> {
        match body {
            Body::Draw(derive) => {
                let fresh = txn.insert();
                self.fill(fresh, matched);
                let said = derive(fresh, matched)?;
                self.stamp(fresh, said);
                Ok(true)
            }
            Body::Maybe(derive) => {
                let mut said = None;
                let inserted = if_absent::<E, _>(txn, |draft| {
                    self.fill(draft, matched);
                    said = derive(draft, matched)?;
                    self.label(draft, said.as_deref());
                    Ok(())
                })?;
                if inserted.is_some() {
                    self.announce(said.as_deref());
                }
                Ok(inserted.is_some())
            }
            Body::Consider(inspect) => {
                inspect(txn, matched)?;
                Ok(false)
            }
        }
    }

    /// Copies followed fields, then points `cause` at the matched fact.
    fn fill(&self, fresh: &mut Fact, matched: &Fact) {
        for name in self.follows.iter().flatten() {
            if let Some(value) = matched.get(name) {
                fresh.set(name, value.clone());
            }
        }
        fresh.set(CAUSE, matched.id());
    }

    fn stamp(&self, fresh: &mut Fact, said: Option<String>) {
        self.label(fresh, said.as_deref());
        self.announce(said.as_deref());
    }

    fn label(&self, fresh: &mut Fact, said: Option<&str>) {
        if let Some(details) = said {
            fresh.set(DETAILS, details).set(WHAT, self.judge.as_str());
        }
    }

    fn announce(&self, said: Option<&str>) {
        if let Some(details) = said {
            info!("{}: {}", self.judge, details);
        }
    }
}

impl fmt::Debug for Conclude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conclude")
            .field("judge", &self.judge)
            .field("query", &self.query.as_ref().map(ToString::to_string))
            .field("follows", &self.follows)
            .field("quota_aware", &self.quota_aware)
            .finish_non_exhaustive()
    }
}
