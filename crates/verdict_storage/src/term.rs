//! Query terms and their evaluation against single facts.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::SecondsFormat;
use verdict_foundation::{Error, Result, Value};

use crate::fact::{Fact, ID};
use crate::parser::Parser;

/// A boolean condition over the fields of one fact.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// Matches every fact.
    Always,
    /// Matches no fact.
    Never,
    /// The field is present.
    Exists(Arc<str>),
    /// The field is missing.
    Absent(Arc<str>),
    /// The field equals the value.
    Eq(Arc<str>, Value),
    /// The field is less than the value.
    Lt(Arc<str>, Value),
    /// The field is greater than the value.
    Gt(Arc<str>, Value),
    /// Negation.
    Not(Box<Term>),
    /// All sub-terms match. Empty matches everything.
    And(Vec<Term>),
    /// Some sub-term matches. Empty matches nothing.
    Or(Vec<Term>),
}

impl Term {
    /// Builds `(eq field value)`.
    #[must_use]
    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Self::Eq(Arc::from(field), value.into())
    }

    /// Builds `(exists field)`.
    #[must_use]
    pub fn exists(field: &str) -> Self {
        Self::Exists(Arc::from(field))
    }

    /// Builds the conjunction of equalities for every field of `fact`.
    ///
    /// A fact without fields gives `(and)`, which matches everything.
    #[must_use]
    pub fn same_fields(fact: &Fact) -> Self {
        Self::And(
            fact.fields()
                .map(|(name, value)| Self::Eq(Arc::from(name), value.clone()))
                .collect(),
        )
    }

    /// Evaluates the term against a fact.
    #[must_use]
    pub fn eval(&self, fact: &Fact) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Exists(field) => lookup(fact, field).is_some(),
            Self::Absent(field) => lookup(fact, field).is_none(),
            Self::Eq(field, value) => compare(fact, field, value) == Some(Ordering::Equal),
            Self::Lt(field, value) => compare(fact, field, value) == Some(Ordering::Less),
            Self::Gt(field, value) => compare(fact, field, value) == Some(Ordering::Greater),
            Self::Not(inner) => !inner.eval(fact),
            Self::And(terms) => terms.iter().all(|t| t.eval(fact)),
            Self::Or(terms) => terms.iter().any(|t| t.eval(fact)),
        }
    }
}

fn lookup(fact: &Fact, field: &str) -> Option<Value> {
    if field == ID {
        Some(Value::from(fact.id()))
    } else {
        fact.get(field).cloned()
    }
}

fn compare(fact: &Fact, field: &str, value: &Value) -> Option<Ordering> {
    lookup(fact, field).and_then(|v| v.compare(value))
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Bool(b) => write!(f, "{b}"),
        Value::Int(n) => write!(f, "{n}"),
        Value::Float(n) => write!(f, "{n:?}"),
        Value::String(s) => {
            f.write_str("'")?;
            for c in s.chars() {
                match c {
                    '\'' => f.write_str("\\'")?,
                    '\\' => f.write_str("\\\\")?,
                    '\n' => f.write_str("\\n")?,
                    '\t' => f.write_str("\\t")?,
                    c => write!(f, "{c}")?,
                }
            }
            f.write_str("'")
        }
        Value::Time(t) => write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "(always)"),
            Self::Never => write!(f, "(never)"),
            Self::Exists(field) => write!(f, "(exists {field})"),
            Self::Absent(field) => write!(f, "(absent {field})"),
            Self::Eq(field, value) | Self::Lt(field, value) | Self::Gt(field, value) => {
                let op = match self {
                    Self::Eq(..) => "eq",
                    Self::Lt(..) => "lt",
                    _ => "gt",
                };
                write!(f, "({op} {field} ")?;
                write_literal(f, value)?;
                write!(f, ")")
            }
            Self::Not(inner) => write!(f, "(not {inner})"),
            Self::And(terms) | Self::Or(terms) => {
                let op = if matches!(self, Self::And(_)) { "and" } else { "or" };
                write!(f, "({op}")?;
                for t in terms {
                    write!(f, " {t}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A parsed query.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    term: Term,
}

impl Query {
    /// Parses query text such as `(and (exists foo) (eq bar 1))`.
    ///
    /// # Errors
    ///
    /// Returns a query parse error with the line and column of the problem.
    pub fn parse(text: &str) -> Result<Self> {
        Parser::new(text).parse().map(Self::from)
    }

    /// The query that matches every fact.
    #[must_use]
    pub const fn all() -> Self {
        Self { term: Term::Always }
    }

    /// Returns true if the fact satisfies the query.
    #[must_use]
    pub fn matches(&self, fact: &Fact) -> bool {
        self.term.eval(fact)
    }

    /// The root term.
    #[must_use]
    pub const fn term(&self) -> &Term {
        &self.term
    }
}

impl From<Term> for Query {
    fn from(term: Term) -> Self {
        Self { term }
    }
}

impl FromStr for Query {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.term.fmt(f)
    }
}
