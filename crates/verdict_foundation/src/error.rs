//! Error types for the Verdict system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::fact_id::FactId;

/// The main error type for Verdict operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

/// Result type alias used throughout Verdict.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration(message.into()))
    }

    /// Creates a duplicate configuration error for the named setting.
    #[must_use]
    pub fn duplicate(setting: &'static str) -> Self {
        Self::new(ErrorKind::DuplicateConfiguration(setting))
    }

    /// Creates a not-found error for a remote entity.
    #[must_use]
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound(entity.into()))
    }

    /// Creates a fact not found error.
    #[must_use]
    pub fn fact_not_found(id: FactId) -> Self {
        Self::new(ErrorKind::FactNotFound(id))
    }

    /// Creates a query parse error.
    #[must_use]
    pub fn query_parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(ErrorKind::QueryParse {
            message: message.into(),
            line,
            column,
        })
    }

    /// Creates an error for a non-success answer of the remote API.
    #[must_use]
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Remote {
            status,
            message: message.into(),
        })
    }

    /// Creates a transport error (connection, timeout, malformed body).
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport(message.into()))
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true for errors raised while configuring something.
    ///
    /// Both plain configuration errors and duplicate registrations count.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Configuration(_) | ErrorKind::DuplicateConfiguration(_)
        )
    }

    /// Returns true if a remote entity was not found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound(_))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A required setting is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A setting that may only be given once was given twice.
    #[error("configuration error: {0} is already set")]
    DuplicateConfiguration(&'static str),

    /// The remote API has no such entity.
    #[error("not found: {0}")]
    NotFound(String),

    /// Fact was not found in the factbase.
    #[error("fact not found: {0}")]
    FactNotFound(FactId),

    /// Parse error in a query term.
    #[error("query parse error at {line}:{column}: {message}")]
    QueryParse {
        /// Description of the parse error.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
    },

    /// The remote API answered with a failure status.
    #[error("remote API error {status}: {message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Body or reason phrase.
        message: String,
    },

    /// The request never produced an answer.
    #[error("transport error: {0}")]
    Transport(String),

    /// Encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Judge or component name.
    pub source: Option<String>,
    /// Chain of operations that led to the error.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source (judge or component name).
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "in {source}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  at {frame}")?;
            }
        }
        Ok(())
    }
}
