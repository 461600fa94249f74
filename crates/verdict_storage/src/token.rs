//! Tokens of the query term language.

use std::fmt;

use chrono::{DateTime, Utc};

/// Location of a token in the query text, for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset of the first character.
    pub offset: usize,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl Position {
    /// The position of the first character of the input.
    #[must_use]
    pub const fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The type and value of this token.
    pub kind: TokenKind,
    /// Where the token starts.
    pub position: Position,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, position: Position) -> Self {
        Self { kind, position }
    }
}

/// Token types of the query term language.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `true`
    True,
    /// `false`
    False,
    /// Integer literal like `42` or `-17`
    Int(i64),
    /// Float literal like `3.14` or `-0.5`
    Float(f64),
    /// String literal, `'single'` or `"double"` quoted
    String(String),
    /// RFC 3339 timestamp like `2024-05-01T12:00:00Z`
    Time(DateTime<Utc>),
    /// Operator or field name like `eq` or `pull_request`
    Symbol(String),
    /// End of input
    Eof,
    /// Lexer error
    Error(String),
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::True => "true",
            Self::False => "false",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Time(_) => "timestamp",
            Self::Symbol(_) => "symbol",
            Self::Eof => "end of input",
            Self::Error(_) => "error",
        }
    }

    /// Returns true for tokens that denote a literal value.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::True | Self::False | Self::Int(_) | Self::Float(_) | Self::String(_) | Self::Time(_)
        )
    }
}
