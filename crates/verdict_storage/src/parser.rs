//! Parser for query terms.
//!
//! The parser converts a stream of tokens into a [`Term`].

use std::sync::Arc;

use verdict_foundation::{Error, Result, Value};

use crate::lexer::Lexer;
use crate::term::Term;
use crate::token::{Position, Token, TokenKind};

/// Parser for query text.
pub struct Parser<'src> {
    /// The lexer providing tokens.
    lexer: Lexer<'src>,
    /// Current token (lookahead).
    current: Token,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self { lexer, current }
    }

    /// Parses exactly one term; trailing input is an error.
    ///
    /// # Errors
    /// Returns an error if the source cannot be parsed.
    pub fn parse(&mut self) -> Result<Term> {
        let term = self.parse_term()?;
        if self.current.kind != TokenKind::Eof {
            return Err(self.error(&format!(
                "unexpected {} after the query",
                self.current.kind.name()
            )));
        }
        Ok(term)
    }

    /// Parses a term: `(op args...)`.
    fn parse_term(&mut self) -> Result<Term> {
        self.expect(&TokenKind::LParen)?;
        let op_position = self.current.position;
        let op = match &self.current.kind {
            TokenKind::Symbol(name) => name.clone(),
            TokenKind::Error(msg) => return Err(self.error(msg)),
            other => {
                return Err(self.error(&format!("expected an operator, found {}", other.name())));
            }
        };
        self.advance();

        let term = match op.as_str() {
            "always" => Term::Always,
            "never" => Term::Never,
            "exists" => Term::Exists(self.parse_field()?),
            "absent" => Term::Absent(self.parse_field()?),
            "eq" => {
                let field = self.parse_field()?;
                Term::Eq(field, self.parse_literal()?)
            }
            "lt" => {
                let field = self.parse_field()?;
                Term::Lt(field, self.parse_literal()?)
            }
            "gt" => {
                let field = self.parse_field()?;
                Term::Gt(field, self.parse_literal()?)
            }
            "not" => Term::Not(Box::new(self.parse_term()?)),
            "and" => Term::And(self.parse_operands()?),
            "or" => Term::Or(self.parse_operands()?),
            _ => return Err(self.error_at(op_position, &format!("unknown operator: {op}"))),
        };

        if self.current.kind != TokenKind::RParen {
            return Err(self.error(&format!(
                "too many arguments for {op}, found {}",
                self.current.kind.name()
            )));
        }
        self.advance();
        Ok(term)
    }

    /// Parses sub-terms up to (not including) the closing paren.
    fn parse_operands(&mut self) -> Result<Vec<Term>> {
        let mut terms = Vec::new();
        while self.current.kind == TokenKind::LParen {
            terms.push(self.parse_term()?);
        }
        Ok(terms)
    }

    fn parse_field(&mut self) -> Result<Arc<str>> {
        match &self.current.kind {
            TokenKind::Symbol(name) => {
                let name = Arc::from(name.as_str());
                self.advance();
                Ok(name)
            }
            TokenKind::Error(msg) => Err(self.error(msg)),
            other => Err(self.error(&format!("expected a field name, found {}", other.name()))),
        }
    }

    fn parse_literal(&mut self) -> Result<Value> {
        let value = match &self.current.kind {
            TokenKind::True => Value::Bool(true),
            TokenKind::False => Value::Bool(false),
            TokenKind::Int(n) => Value::Int(*n),
            TokenKind::Float(n) => Value::Float(*n),
            TokenKind::String(s) => Value::from(s.as_str()),
            TokenKind::Time(t) => Value::Time(*t),
            TokenKind::Error(msg) => return Err(self.error(msg)),
            other => {
                return Err(self.error(&format!("expected a value, found {}", other.name())));
            }
        };
        self.advance();
        Ok(value)
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<()> {
        if &self.current.kind == expected {
            self.advance();
            Ok(())
        } else if let TokenKind::Error(msg) = &self.current.kind {
            Err(self.error(msg))
        } else {
            Err(self.error(&format!(
                "expected {}, found {}",
                expected.name(),
                self.current.kind.name()
            )))
        }
    }

    fn error(&self, message: &str) -> Error {
        self.error_at(self.current.position, message)
    }

    #[allow(clippy::unused_self)]
    fn error_at(&self, position: Position, message: &str) -> Error {
        Error::query_parse(message, position.line, position.column)
    }
}

/// Parses query text into a term.
///
/// # Errors
/// Returns an error if the source cannot be parsed.
pub fn parse(source: &str) -> Result<Term> {
    Parser::new(source).parse()
}
