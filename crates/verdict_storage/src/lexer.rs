//! Lexer for query terms.
//!
//! The lexer converts query text into a stream of tokens.

use chrono::{DateTime, Utc};

use crate::token::{Position, Token, TokenKind};

/// Lexer for query text.
pub struct Lexer<'src> {
    /// Source text being tokenized.
    source: &'src str,
    /// Remaining source text.
    rest: &'src str,
    /// Current position in source.
    position: Position,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: Position::start(),
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.position;
        let Some(c) = self.peek_char() else {
            return Token::new(TokenKind::Eof, start);
        };

        let kind = match c {
            '(' => {
                self.advance();
                TokenKind::LParen
            }
            ')' => {
                self.advance();
                TokenKind::RParen
            }
            '\'' | '"' => self.scan_string(c),
            c if c.is_ascii_digit() => {
                if self.looks_like_time() {
                    self.scan_time()
                } else {
                    self.scan_number()
                }
            }
            '-' | '+' => {
                // Could be number or symbol
                if self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.scan_number()
                } else {
                    self.scan_symbol()
                }
            }
            c if is_symbol_start(c) => self.scan_symbol(),
            c => {
                self.advance();
                TokenKind::Error(format!("unexpected character: {c}"))
            }
        };

        Token::new(kind, start)
    }

    /// Tokenizes all source and returns a vector of tokens, ending with `Eof`.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    /// Advances past the next character.
    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position.offset += len;
            if c == '\n' {
                self.position.line += 1;
                self.position.column = 1;
            } else {
                self.position.column += 1;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.advance();
            } else if c == ';' {
                // Comment to end of line
                while self.peek_char().is_some_and(|c| c != '\n') {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    /// Scans a string literal delimited by `quote`.
    fn scan_string(&mut self, quote: char) -> TokenKind {
        self.advance(); // consume opening quote
        let mut text = String::new();
        loop {
            match self.peek_char() {
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some(c @ ('\\' | '\'' | '"')) => text.push(c),
                        Some(c) => {
                            return TokenKind::Error(format!("invalid escape sequence: \\{c}"));
                        }
                        None => {
                            return TokenKind::Error(
                                "unexpected end of input in string escape".into(),
                            );
                        }
                    }
                    self.advance();
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
                None => {
                    return TokenKind::Error("unterminated string literal".into());
                }
            }
        }
        TokenKind::String(text)
    }

    /// Timestamps start with a four digit year followed by a dash.
    fn looks_like_time(&self) -> bool {
        let bytes = self.rest.as_bytes();
        bytes.len() > 4 && bytes[..4].iter().all(u8::is_ascii_digit) && bytes[4] == b'-'
    }

    fn scan_time(&mut self) -> TokenKind {
        let start = self.position.offset;
        while self
            .peek_char()
            .is_some_and(|c| !c.is_whitespace() && c != '(' && c != ')')
        {
            self.advance();
        }
        let text = &self.source[start..self.position.offset];
        match DateTime::parse_from_rfc3339(text) {
            Ok(t) => TokenKind::Time(t.with_timezone(&Utc)),
            Err(e) => TokenKind::Error(format!("invalid timestamp {text:?}: {e}")),
        }
    }

    /// Scans a number (integer or float).
    fn scan_number(&mut self) -> TokenKind {
        let start = self.position.offset;
        let mut has_dot = false;

        if matches!(self.peek_char(), Some('-' | '+')) {
            self.advance();
        }

        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.'
                && !has_dot
                && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit())
            {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        let text = &self.source[start..self.position.offset];

        if has_dot {
            match text.parse::<f64>() {
                Ok(n) => TokenKind::Float(n),
                Err(e) => TokenKind::Error(format!("invalid float: {e}")),
            }
        } else {
            match text.parse::<i64>() {
                Ok(n) => TokenKind::Int(n),
                Err(e) => TokenKind::Error(format!("invalid integer: {e}")),
            }
        }
    }

    fn scan_symbol(&mut self) -> TokenKind {
        let start = self.position.offset;
        while self.peek_char().is_some_and(is_symbol_char) {
            self.advance();
        }
        match &self.source[start..self.position.offset] {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            name => TokenKind::Symbol(name.to_string()),
        }
    }
}

/// Returns true if `c` can start a symbol.
fn is_symbol_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '-' | '+' | '*' | '/' | '?' | '!' | '<' | '>' | '=')
}

/// Returns true if `c` can appear in a symbol (not at start).
fn is_symbol_char(c: char) -> bool {
    is_symbol_start(c) || c.is_ascii_digit() || c == '.'
}
