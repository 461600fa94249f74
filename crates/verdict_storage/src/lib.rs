//! Append-only factbase, transactions, and query terms for Verdict.
//!
//! This crate provides:
//! - [`Fact`] - An id plus an open set of named fields
//! - [`Factbase`] - Append-only fact storage with snapshot transactions
//! - [`Txn`] - The view of the factbase inside a transaction
//! - [`Query`] - Parsed query terms like `(and (exists foo) (eq bar 1))`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod fact;
pub mod factbase;
pub mod lexer;
pub mod parser;
#[cfg(feature = "serde")]
pub mod persist;
pub mod term;
pub mod token;

pub use fact::Fact;
pub use factbase::{Cursor, Factbase, Txn};
pub use parser::Parser;
pub use token::Position;
pub use term::{Query, Term};
