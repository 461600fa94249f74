//! Judge execution engine for Verdict.
//!
//! A judge is a small rule: it picks facts with a query and derives new
//! facts from each of them. This crate provides:
//! - [`Conclude`] - Runs one judge over a factbase inside a transaction
//! - [`Mode`] - The three ways a judge can act on a match
//! - [`if_absent`] - Inserts a fact unless an identical one exists

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod absent;
pub mod conclude;

pub use absent::if_absent;
pub use conclude::{Conclude, Mode, Outcome};
