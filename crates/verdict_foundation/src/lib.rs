//! Core types, values, errors, and options for Verdict.
//!
//! This crate provides:
//! - [`Value`] - The value type stored in fact fields
//! - [`FactId`] - Identity of a fact inside a factbase
//! - [`Error`] - Rich error types with context
//! - [`Options`] - Read-only named settings handed to judges

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod fact_id;
pub mod options;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use fact_id::FactId;
pub use options::Options;
pub use value::Value;
