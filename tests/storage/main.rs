//! Integration tests for Layer 1: Storage
//!
//! Tests for facts, the factbase, transactions, query terms, and persistence.

mod persistence;
mod queries;
