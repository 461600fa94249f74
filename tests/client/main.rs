//! Integration tests for Layer 2: Client
//!
//! Tests for the quota gate, the fake GitHub API, and the shared registry.

mod fake;
mod global;
mod quota;
