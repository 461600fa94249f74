//! Verdict - judges over a fact store, with a quota-aware GitHub client
//!
//! This crate re-exports all layers of the Verdict system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: verdict_engine      - Conclude (judge runs), if_absent
//! Layer 2: verdict_client      - Quota gate, Octo, fake and HTTP APIs, Global cache
//! Layer 1: verdict_storage     - Facts, factbase, transactions, query terms
//! Layer 0: verdict_foundation  - Core types (Value, FactId, Error, Options)
//! ```

pub use verdict_client as client;
pub use verdict_engine as engine;
pub use verdict_foundation as foundation;
pub use verdict_storage as storage;
