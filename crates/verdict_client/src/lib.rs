//! Quota-aware access to the GitHub API for Verdict judges.
//!
//! This crate provides:
//! - [`should_pause`] and [`QuotaConfig`] - The quota gate
//! - [`QuotaLayer`] - Request interception that pauses when quota runs low
//! - [`Octo`] - The client judges talk to, implementing [`QuotaAwareClient`]
//! - [`FakeApi`] and [`HttpApi`] - In-memory and network implementations of [`RemoteApi`]
//! - [`Global`] and [`octo`] - Process-wide cache holding one client

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod api;
pub mod fake;
pub mod global;
pub mod http;
pub mod octo;
pub mod quota;

pub use api::{ApiRequest, ApiResponse, Method, RemoteApi};
pub use fake::FakeApi;
pub use global::{Global, OCTO, octo};
pub use http::HttpApi;
pub use octo::{Octo, QuotaAwareClient};
pub use quota::{EXHAUSTION_MARGIN, QuotaConfig, QuotaLayer, is_exhausted, should_pause};
