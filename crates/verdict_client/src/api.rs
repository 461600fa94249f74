//! The remote API seam.
//!
//! Everything that talks to GitHub (the network client, the in-memory fake,
//! the quota layer wrapping either) implements [`RemoteApi`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use verdict_foundation::{Error, Result};

/// HTTP method of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read.
    Get,
    /// Create.
    Post,
}

impl Method {
    /// The method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A request to the remote API.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API root, starting with `/`, query string included.
    pub path: String,
    /// JSON body, for requests that carry one.
    pub body: Option<Json>,
}

impl ApiRequest {
    /// Creates a `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    /// Creates a `POST` request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Json) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// A successful answer of the remote API.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded JSON body (`null` when empty).
    pub body: Json,
    /// Value of the `x-ratelimit-remaining` header, if it was sent.
    pub remaining: Option<i64>,
}

impl ApiResponse {
    /// Creates a `200 OK` response with no quota information.
    #[must_use]
    pub const fn ok(body: Json) -> Self {
        Self {
            status: 200,
            body,
            remaining: None,
        }
    }

    /// Sets the status code.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sets the remaining quota reported with the response.
    #[must_use]
    pub const fn with_remaining(mut self, remaining: i64) -> Self {
        self.remaining = Some(remaining);
        self
    }

    /// Decodes the body into a typed value.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the body does not have the expected shape.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.body)
            .map_err(|e| Error::serialization(format!("unexpected response shape: {e}")))
    }
}

/// A synchronous client of the remote API.
///
/// Implementations turn non-success answers into errors: a missing entity is
/// [`verdict_foundation::ErrorKind::NotFound`], anything else
/// [`verdict_foundation::ErrorKind::Remote`] or
/// [`verdict_foundation::ErrorKind::Transport`].
pub trait RemoteApi: Send + Sync {
    /// Performs one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers with a failure.
    fn call(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

impl<A: RemoteApi + ?Sized> RemoteApi for Box<A> {
    fn call(&self, request: &ApiRequest) -> Result<ApiResponse> {
        (**self).call(request)
    }
}

impl<A: RemoteApi + ?Sized> RemoteApi for Arc<A> {
    fn call(&self, request: &ApiRequest) -> Result<ApiResponse> {
        (**self).call(request)
    }
}
