//! GitHub REST API over blocking `reqwest`.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value as Json;
use tracing::debug;
use verdict_foundation::{Error, Result};

use crate::api::{ApiRequest, ApiResponse, Method, RemoteApi};

/// Root of the public GitHub API.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
/// Header carrying the remaining quota.
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

const TIMEOUT: Duration = Duration::from_secs(15);

/// Network client of the GitHub API.
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// Creates a client, authenticated when a token is given.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the token cannot be sent as a header
    /// or the HTTP client cannot be built.
    pub fn new(token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("verdict"));
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| Error::configuration("the GitHub token is not a valid header value"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(TIMEOUT)
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Points the client at another API root (GitHub Enterprise, a mock server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// The API root requests go to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Reads the remaining quota from response headers.
fn remaining(headers: &HeaderMap) -> Option<i64> {
    headers
        .get(RATE_LIMIT_REMAINING)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

impl RemoteApi for HttpApi {
    fn call(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = request.method.as_str(), %url, "GitHub request");
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };
        let response = builder
            .send()
            .map_err(|e| Error::transport(format!("{} {url}: {e}", request.method.as_str())))?;

        let status = response.status();
        let remaining = remaining(response.headers());
        let text = response
            .text()
            .map_err(|e| Error::transport(format!("failed to read response from {url}: {e}")))?;

        if status == StatusCode::NOT_FOUND {
            return Err(Error::not_found(request.path.clone()));
        }
        if !status.is_success() {
            return Err(Error::remote(status.as_u16(), text));
        }

        let body = if text.trim().is_empty() {
            Json::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| Error::transport(format!("malformed JSON from {url}: {e}")))?
        };
        Ok(ApiResponse {
            status: status.as_u16(),
            body,
            remaining,
        })
    }
}

impl fmt::Debug for HttpApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
