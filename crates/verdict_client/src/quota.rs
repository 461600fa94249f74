//! The quota gate and the request interception layer built on it.
//!
//! Every request passing through a [`QuotaLayer`] bumps a counter. When the
//! counter hits a multiple of `limit` and the API reports fewer than `rate`
//! calls left, the layer blocks the calling thread for `pause` and starts
//! counting again from zero.

use std::fmt;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::info;
use verdict_foundation::{Error, Options, Result};

use crate::api::{ApiRequest, ApiResponse, RemoteApi};

/// Remaining quota below which the client counts as exhausted.
pub const EXHAUSTION_MARGIN: i64 = 5;

/// Option holding the pause length in seconds.
pub const QUOTA_PAUSE: &str = "quota_pause";
/// Option holding the number of requests between two quota checks.
pub const QUOTA_LIMIT: &str = "quota_limit";
/// Option holding the remaining-quota threshold.
pub const QUOTA_RATE: &str = "quota_rate";

/// Decides whether the client must pause after a request.
///
/// True exactly when `requests` is a multiple of `limit` and `remaining` is
/// below `rate`. A zero `limit` never pauses.
#[must_use]
pub fn should_pause(requests: u64, limit: u64, remaining: i64, rate: i64) -> bool {
    requests.checked_rem(limit) == Some(0) && remaining < rate
}

/// Returns true when so little quota is left that judges should stop.
#[must_use]
pub const fn is_exhausted(remaining: i64) -> bool {
    remaining < EXHAUSTION_MARGIN
}

/// Settings of the quota gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuotaConfig {
    pause: Duration,
    limit: u64,
    rate: i64,
}

impl QuotaConfig {
    /// Default pause: one minute.
    pub const DEFAULT_PAUSE: Duration = Duration::from_secs(60);
    /// Default number of requests between checks.
    pub const DEFAULT_LIMIT: u64 = 100;
    /// Default remaining-quota threshold.
    pub const DEFAULT_RATE: i64 = 5;

    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless all three values are positive.
    pub fn new(pause: Duration, limit: u64, rate: i64) -> Result<Self> {
        if pause.is_zero() {
            return Err(Error::configuration("quota pause must be positive"));
        }
        if limit == 0 {
            return Err(Error::configuration("quota limit must be positive"));
        }
        if rate <= 0 {
            return Err(Error::configuration(format!(
                "quota rate must be positive, got {rate}"
            )));
        }
        Ok(Self { pause, limit, rate })
    }

    /// Reads `quota_pause`, `quota_limit` and `quota_rate`, using the
    /// defaults for missing ones.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unparsable or non-positive values.
    pub fn from_options(options: &Options) -> Result<Self> {
        let pause = options
            .get_u64(QUOTA_PAUSE)?
            .map_or(Self::DEFAULT_PAUSE, Duration::from_secs);
        let limit = options.get_u64(QUOTA_LIMIT)?.unwrap_or(Self::DEFAULT_LIMIT);
        let rate = options.get_i64(QUOTA_RATE)?.unwrap_or(Self::DEFAULT_RATE);
        Self::new(pause, limit, rate)
    }

    /// How long to block when the gate trips.
    #[must_use]
    pub const fn pause(&self) -> Duration {
        self.pause
    }

    /// Number of requests between two checks.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Remaining-quota threshold.
    #[must_use]
    pub const fn rate(&self) -> i64 {
        self.rate
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            pause: Self::DEFAULT_PAUSE,
            limit: Self::DEFAULT_LIMIT,
            rate: Self::DEFAULT_RATE,
        }
    }
}

type Sleeper = Box<dyn Fn(Duration) + Send + Sync>;

/// Wraps a [`RemoteApi`] and pauses when the quota runs low.
pub struct QuotaLayer<A> {
    inner: A,
    config: QuotaConfig,
    requests: Mutex<u64>,
    sleeper: Sleeper,
}

impl<A: RemoteApi> QuotaLayer<A> {
    /// Wraps `inner`, pausing with [`thread::sleep`].
    pub fn new(inner: A, config: QuotaConfig) -> Self {
        Self {
            inner,
            config,
            requests: Mutex::new(0),
            sleeper: Box::new(thread::sleep),
        }
    }

    /// Replaces the function used to pause.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Requests counted since the last pause.
    #[must_use]
    pub fn requests(&self) -> u64 {
        *self.requests.lock()
    }

    /// The gate settings.
    #[must_use]
    pub const fn config(&self) -> &QuotaConfig {
        &self.config
    }

    /// The wrapped API.
    #[must_use]
    pub const fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: RemoteApi> RemoteApi for QuotaLayer<A> {
    fn call(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let seen = {
            let mut requests = self.requests.lock();
            *requests += 1;
            *requests
        };
        let response = self.inner.call(request)?;
        // A missing header counts as no quota left.
        let remaining = response.remaining.unwrap_or(0);
        if should_pause(seen, self.config.limit, remaining, self.config.rate) {
            info!(
                remaining,
                "Too much GitHub API quota consumed, pausing for {} seconds",
                self.config.pause.as_secs()
            );
            (self.sleeper)(self.config.pause);
            *self.requests.lock() = 0;
        }
        Ok(response)
    }
}

impl<A> fmt::Debug for QuotaLayer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuotaLayer")
            .field("config", &self.config)
            .field("requests", &*self.requests.lock())
            .finish_non_exhaustive()
    }
}
