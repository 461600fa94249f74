//! Process-wide cache shared by all judges of one run.
//!
//! [`Global`] holds lazily created objects under fixed keys. The GitHub
//! client lives under [`OCTO`] and is built by [`octo`] on first use.

use std::any::Any;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use verdict_foundation::{Error, Options, Result};

use crate::api::RemoteApi;
use crate::fake::FakeApi;
use crate::http::HttpApi;
use crate::octo::Octo;
use crate::quota::QuotaConfig;

/// Key of the GitHub client in [`Global`].
pub const OCTO: &str = "octo";
/// Environment variable consulted when no `github_token` option is given.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

type Slot = Arc<dyn Any + Send + Sync>;

/// Shared registry of lazily initialised objects.
#[derive(Default)]
pub struct Global {
    slots: Mutex<HashMap<&'static str, Slot>>,
}

impl Global {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the object under `key`, creating it with `init` if absent.
    ///
    /// The lock is held while `init` runs, so concurrent callers never
    /// build two objects for one key. `init` must not touch this registry.
    ///
    /// # Errors
    ///
    /// Returns the error of `init` (nothing is stored then), or an internal
    /// error if the stored object has another type.
    pub fn get_or_try_init<T, F>(&self, key: &'static str, init: F) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Result<T>,
    {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get(key) {
            return downcast(key, Arc::clone(slot));
        }
        let value = Arc::new(init()?);
        slots.insert(key, Arc::clone(&value) as Slot);
        Ok(value)
    }

    /// Stores an object under `key`, replacing any previous one.
    pub fn insert<T: Any + Send + Sync>(&self, key: &'static str, value: T) {
        self.slots.lock().insert(key, Arc::new(value));
    }

    /// Returns the object under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the stored object has another type.
    pub fn get<T: Any + Send + Sync>(&self, key: &'static str) -> Result<Option<Arc<T>>> {
        let slot = self.slots.lock().get(key).cloned();
        slot.map(|s| downcast(key, s)).transpose()
    }

    /// Returns true if something is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &'static str) -> bool {
        self.slots.lock().contains_key(key)
    }
}

fn downcast<T: Any + Send + Sync>(key: &str, slot: Slot) -> Result<Arc<T>> {
    slot.downcast::<T>().map_err(|_| {
        Error::internal(format!(
            "global slot {key:?} does not hold a {}",
            std::any::type_name::<T>()
        ))
    })
}

impl fmt::Debug for Global {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.lock();
        let mut keys: Vec<_> = slots.keys().collect();
        keys.sort();
        f.debug_struct("Global").field("keys", &keys).finish()
    }
}

/// Returns the shared GitHub client, building it on first use.
///
/// With the `testing` option the client talks to a [`FakeApi`]; otherwise
/// it goes over the network, authenticated by the `github_token` option or
/// the `GITHUB_TOKEN` environment variable.
///
/// # Errors
///
/// Returns a configuration error for invalid quota options or an unusable
/// token.
pub fn octo(options: &Options, global: &Global) -> Result<Arc<Octo>> {
    global.get_or_try_init(OCTO, || build(options))
}

fn build(options: &Options) -> Result<Octo> {
    let config = QuotaConfig::from_options(options)?;
    let api: Box<dyn RemoteApi> = if options.testing() {
        debug!("The connection to GitHub API is mocked");
        Box::new(FakeApi::new())
    } else {
        let token = select_token(options.github_token(), env::var(GITHUB_TOKEN_ENV).ok());
        Box::new(HttpApi::new(token.as_deref())?)
    };
    Ok(Octo::new(api, config))
}

/// Picks the token to use, logging what was found.
///
/// The option wins over the environment; an empty token is not used.
fn select_token(option: Option<&str>, env: Option<String>) -> Option<String> {
    let token = match option {
        Some(token) => Some(token.to_string()),
        None => {
            debug!("The 'github_token' option is not provided");
            if env.is_none() {
                debug!("The '{GITHUB_TOKEN_ENV}' environment variable is not set");
            }
            env
        }
    };
    match token {
        None => {
            warn!("Accessing GitHub API without a token!");
            None
        }
        Some(token) if token.is_empty() => {
            warn!("The GitHub API token is an empty string, won't use it");
            None
        }
        Some(token) => {
            info!("Accessing GitHub API with a token ({} chars)", token.len());
            Some(token)
        }
    }
}
