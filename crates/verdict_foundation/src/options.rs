//! Read-only named options handed to judges.
//!
//! Options arrive as `key=value` strings from whatever launches the judges.
//! A few keys are understood by Verdict itself (`testing`, `github_token`,
//! `quota_pause`, `quota_limit`, `quota_rate`); everything else is kept
//! verbatim for the judges to read.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Option selecting the in-memory fake API instead of the network.
pub const TESTING: &str = "testing";
/// Option carrying the GitHub access token.
pub const GITHUB_TOKEN: &str = "github_token";

/// Immutable set of named options.
///
/// Keys are case-insensitive (normalised to lowercase); values are kept as
/// given and parsed on access.
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Options {
    values: BTreeMap<String, String>,
}

impl Options {
    /// Creates an empty set of options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_lowercase(), v.into()))
            .collect();
        Self { values }
    }

    /// Parses options from `key=value` strings.
    ///
    /// A bare `key` means `key=true`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a key is empty.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = BTreeMap::new();
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg.split_once('=').unwrap_or((arg, "true"));
            let key = key.trim();
            if key.is_empty() {
                return Err(Error::configuration(format!(
                    "option without a name: {arg:?}"
                )));
            }
            values.insert(key.to_lowercase(), value.to_string());
        }
        Ok(Self { values })
    }

    /// Returns a copy with one more option set.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.trim().to_lowercase(), value.into());
        self
    }

    /// Returns the raw value of an option.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Returns true when the option is present and not explicitly false.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| {
            !matches!(
                v.trim().to_lowercase().as_str(),
                "" | "false" | "no" | "off" | "0"
            )
        })
    }

    /// Parses a boolean option strictly.
    ///
    /// Unlike [`Options::flag`], only `true`/`false` (and `yes`/`no`,
    /// `on`/`off`, `1`/`0`) are accepted.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for any other value.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        self.get(key)
            .map(|v| match v.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(Error::configuration(format!(
                    "option {key} must be true or false, got {v:?}"
                ))),
            })
            .transpose()
    }

    /// Parses an unsigned integer option.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the value is not a number.
    pub fn get_u64(&self, key: &str) -> Result<Option<u64>> {
        self.get(key)
            .map(|v| {
                v.trim().parse::<u64>().map_err(|_| {
                    Error::configuration(format!("option {key} must be a number, got {v:?}"))
                })
            })
            .transpose()
    }

    /// Parses a signed integer option.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the value is not a number.
    pub fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        self.get(key)
            .map(|v| {
                v.trim().parse::<i64>().map_err(|_| {
                    Error::configuration(format!("option {key} must be a number, got {v:?}"))
                })
            })
            .transpose()
    }

    /// Whether the fake API must be used instead of the network.
    #[must_use]
    pub fn testing(&self) -> bool {
        self.flag(TESTING)
    }

    /// The GitHub token, if one was given.
    #[must_use]
    pub fn github_token(&self) -> Option<&str> {
        self.get(GITHUB_TOKEN)
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no options are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over all options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens must not end up in logs.
        let mut map = f.debug_map();
        for (k, v) in &self.values {
            if k.contains("token") {
                map.entry(k, &format_args!("<{} chars>", v.len()));
            } else {
                map.entry(k, v);
            }
        }
        map.finish()
    }
}
