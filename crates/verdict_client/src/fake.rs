//! In-memory stand-in for the GitHub API.
//!
//! Selected by the `testing` option. Answers are deterministic: entity ids
//! are derived from names and event timestamps come from a seeded generator.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{Value as Json, json};
use tracing::trace;
use verdict_foundation::{Error, Result};

use crate::api::{ApiRequest, ApiResponse, Method, RemoteApi};

/// Remaining quota reported by a fresh fake.
pub const DEFAULT_REMAINING: i64 = 100;
/// Limit reported by `/rate_limit`.
pub const RATE_LIMIT: i64 = 5000;

#[derive(Clone, Debug)]
struct User {
    id: u64,
    login: String,
    bot: bool,
}

/// Deterministic id for a name: the sum of its character codes.
#[must_use]
pub fn name_to_number(name: &str) -> u64 {
    name.chars().map(u64::from).sum()
}

/// Fake GitHub API.
pub struct FakeApi {
    remaining: Arc<AtomicI64>,
    consuming: bool,
    users: BTreeMap<u64, User>,
    repos: BTreeMap<String, u64>,
    clock: DateTime<Utc>,
    rng: Mutex<ChaCha8Rng>,
    comments: AtomicU64,
    calls: AtomicU64,
}

impl FakeApi {
    /// Creates a fake with a few users and repositories already known.
    #[must_use]
    pub fn new() -> Self {
        Self {
            remaining: Arc::new(AtomicI64::new(DEFAULT_REMAINING)),
            consuming: false,
            users: BTreeMap::new(),
            repos: BTreeMap::new(),
            clock: Utc::now(),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(42)),
            comments: AtomicU64::new(0),
            calls: AtomicU64::new(0),
        }
        .with_user(444, "yegor256")
        .with_user(888, "torvalds")
        .with_bot(29_139_614, "renovate[bot]")
        .with_repository("yegor256/judges")
        .with_repository("yegor256/test")
        .with_repository("torvalds/linux")
    }

    /// Sets the remaining quota.
    #[must_use]
    pub fn with_remaining(self, remaining: i64) -> Self {
        self.remaining.store(remaining, Ordering::SeqCst);
        self
    }

    /// Makes every request (except `/rate_limit`) use up one call of quota.
    #[must_use]
    pub const fn consuming(mut self) -> Self {
        self.consuming = true;
        self
    }

    /// Registers a user.
    #[must_use]
    pub fn with_user(mut self, id: u64, login: &str) -> Self {
        self.users.insert(
            id,
            User {
                id,
                login: login.to_string(),
                bot: false,
            },
        );
        self
    }

    /// Registers a bot account.
    #[must_use]
    pub fn with_bot(mut self, id: u64, login: &str) -> Self {
        self.users.insert(
            id,
            User {
                id,
                login: login.to_string(),
                bot: true,
            },
        );
        self
    }

    /// Registers a repository; its id is [`name_to_number`] of the name.
    #[must_use]
    pub fn with_repository(self, full_name: &str) -> Self {
        let id = name_to_number(full_name);
        self.with_repository_id(full_name, id)
    }

    /// Registers a repository with an explicit id.
    #[must_use]
    pub fn with_repository_id(mut self, full_name: &str, id: u64) -> Self {
        self.repos.insert(full_name.to_string(), id);
        self
    }

    /// Fixes the time events are dated relative to.
    #[must_use]
    pub const fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.clock = now;
        self
    }

    /// Reseeds the generator behind event timestamps.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock() = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// A handle to the remaining quota, for changing it after construction.
    #[must_use]
    pub fn remaining_handle(&self) -> Arc<AtomicI64> {
        Arc::clone(&self.remaining)
    }

    /// Current remaining quota.
    #[must_use]
    pub fn remaining(&self) -> i64 {
        self.remaining.load(Ordering::SeqCst)
    }

    /// Number of requests served so far, failed ones included.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn consume(&self) {
        if self.consuming {
            // Never drops below zero.
            let _ = self
                .remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |r| {
                    (r > 0).then(|| r - 1)
                });
        }
    }

    fn repo_id(&self, full_name: &str) -> Result<u64> {
        self.repos
            .get(full_name)
            .copied()
            .ok_or_else(|| Error::not_found(format!("GitHub repository {full_name}")))
    }

    fn random_time(&self) -> String {
        let ago = self.rng.lock().gen_range(0..10_000);
        (self.clock - Duration::seconds(ago)).to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn user_json(user: &User) -> Json {
        let kind = if user.bot { "Bot" } else { "User" };
        json!({ "id": user.id, "login": user.login, "type": kind })
    }

    fn repo_json(full_name: &str, id: u64) -> Json {
        let (owner, name) = full_name.split_once('/').unwrap_or(("", full_name));
        json!({
            "id": id,
            "name": name,
            "full_name": full_name,
            "owner": { "login": owner },
            "private": false,
        })
    }

    fn rate_limit(&self) -> Json {
        let remaining = self.remaining();
        let rate = json!({
            "limit": RATE_LIMIT,
            "remaining": remaining,
            "used": RATE_LIMIT - remaining,
        });
        json!({ "resources": { "core": rate.clone() }, "rate": rate })
    }

    fn owned_repositories(&self, owner: &str) -> Json {
        let prefix = format!("{owner}/");
        Json::Array(
            self.repos
                .iter()
                .filter(|(name, _)| name.starts_with(&prefix))
                .map(|(name, &id)| Self::repo_json(name, id))
                .collect(),
        )
    }

    fn events(&self, full_name: &str) -> Result<Json> {
        let id = self.repo_id(full_name)?;
        let repo = json!({
            "id": id,
            "name": full_name,
            "url": format!("https://api.github.com/repos/{full_name}"),
        });
        let actor = json!({ "id": 888, "login": "torvalds", "display_login": "torvalds" });
        Ok(json!([
            {
                "id": "123",
                "type": "PushEvent",
                "repo": repo,
                "actor": actor,
                "payload": {
                    "push_id": 42,
                    "ref": "refs/heads/master",
                    "size": 1,
                    "distinct_size": 0,
                    "head": "b7089c51cc2526a0d2619d35379f921d53c72731",
                    "before": "12d3bff1a55bad50ee2e8f29ade7f1c1e07bb025",
                },
                "created_at": self.random_time(),
                "public": true,
            },
            {
                "id": "124",
                "type": "IssuesEvent",
                "repo": repo,
                "actor": actor,
                "payload": { "action": "closed", "issue": { "number": 42 } },
                "created_at": self.random_time(),
                "public": true,
            },
            {
                "id": "125",
                "type": "IssuesEvent",
                "repo": repo,
                "actor": actor,
                "payload": { "action": "opened", "issue": { "number": 42 } },
                "created_at": self.random_time(),
                "public": true,
            },
        ]))
    }

    fn timeline(&self, full_name: &str) -> Result<Json> {
        self.repo_id(full_name)?;
        let actor = json!({ "id": 888, "login": "torvalds" });
        let repository = json!({
            "id": name_to_number("yegor256/judges"),
            "full_name": "yegor256/judges",
        });
        Ok(json!([
            {
                "actor": actor,
                "repository": repository,
                "event": "renamed",
                "rename": { "from": "before", "to": "after" },
                "created_at": self.random_time(),
            },
            {
                "actor": actor,
                "repository": repository,
                "event": "labeled",
                "label": { "name": "bug" },
                "created_at": self.random_time(),
            },
        ]))
    }

    fn route(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let (path, _query) = request
            .path
            .split_once('?')
            .unwrap_or((request.path.as_str(), ""));
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let body = match (request.method, segments.as_slice()) {
            (Method::Get, ["rate_limit"]) => {
                return Ok(ApiResponse::ok(self.rate_limit()).with_remaining(self.remaining()));
            }
            (Method::Get, ["user", id]) => {
                let user = id
                    .parse::<u64>()
                    .ok()
                    .and_then(|id| self.users.get(&id))
                    .ok_or_else(|| Error::not_found(format!("GitHub user #{id}")))?;
                Self::user_json(user)
            }
            (Method::Get, ["users", login]) => {
                let user = self
                    .users
                    .values()
                    .find(|u| u.login == *login)
                    .ok_or_else(|| Error::not_found(format!("GitHub user @{login}")))?;
                Self::user_json(user)
            }
            (Method::Get, ["users" | "orgs", owner, "repos"]) => self.owned_repositories(owner),
            (Method::Get, ["repos", owner, name]) => {
                let full_name = format!("{owner}/{name}");
                let id = self.repo_id(&full_name)?;
                Self::repo_json(&full_name, id)
            }
            (Method::Get, ["repositories", id]) => {
                let (name, id) = id
                    .parse::<u64>()
                    .ok()
                    .and_then(|id| self.repos.iter().find(|(_, r)| **r == id))
                    .ok_or_else(|| Error::not_found(format!("GitHub repository #{id}")))?;
                Self::repo_json(name, *id)
            }
            (Method::Get, ["repos", owner, name, "events"]) => {
                self.events(&format!("{owner}/{name}"))?
            }
            (Method::Get, ["repos", owner, name, "issues", _, "timeline"]) => {
                self.timeline(&format!("{owner}/{name}"))?
            }
            (Method::Get, ["search", "issues"]) => json!({
                "total_count": 1,
                "incomplete_results": false,
                "items": [
                    { "number": 42, "title": "Something is broken", "labels": [{ "name": "bug" }] }
                ],
            }),
            (Method::Post, ["repos", owner, name, "issues", number, "comments"]) => {
                self.repo_id(&format!("{owner}/{name}"))?;
                let id = 42 + self.comments.fetch_add(1, Ordering::SeqCst);
                let text = request
                    .body
                    .as_ref()
                    .and_then(|b| b.get("body"))
                    .cloned()
                    .unwrap_or(Json::Null);
                self.consume();
                return Ok(ApiResponse::ok(json!({ "id": id, "body": text, "issue_number": number }))
                    .with_status(201)
                    .with_remaining(self.remaining()));
            }
            _ => {
                return Err(Error::not_found(format!(
                    "{} {}",
                    request.method.as_str(),
                    request.path
                )));
            }
        };
        self.consume();
        Ok(ApiResponse::ok(body).with_remaining(self.remaining()))
    }
}

impl Default for FakeApi {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteApi for FakeApi {
    fn call(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        trace!(method = request.method.as_str(), path = %request.path, "Fake GitHub request");
        self.route(request)
    }
}

impl fmt::Debug for FakeApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeApi")
            .field("remaining", &self.remaining())
            .field("users", &self.users.len())
            .field("repos", &self.repos.len())
            .finish_non_exhaustive()
    }
}
