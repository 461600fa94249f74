//! The GitHub client judges talk to.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Value as Json, json};
use tracing::{debug, info};
use verdict_foundation::{Error, Result};

use crate::api::{ApiRequest, ApiResponse, RemoteApi};
use crate::http::DEFAULT_BASE_URL;
use crate::quota::{self, QuotaConfig, QuotaLayer};

/// Quota checks and identity lookups every judge may rely on.
///
/// Every call goes to the API; nothing is cached.
pub trait QuotaAwareClient {
    /// Returns true when fewer than [`quota::EXHAUSTION_MARGIN`] calls are left.
    ///
    /// # Errors
    ///
    /// Returns an error if the quota cannot be fetched.
    fn is_exhausted(&self) -> Result<bool>;

    /// Resolves a user id to a login.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if no such user exists.
    fn user_name_by_id(&self, id: u64) -> Result<String>;

    /// Resolves `owner/name` to a repository id.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if no such repository exists.
    fn repo_id_by_name(&self, name: &str) -> Result<u64>;

    /// Resolves a repository id to `owner/name`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if no such repository exists.
    fn repo_name_by_id(&self, id: u64) -> Result<String>;
}

/// Quota numbers reported by `/rate_limit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Calls allowed per window.
    pub limit: i64,
    /// Calls left in the current window.
    pub remaining: i64,
    /// Calls used in the current window.
    #[serde(default)]
    pub used: i64,
}

/// A GitHub account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Numeric id.
    pub id: u64,
    /// Login name.
    pub login: String,
    /// `User`, `Bot` or `Organization`.
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl User {
    /// Returns true for bot accounts.
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.kind == "Bot"
    }
}

/// A GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Numeric id.
    pub id: u64,
    /// `owner/name`.
    pub full_name: String,
    /// Whether the repository is private.
    #[serde(default)]
    pub private: bool,
}

/// Repository reference inside an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRepo {
    /// Numeric id.
    pub id: u64,
    /// `owner/name`.
    pub name: String,
}

/// Account reference inside an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Numeric id.
    pub id: u64,
    /// Login name.
    pub login: String,
}

/// An entry of a repository's event feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event id (a string in the GitHub API).
    pub id: String,
    /// Event type, like `PushEvent`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Repository the event happened in.
    pub repo: EventRepo,
    /// Who triggered it.
    pub actor: Actor,
    /// Type-specific details.
    #[serde(default)]
    pub payload: Json,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

/// A label on an issue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name.
    pub name: String,
}

/// An issue or pull request found by search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number inside its repository.
    pub number: u64,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Labels.
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Result page of an issue search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Number of matches overall.
    pub total_count: u64,
    /// Matches on this page.
    pub items: Vec<Issue>,
}

/// Old and new title of a renamed issue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    /// Title before.
    pub from: String,
    /// Title after.
    pub to: String,
}

/// An entry of an issue's timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// What happened, like `renamed` or `labeled`.
    pub event: String,
    /// Who did it.
    pub actor: Actor,
    /// Set for `renamed` events.
    #[serde(default)]
    pub rename: Option<Rename>,
    /// Set for `labeled` and `unlabeled` events.
    #[serde(default)]
    pub label: Option<Label>,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

/// A created comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Numeric id.
    pub id: u64,
}

/// Quota-aware GitHub client.
///
/// All requests go through a [`QuotaLayer`], so heavy use pauses the thread
/// instead of running into the API's limit.
pub struct Octo {
    api: QuotaLayer<Box<dyn RemoteApi>>,
}

impl Octo {
    /// Wraps an API in a quota layer with the given settings.
    #[must_use]
    pub fn new(api: Box<dyn RemoteApi>, config: QuotaConfig) -> Self {
        Self {
            api: QuotaLayer::new(api, config),
        }
    }

    /// Uses an already configured quota layer.
    #[must_use]
    pub fn from_layer(api: QuotaLayer<Box<dyn RemoteApi>>) -> Self {
        Self { api }
    }

    /// The quota layer in front of the API.
    #[must_use]
    pub const fn layer(&self) -> &QuotaLayer<Box<dyn RemoteApi>> {
        &self.api
    }

    /// Performs a raw request.
    ///
    /// # Errors
    ///
    /// Returns whatever error the API reports.
    pub fn call(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.api.call(request)
    }

    fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.call(&ApiRequest::get(path))?.json()
    }

    /// Current quota.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn rate_limit(&self) -> Result<RateLimit> {
        let response = self.call(&ApiRequest::get("/rate_limit"))?;
        let rate = response
            .body
            .get("rate")
            .cloned()
            .ok_or_else(|| Error::serialization("rate limit answer has no 'rate'"))?;
        RateLimit::deserialize(rate)
            .map_err(|e| Error::serialization(format!("unexpected rate limit shape: {e}")))
    }

    /// A user by id.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown users.
    pub fn user(&self, id: u64) -> Result<User> {
        self.get(&format!("/user/{id}"))
    }

    /// A user by login.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown logins.
    pub fn user_by_login(&self, login: &str) -> Result<User> {
        self.get(&format!("/users/{login}"))
    }

    /// A repository by `owner/name`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown repositories.
    pub fn repository(&self, name: &str) -> Result<Repository> {
        self.get(&format!("/repos/{name}"))
    }

    /// A repository by id.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown repositories.
    pub fn repository_by_id(&self, id: u64) -> Result<Repository> {
        self.get(&format!("/repositories/{id}"))
    }

    /// Repositories of an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn repositories(&self, org: &str) -> Result<Vec<Repository>> {
        self.get(&format!("/orgs/{org}/repos?per_page=100"))
    }

    /// Recent events of a repository.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown repositories.
    pub fn repository_events(&self, name: &str) -> Result<Vec<Event>> {
        self.get(&format!("/repos/{name}/events?per_page=100"))
    }

    /// Timeline of an issue: renames, labels and the like.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown repositories.
    pub fn issue_timeline(&self, repo: &str, issue: u64) -> Result<Vec<TimelineEvent>> {
        self.get(&format!("/repos/{repo}/issues/{issue}/timeline?per_page=100"))
    }

    /// Posts a comment on an issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn add_comment(&self, repo: &str, issue: u64, text: &str) -> Result<Comment> {
        self.call(&ApiRequest::post(
            format!("/repos/{repo}/issues/{issue}/comments"),
            json!({ "body": text }),
        ))?
        .json()
    }

    /// Searches issues and pull requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn search_issues(&self, query: &str) -> Result<SearchResult> {
        self.get(&search_path(query)?)
    }

    fn field(&self, path: &str, field: &str) -> Result<Json> {
        let response = self.call(&ApiRequest::get(path))?;
        response
            .body
            .get(field)
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{path} has no '{field}'")))
    }
}

/// Path of an issue search, with the query form-encoded.
fn search_path(query: &str) -> Result<String> {
    let url = Url::parse_with_params(&format!("{DEFAULT_BASE_URL}/search/issues"), &[("q", query)])
        .map_err(|e| Error::internal(format!("cannot build search URL: {e}")))?;
    Ok(format!("{}?{}", url.path(), url.query().unwrap_or_default()))
}

impl QuotaAwareClient for Octo {
    fn is_exhausted(&self) -> Result<bool> {
        let left = self.rate_limit()?.remaining;
        if quota::is_exhausted(left) {
            info!("Too much GitHub API quota consumed already (remaining={left}), stopping");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn user_name_by_id(&self, id: u64) -> Result<String> {
        let login = self.field(&format!("/user/{id}"), "login")?;
        let name = login
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::not_found(format!("GitHub user #{id} has no login")))?;
        debug!("GitHub user #{id} has a name: @{name}");
        Ok(name)
    }

    fn repo_id_by_name(&self, name: &str) -> Result<u64> {
        let id = self
            .field(&format!("/repos/{name}"), "id")?
            .as_u64()
            .ok_or_else(|| Error::not_found(format!("GitHub repository {name} has no ID")))?;
        debug!("GitHub repository {name} has an ID: #{id}");
        Ok(id)
    }

    fn repo_name_by_id(&self, id: u64) -> Result<String> {
        let name = self
            .field(&format!("/repositories/{id}"), "full_name")?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::not_found(format!("GitHub repository #{id} has no name")))?;
        debug!("GitHub repository #{id} has a name: {name}");
        Ok(name)
    }
}

impl fmt::Debug for Octo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Octo").field("api", &self.api).finish()
    }
}
