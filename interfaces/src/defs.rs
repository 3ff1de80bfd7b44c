use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Login used by the hosting service for accounts that no longer exist.
pub const GHOST_LOGIN: &str = "ghost";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

impl Actor {
    pub fn ghost() -> Self {
        Self {
            login: GHOST_LOGIN.to_owned(),
            avatar_url: String::new(),
        }
    }
}

/// An entry of `GET /repos/{owner}/{repo}/events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRepoEvent {
    pub id: String,
    pub actor: Actor,
    pub created_at: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub payload: Value,
}

/// An entry of `GET /repos/{owner}/{repo}/issues/events`.
///
/// Only the fields shared with repo events are typed. Everything else
/// (`issue`, `assignee`, `label`, ...) is kept verbatim in `context`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIssueEvent {
    pub id: u64,
    // null for deleted accounts
    #[serde(default)]
    pub actor: Option<Actor>,
    pub created_at: String,
    pub event: String,
    #[serde(flatten)]
    pub context: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// An entry of `GET /user/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
}

/// Identifies one repository to aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositorySelector {
    /// Unknown when the selector was parsed from an `owner/name` string.
    pub id: Option<u64>,
    pub owner: String,
    pub name: String,
}

impl RepositorySelector {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositorySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl From<&RepositoryDescriptor> for RepositorySelector {
    fn from(repo: &RepositoryDescriptor) -> Self {
        Self {
            id: Some(repo.id),
            owner: repo.owner.login.clone(),
            name: repo.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected a repository in the form owner/name, got {input:?}")]
pub struct SelectorParseError {
    pub input: String,
}

impl FromStr for RepositorySelector {
    type Err = SelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SelectorParseError { input: s.to_owned() };
        let (owner, name) = s.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self::new(owner, name))
    }
}

/// Failure of a single call to the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Unauthorized(String),

    #[error("rate limited until {reset_at:?}")]
    RateLimited { reset_at: Option<u64> },

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

// Object style note:
// Implementations of `ActivityApi` are handed to the feed crate as
// `Arc<dyn ActivityApi>`. They own transport concerns (auth, paging, quota)
// and return one page of results per call.

#[async_trait]
pub trait ActivityApi: Send + Sync {
    async fn list_repo_events(&self, owner: &str, repo: &str) -> Result<Vec<RawRepoEvent>, FetchError>;

    async fn list_events_for_repo(&self, owner: &str, repo: &str) -> Result<Vec<RawIssueEvent>, FetchError>;

    async fn list_for_authenticated_user(&self) -> Result<Vec<RepositoryDescriptor>, FetchError>;
}
