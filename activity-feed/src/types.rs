use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub use interfaces::{
    ActivityApi, Actor, FetchError, Owner, RawIssueEvent, RawRepoEvent, RepositoryDescriptor,
    RepositorySelector, SelectorParseError,
};

/// Event type tags emitted by the repository events endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    CommitComment,
    Create,
    Delete,
    Fork,
    Gollum,
    IssueComment,
    Issues,
    Member,
    Public,
    PullRequest,
    PullRequestReview,
    PullRequestReviewComment,
    PullRequestReviewThread,
    Push,
    Release,
    Sponsorship,
    Watch,
    Unknown(String),
}

impl EventType {
    pub fn as_tag(&self) -> &str {
        match self {
            EventType::CommitComment => "CommitCommentEvent",
            EventType::Create => "CreateEvent",
            EventType::Delete => "DeleteEvent",
            EventType::Fork => "ForkEvent",
            EventType::Gollum => "GollumEvent",
            EventType::IssueComment => "IssueCommentEvent",
            EventType::Issues => "IssuesEvent",
            EventType::Member => "MemberEvent",
            EventType::Public => "PublicEvent",
            EventType::PullRequest => "PullRequestEvent",
            EventType::PullRequestReview => "PullRequestReviewEvent",
            EventType::PullRequestReviewComment => "PullRequestReviewCommentEvent",
            EventType::PullRequestReviewThread => "PullRequestReviewThreadEvent",
            EventType::Push => "PushEvent",
            EventType::Release => "ReleaseEvent",
            EventType::Sponsorship => "SponsorshipEvent",
            EventType::Watch => "WatchEvent",
            EventType::Unknown(tag) => tag,
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "CommitCommentEvent" => EventType::CommitComment,
            "CreateEvent" => EventType::Create,
            "DeleteEvent" => EventType::Delete,
            "ForkEvent" => EventType::Fork,
            "GollumEvent" => EventType::Gollum,
            "IssueCommentEvent" => EventType::IssueComment,
            "IssuesEvent" => EventType::Issues,
            "MemberEvent" => EventType::Member,
            "PublicEvent" => EventType::Public,
            "PullRequestEvent" => EventType::PullRequest,
            "PullRequestReviewEvent" => EventType::PullRequestReview,
            "PullRequestReviewCommentEvent" => EventType::PullRequestReviewComment,
            "PullRequestReviewThreadEvent" => EventType::PullRequestReviewThread,
            "PushEvent" => EventType::Push,
            "ReleaseEvent" => EventType::Release,
            "SponsorshipEvent" => EventType::Sponsorship,
            "WatchEvent" => EventType::Watch,
            other => EventType::Unknown(other.to_string()),
        }
    }
}

impl From<String> for EventType {
    fn from(tag: String) -> Self {
        match EventType::from_tag(&tag) {
            EventType::Unknown(_) => EventType::Unknown(tag),
            known => known,
        }
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Unknown(tag) => tag,
            known => known.as_tag().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Which of the two upstream streams an event was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrigin {
    RepoEvents,
    IssueEvents,
}

/// An event in the repo-events shape, regardless of which stream it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub id: String,
    pub actor: Actor,
    pub created_at: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub payload: Value,
    pub origin: EventOrigin,
}

impl NormalizedEvent {
    pub fn action(&self) -> Option<&str> {
        self.payload.get("action").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetDescriptor {
    Link {
        href: String,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Login of the user whose hovercard the renderer may attach.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hovercard_subject: Option<String>,
    },
    Text {
        value: String,
    },
}

impl TargetDescriptor {
    pub fn is_link(&self) -> bool {
        matches!(self, TargetDescriptor::Link { .. })
    }
}

/// What an event did, as display text plus the things it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub text: String,
    pub targets: Vec<TargetDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEvent {
    pub event: NormalizedEvent,
    pub action: ActionDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub repository_full_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<ClassifiedEvent>,
    pub is_empty: bool,
    /// Only set under [`AggregationStrategy::Partial`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub entries: Vec<FeedEntry>,
    pub generated_at: DateTime<Utc>,
    /// Generation of the fetch cycle that produced this feed, if it was tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<u64>,
}

/// How per-repository failures affect the whole feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationStrategy {
    /// The first failing repository fails the whole feed.
    #[default]
    FailFast,
    /// Failing repositories become entries carrying their error.
    Partial,
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub web_base_url: String,
    pub strategy: AggregationStrategy,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            web_base_url: "https://github.com/".to_string(),
            strategy: AggregationStrategy::FailFast,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub api_base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub per_page: u8,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com/".to_string(),
            user_agent: "Activity-Feed/1.0".to_string(),
            timeout_seconds: 30,
            per_page: 100,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("fetching {repository} failed: {source}")]
    Fetch {
        repository: String,
        source: FetchError,
    },

    #[error("listing repositories failed: {0}")]
    Listing(#[source] FetchError),

    #[error("fetch cycle {generation} was superseded by a newer cycle")]
    Superseded { generation: u64 },

    #[error("fetch cycle {generation} was cancelled")]
    Cancelled { generation: u64 },

    #[error("repository {0} is not available for selection")]
    UnknownRepository(String),

    #[error(transparent)]
    InvalidSelector(#[from] SelectorParseError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AggregationError {
    /// The upstream fetch failure behind this error, if there was one.
    pub fn cause(&self) -> Option<&FetchError> {
        match self {
            AggregationError::Fetch { source, .. } | AggregationError::Listing(source) => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AggregationError>;
