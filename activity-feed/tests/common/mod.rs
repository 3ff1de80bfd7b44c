#![allow(dead_code)]

// Re-export commonly used test types
pub use activity_feed::types::*;
// the crate alias takes one parameter; test doubles return FetchError
use std::result::Result;

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What the scripted API answers for one repository.
#[derive(Debug, Clone, Default)]
pub struct RepoScript {
    pub repo_events: Vec<RawRepoEvent>,
    pub issue_events: Vec<RawIssueEvent>,
    pub repo_events_delay: Duration,
    pub issue_events_delay: Duration,
    pub repo_events_error: Option<FetchError>,
    pub issue_events_error: Option<FetchError>,
}

impl RepoScript {
    pub fn with_events(repo_events: Vec<RawRepoEvent>, issue_events: Vec<RawIssueEvent>) -> Self {
        Self {
            repo_events,
            issue_events,
            ..Self::default()
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.repo_events_delay = delay;
        self.issue_events_delay = delay;
        self
    }

    pub fn failing(mut self, error: FetchError) -> Self {
        self.issue_events_error = Some(error);
        self
    }
}

/// In-memory `ActivityApi` with per-repository answers and latencies.
#[derive(Default)]
pub struct ScriptedApi {
    scripts: HashMap<String, RepoScript>,
    available: Vec<RepositoryDescriptor>,
    pub calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(mut self, full_name: &str, script: RepoScript) -> Self {
        self.scripts.insert(full_name.to_string(), script);
        self
    }

    pub fn with_available(mut self, full_names: &[&str]) -> Self {
        self.available = full_names
            .iter()
            .enumerate()
            .map(|(index, full_name)| descriptor(index as u64 + 1, full_name))
            .collect();
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn script(&self, owner: &str, repo: &str) -> Result<&RepoScript, FetchError> {
        self.scripts.get(&format!("{owner}/{repo}")).ok_or(FetchError::Status {
            status: 404,
            message: "Not Found".to_string(),
        })
    }
}

#[async_trait]
impl ActivityApi for ScriptedApi {
    async fn list_repo_events(&self, owner: &str, repo: &str) -> Result<Vec<RawRepoEvent>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script(owner, repo)?;
        tokio::time::sleep(script.repo_events_delay).await;
        match &script.repo_events_error {
            Some(error) => Err(error.clone()),
            None => Ok(script.repo_events.clone()),
        }
    }

    async fn list_events_for_repo(&self, owner: &str, repo: &str) -> Result<Vec<RawIssueEvent>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script(owner, repo)?;
        tokio::time::sleep(script.issue_events_delay).await;
        match &script.issue_events_error {
            Some(error) => Err(error.clone()),
            None => Ok(script.issue_events.clone()),
        }
    }

    async fn list_for_authenticated_user(&self) -> Result<Vec<RepositoryDescriptor>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.available.clone())
    }
}

pub fn descriptor(id: u64, full_name: &str) -> RepositoryDescriptor {
    let (owner, name) = full_name.split_once('/').expect("owner/name");
    RepositoryDescriptor {
        id,
        name: name.to_string(),
        full_name: full_name.to_string(),
        owner: Owner { login: owner.to_string() },
    }
}

pub fn actor(login: &str) -> Actor {
    Actor {
        login: login.to_string(),
        avatar_url: format!("https://avatars.example.com/{login}"),
    }
}

pub fn repo_event(id: &str, event_type: &str, created_at: &str, payload: Value) -> RawRepoEvent {
    RawRepoEvent {
        id: id.to_string(),
        actor: actor("octocat"),
        created_at: created_at.to_string(),
        event_type: event_type.to_string(),
        payload,
    }
}

pub fn issue_event(id: u64, event: &str, created_at: &str) -> RawIssueEvent {
    let context = json!({
        "issue": {
            "number": id,
            "title": format!("Issue {id}"),
            "html_url": format!("https://github.com/octo/hello/issues/{id}"),
        }
    });
    RawIssueEvent {
        id,
        actor: Some(actor("hubot")),
        created_at: created_at.to_string(),
        event: event.to_string(),
        context: context.as_object().cloned().unwrap_or_default(),
    }
}

pub fn normalized(id: &str, event_type: EventType, payload: Value) -> NormalizedEvent {
    NormalizedEvent {
        id: id.to_string(),
        actor: actor("octocat"),
        created_at: "2024-03-01T10:00:00Z".to_string(),
        event_type,
        payload,
        origin: EventOrigin::RepoEvents,
    }
}

pub fn push_event(id: &str, created_at: &str) -> RawRepoEvent {
    repo_event(id, "PushEvent", created_at, json!({ "ref": "refs/heads/main", "size": 1 }))
}

pub fn selectors(full_names: &[&str]) -> Vec<RepositorySelector> {
    full_names
        .iter()
        .map(|name| name.parse().expect("owner/name"))
        .collect()
}
