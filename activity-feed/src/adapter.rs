use crate::types::{Actor, EventOrigin, EventType, NormalizedEvent, RawIssueEvent, RawRepoEvent};
use serde_json::Value;

/// Repo events already have the normalized shape; only the type tag is parsed.
pub fn normalize_repo_event(raw: RawRepoEvent) -> NormalizedEvent {
    NormalizedEvent {
        id: raw.id,
        actor: raw.actor,
        created_at: raw.created_at,
        event_type: EventType::from(raw.event_type),
        payload: raw.payload,
        origin: EventOrigin::RepoEvents,
    }
}

/// Reshape an issue event so it reads like a repo `IssuesEvent`.
///
/// The issue-event stream names its action `event` while repo events use
/// `payload.action`, so the payload is the issue event's context with
/// `action` overwritten by `event`.
pub fn normalize_issue_event(raw: RawIssueEvent) -> NormalizedEvent {
    let RawIssueEvent {
        id,
        actor,
        created_at,
        event,
        mut context,
    } = raw;

    let actor = actor.unwrap_or_else(Actor::ghost);
    context.insert("event".to_string(), Value::String(event.clone()));
    context.insert("action".to_string(), Value::String(event));

    NormalizedEvent {
        id: id.to_string(),
        actor,
        created_at,
        event_type: EventType::Issues,
        payload: Value::Object(context),
        origin: EventOrigin::IssueEvents,
    }
}
