use interfaces::*;
use serde_json::json;

#[test]
fn test_repo_event_deserializes_from_api_shape() {
    let raw: RawRepoEvent = serde_json::from_value(json!({
        "id": "31415926535",
        "type": "PushEvent",
        "actor": {
            "id": 1,
            "login": "octocat",
            "display_login": "octocat",
            "avatar_url": "https://avatars.githubusercontent.com/u/1?"
        },
        "repo": { "id": 7, "name": "octo/hello" },
        "payload": { "ref": "refs/heads/main", "size": 1 },
        "public": true,
        "created_at": "2024-03-01T10:00:00Z"
    }))
    .unwrap();

    assert_eq!(raw.id, "31415926535");
    assert_eq!(raw.event_type, "PushEvent");
    assert_eq!(raw.actor.login, "octocat");
    assert_eq!(raw.payload["ref"], "refs/heads/main");
}

#[test]
fn test_issue_event_keeps_context_fields() {
    let raw: RawIssueEvent = serde_json::from_value(json!({
        "id": 42,
        "event": "labeled",
        "actor": { "login": "hubot", "avatar_url": "https://example.com/a.png" },
        "created_at": "2024-03-01T09:00:00Z",
        "label": { "name": "bug", "color": "d73a4a" },
        "issue": { "number": 12, "title": "Crash on start", "html_url": "https://github.com/octo/hello/issues/12" }
    }))
    .unwrap();

    assert_eq!(raw.id, 42);
    assert_eq!(raw.event, "labeled");
    assert_eq!(raw.actor.unwrap().login, "hubot");
    assert_eq!(raw.context["issue"]["number"], 12);
    assert_eq!(raw.context["label"]["name"], "bug");
    assert!(!raw.context.contains_key("event"));
}

#[test]
fn test_issue_event_with_deleted_actor() {
    let raw: RawIssueEvent = serde_json::from_value(json!({
        "id": 43,
        "event": "closed",
        "actor": null,
        "created_at": "2024-03-01T09:00:00Z"
    }))
    .unwrap();

    assert!(raw.actor.is_none());
    assert_eq!(Actor::ghost().login, GHOST_LOGIN);
}

#[test]
fn test_selector_parsing() {
    let selector: RepositorySelector = "octo/hello".parse().unwrap();
    assert_eq!(selector.owner, "octo");
    assert_eq!(selector.name, "hello");
    assert_eq!(selector.id, None);
    assert_eq!(selector.full_name(), "octo/hello");
    assert_eq!(selector.to_string(), "octo/hello");

    for bad in ["hello", "/hello", "octo/", "a/b/c", ""] {
        assert!(bad.parse::<RepositorySelector>().is_err(), "{bad:?} should not parse");
    }
}

#[test]
fn test_selector_from_descriptor() {
    let descriptor = RepositoryDescriptor {
        id: 99,
        name: "hello".to_string(),
        full_name: "octo/hello".to_string(),
        owner: Owner { login: "octo".to_string() },
    };

    let selector = RepositorySelector::from(&descriptor);
    assert_eq!(selector.id, Some(99));
    assert_eq!(selector.full_name(), descriptor.full_name);
}
