mod common;

use activity_feed::adapter::{normalize_issue_event, normalize_repo_event};
use activity_feed::assembler::assemble;
use activity_feed::filter::{filter_issue_events, is_excluded_action, EXCLUDED_ISSUE_ACTIONS};
use activity_feed::merger::merge;
use activity_feed::{EventClassifier, RepositoryPipeline};
use common::*;
use proptest::prelude::*;
use serde_json::json;

const T1: &str = "2024-03-01T10:00:00Z";
const T2: &str = "2024-03-01T11:00:00Z";
const T3: &str = "2024-03-01T12:00:00Z";

#[test]
fn test_issue_event_becomes_issues_event() {
    let event = normalize_issue_event(issue_event(42, "closed", T1));

    assert_eq!(event.id, "42");
    assert_eq!(event.event_type, EventType::Issues);
    assert_eq!(event.origin, EventOrigin::IssueEvents);
    assert_eq!(event.action(), Some("closed"));
    assert_eq!(event.payload["event"], "closed");
    assert_eq!(event.payload["issue"]["number"], 42);
    assert_eq!(event.actor.login, "hubot");
}

#[test]
fn test_issue_event_without_actor_is_attributed_to_ghost() {
    let mut raw = issue_event(1, "opened", T1);
    raw.actor = None;

    let event = normalize_issue_event(raw);
    assert_eq!(event.actor, Actor::ghost());
}

#[test]
fn test_issue_event_action_overrides_context() {
    let mut raw = issue_event(1, "reopened", T1);
    raw.context.insert("action".to_string(), json!("stale"));

    assert_eq!(normalize_issue_event(raw).action(), Some("reopened"));
}

#[test]
fn test_repo_event_keeps_payload() {
    let event = normalize_repo_event(push_event("9", T1));

    assert_eq!(event.event_type, EventType::Push);
    assert_eq!(event.origin, EventOrigin::RepoEvents);
    assert_eq!(event.payload["ref"], "refs/heads/main");
}

#[test]
fn test_unknown_repo_event_type_is_preserved() {
    let event = normalize_repo_event(repo_event("9", "DiscussionEvent", T1, json!({})));
    assert_eq!(event.event_type, EventType::Unknown("DiscussionEvent".to_string()));
    assert_eq!(event.event_type.to_string(), "DiscussionEvent");
}

#[test]
fn test_mentioned_is_dropped() {
    let events = vec![
        normalize_issue_event(issue_event(1, "mentioned", T1)),
        normalize_issue_event(issue_event(2, "closed", T1)),
    ];

    let kept = filter_issue_events(events);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id, "2");
}

#[test]
fn test_every_excluded_action_is_dropped() {
    let events = EXCLUDED_ISSUE_ACTIONS
        .iter()
        .enumerate()
        .map(|(index, action)| normalize_issue_event(issue_event(index as u64, action, T1)))
        .collect();

    assert!(filter_issue_events(events).is_empty());
}

#[test]
fn test_signal_actions_are_kept() {
    for action in ["opened", "closed", "reopened", "assigned", "unassigned", "labeled", "merged"] {
        assert!(!is_excluded_action(action), "{action} should be kept");
    }
}

#[test]
fn test_filter_leaves_repo_events_alone() {
    // a repo event whose action happens to be on the exclusion list still passes
    let event = normalize_repo_event(repo_event("1", "IssuesEvent", T1, json!({ "action": "mentioned" })));
    assert_eq!(filter_issue_events(vec![event]).len(), 1);
}

#[test]
fn test_merge_orders_newest_first() {
    let repo_events = vec![
        normalize_repo_event(push_event("a", T1)),
        normalize_repo_event(push_event("b", T3)),
    ];
    let issue_events = vec![normalize_issue_event(issue_event(1, "closed", T2))];

    let merged = merge(repo_events, issue_events);
    let ids: Vec<&str> = merged.iter().map(|event| event.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "1", "a"]);
}

#[test]
fn test_merge_puts_repo_events_first_on_ties() {
    let repo_events = vec![normalize_repo_event(push_event("push", T1))];
    let issue_events = vec![normalize_issue_event(issue_event(1, "closed", T1))];

    let merged = merge(repo_events, issue_events);
    assert_eq!(merged[0].origin, EventOrigin::RepoEvents);
    assert_eq!(merged[1].origin, EventOrigin::IssueEvents);
}

#[test]
fn test_assemble_marks_empty_entries() {
    let entry = assemble("octo/empty", Vec::new());

    assert_eq!(entry.repository_full_name, "octo/empty");
    assert!(entry.is_empty);
    assert!(entry.events.is_empty());
    assert!(entry.error.is_none());
}

#[test]
fn test_pipeline_merges_both_streams() {
    let classifier = EventClassifier::default();
    let pipeline = RepositoryPipeline::new(&classifier);

    let entry = pipeline.run(
        "a/b",
        vec![push_event("100", T2)],
        vec![issue_event(1, "opened", T1), issue_event(2, "subscribed", T3)],
    );

    assert_eq!(entry.repository_full_name, "a/b");
    assert!(!entry.is_empty);
    let types: Vec<&EventType> = entry.events.iter().map(|event| &event.event.event_type).collect();
    assert_eq!(types, vec![&EventType::Push, &EventType::Issues]);
    assert_eq!(entry.events[0].action.text, "pushed to");
    assert_eq!(entry.events[1].action.text, "opened issue");
}

#[test]
fn test_pipeline_with_only_noise_is_empty() {
    let classifier = EventClassifier::default();
    let entry = RepositoryPipeline::new(&classifier).run(
        "a/b",
        Vec::new(),
        vec![issue_event(1, "subscribed", T1), issue_event(2, "referenced", T2)],
    );

    assert!(entry.is_empty);
    assert!(entry.events.is_empty());
}

fn timestamp() -> impl Strategy<Value = String> {
    // few distinct values so ties are common
    (0u32..4, 0u32..3).prop_map(|(hour, minute)| format!("2024-03-01T1{hour}:{minute}0:00Z"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_merge_is_sorted_and_stable(
        repo_times in proptest::collection::vec(timestamp(), 0..12),
        issue_times in proptest::collection::vec(timestamp(), 0..12),
    ) {
        let repo_events: Vec<NormalizedEvent> = repo_times
            .iter()
            .enumerate()
            .map(|(index, at)| normalize_repo_event(push_event(&format!("r{index}"), at)))
            .collect();
        let issue_events: Vec<NormalizedEvent> = issue_times
            .iter()
            .enumerate()
            .map(|(index, at)| normalize_issue_event(issue_event(index as u64, "closed", at)))
            .collect();

        // position in the concatenation, used to check stability
        let mut order = Vec::new();
        order.extend(repo_events.iter().map(|event| (event.origin, event.id.clone())));
        order.extend(issue_events.iter().map(|event| (event.origin, event.id.clone())));
        let position = |event: &NormalizedEvent| {
            order
                .iter()
                .position(|(origin, id)| *origin == event.origin && *id == event.id)
                .unwrap()
        };

        let merged = merge(repo_events, issue_events);
        prop_assert_eq!(merged.len(), order.len());

        for pair in merged.windows(2) {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
            if pair[0].created_at == pair[1].created_at {
                prop_assert!(position(&pair[0]) < position(&pair[1]));
            }
        }
    }
}
