use crate::types::{EventOrigin, NormalizedEvent};
use tracing::debug;

/// Issue-event actions that never reach the feed. They are either too
/// granular or already covered by a native repo event (comments, reviews).
pub const EXCLUDED_ISSUE_ACTIONS: [&str; 38] = [
    "added_to_project",
    "automatic_base_change_failed",
    "automatic_base_change_succeeded",
    "base_ref_changed",
    "commented",
    "committed",
    "connected",
    "convert_to_draft",
    "converted_note_to_issue",
    "converted_to_discussion",
    "cross-referenced",
    "demilestoned",
    "deployed",
    "deployment_environment_changed",
    "disconnected",
    "head_ref_deleted",
    "head_ref_restored",
    "head_ref_force_pushed",
    "locked",
    "mentioned",
    "marked_as_duplicate",
    "milestoned",
    "moved_columns_in_project",
    "pinned",
    "referenced",
    "removed_from_project",
    "renamed",
    "review_dismissed",
    "review_requested",
    "review_request_removed",
    "reviewed",
    "subscribed",
    "transferred",
    "unlocked",
    "unmarked_as_duplicate",
    "unpinned",
    "unsubscribed",
    "user_blocked",
];

pub fn is_excluded_action(action: &str) -> bool {
    EXCLUDED_ISSUE_ACTIONS.contains(&action)
}

/// Whether an issue-origin event is worth showing.
///
/// Repo-origin events are deduplicated upstream and always pass.
pub fn is_signal(event: &NormalizedEvent) -> bool {
    match event.origin {
        EventOrigin::RepoEvents => true,
        EventOrigin::IssueEvents => !event.action().is_some_and(is_excluded_action),
    }
}

/// Drop noise from a batch of normalized issue events.
pub fn filter_issue_events(events: Vec<NormalizedEvent>) -> Vec<NormalizedEvent> {
    let before = events.len();
    let kept: Vec<NormalizedEvent> = events
        .into_iter()
        .filter(|event| {
            let keep = is_signal(event);
            if !keep {
                debug!("Dropping issue event {} ({})", event.id, event.action().unwrap_or_default());
            }
            keep
        })
        .collect();

    debug!("Kept {}/{} issue events", kept.len(), before);
    kept
}
