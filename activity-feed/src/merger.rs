use crate::types::NormalizedEvent;

/// Combine both streams of one repository into a single timeline, newest first.
///
/// Timestamps are compared as strings; the API emits fixed-precision
/// ISO-8601 in UTC, which sorts lexicographically. The sort is stable, so
/// events sharing a timestamp keep their concatenation order with repo
/// events ahead of issue events.
pub fn merge(
    repo_events: Vec<NormalizedEvent>,
    issue_events: Vec<NormalizedEvent>,
) -> Vec<NormalizedEvent> {
    let mut merged = repo_events;
    merged.extend(issue_events);
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged
}
