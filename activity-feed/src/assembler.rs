use crate::types::{ClassifiedEvent, FeedEntry};

/// Package one repository's classified timeline.
///
/// An empty timeline is flagged so the renderer can say so explicitly
/// instead of drawing an empty section.
pub fn assemble(repo_full_name: &str, events: Vec<ClassifiedEvent>) -> FeedEntry {
    FeedEntry {
        repository_full_name: repo_full_name.to_string(),
        is_empty: events.is_empty(),
        events,
        error: None,
    }
}

/// Entry standing in for a repository whose fetch failed under the partial strategy.
pub fn failed(repo_full_name: &str, error: String) -> FeedEntry {
    FeedEntry {
        repository_full_name: repo_full_name.to_string(),
        events: Vec::new(),
        is_empty: true,
        error: Some(error),
    }
}
