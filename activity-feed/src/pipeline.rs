use crate::adapter::{normalize_issue_event, normalize_repo_event};
use crate::assembler::assemble;
use crate::classifier::EventClassifier;
use crate::filter::filter_issue_events;
use crate::merger::merge;
use crate::types::{ClassifiedEvent, FeedEntry, NormalizedEvent, RawIssueEvent, RawRepoEvent};
use tracing::debug;

/// Runs one repository's raw events through adapter, filter, merger,
/// classifier and assembler.
pub struct RepositoryPipeline<'a> {
    classifier: &'a EventClassifier,
}

impl<'a> RepositoryPipeline<'a> {
    pub fn new(classifier: &'a EventClassifier) -> Self {
        Self { classifier }
    }

    /// Normalized, filtered and sorted timeline, before classification.
    pub fn timeline(&self, repo_events: Vec<RawRepoEvent>, issue_events: Vec<RawIssueEvent>) -> Vec<NormalizedEvent> {
        let repo_events: Vec<NormalizedEvent> = repo_events.into_iter().map(normalize_repo_event).collect();
        let issue_events = filter_issue_events(issue_events.into_iter().map(normalize_issue_event).collect());
        merge(repo_events, issue_events)
    }

    pub fn run(
        &self,
        repo_full_name: &str,
        repo_events: Vec<RawRepoEvent>,
        issue_events: Vec<RawIssueEvent>,
    ) -> FeedEntry {
        let fetched = repo_events.len() + issue_events.len();
        let timeline = self.timeline(repo_events, issue_events);

        debug!("{}: {} of {} fetched events remain after filtering", repo_full_name, timeline.len(), fetched);

        let classified = timeline
            .into_iter()
            .map(|event| {
                let action = self.classifier.classify(&event, repo_full_name);
                ClassifiedEvent { event, action }
            })
            .collect();

        assemble(repo_full_name, classified)
    }
}
