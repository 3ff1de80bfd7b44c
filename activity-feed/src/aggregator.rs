use crate::assembler;
use crate::classifier::EventClassifier;
use crate::cycle::CycleToken;
use crate::pipeline::RepositoryPipeline;
use crate::types::{
    ActivityApi, AggregationError, AggregationStrategy, Feed, FeedConfig, FeedEntry,
    RepositorySelector, Result,
};
use chrono::Utc;
use futures::future::{join_all, TryFutureExt};
use futures::stream::{FuturesUnordered, TryStreamExt};
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};

/// Fetches every selected repository concurrently and joins the results
/// into one feed.
///
/// Per repository both event streams are requested at the same time, and
/// all repositories are in flight at once. Entries always come back in the
/// order the repositories were given, whatever order the fetches finish in.
pub struct FeedOrchestrator {
    api: Arc<dyn ActivityApi>,
    classifier: EventClassifier,
    strategy: AggregationStrategy,
}

impl FeedOrchestrator {
    pub fn new(api: Arc<dyn ActivityApi>, config: FeedConfig) -> Self {
        Self {
            api,
            classifier: EventClassifier::new(config.web_base_url),
            strategy: config.strategy,
        }
    }

    pub fn strategy(&self) -> AggregationStrategy {
        self.strategy
    }

    /// Build a fresh feed for `repos`.
    ///
    /// Under [`AggregationStrategy::FailFast`] the first failure, in the
    /// order failures are detected, fails the whole call and nothing of the
    /// other repositories is returned. Fetches still in flight at that point
    /// are dropped.
    pub async fn fetch_feed(&self, repos: &[RepositorySelector]) -> Result<Feed> {
        info!("Fetching activity for {} repositories", repos.len());

        let entries = match self.strategy {
            AggregationStrategy::FailFast => self.fetch_all_or_nothing(repos).await?,
            AggregationStrategy::Partial => join_all(repos.iter().map(|repo| self.fetch_repository(repo)))
                .await
                .into_iter()
                .zip(repos)
                .map(|(result, repo)| match result {
                    Ok(entry) => entry,
                    Err(e) => assembler::failed(&repo.full_name(), e.to_string()),
                })
                .collect(),
        };

        let event_count: usize = entries.iter().map(|entry| entry.events.len()).sum();
        info!("Built feed with {} entries and {} events", entries.len(), event_count);

        Ok(Feed {
            entries,
            generated_at: Utc::now(),
            cycle: None,
        })
    }

    /// Like [`fetch_feed`](Self::fetch_feed), but abandoned as soon as `token`
    /// is superseded or cancelled.
    pub async fn fetch_feed_for_cycle(&self, token: &CycleToken, repos: &[RepositorySelector]) -> Result<Feed> {
        let span = info_span!("fetch_cycle", generation = token.generation(), cycle = %token.id());

        async {
            let mut feed = token.run(self.fetch_feed(repos)).await?;
            feed.cycle = Some(token.generation());
            Ok::<Feed, AggregationError>(feed)
        }
        .instrument(span)
        .await
    }

    /// Completion order decides which failure is reported; entries are put
    /// back into input order by index.
    async fn fetch_all_or_nothing(&self, repos: &[RepositorySelector]) -> Result<Vec<FeedEntry>> {
        let mut pending: FuturesUnordered<_> = repos
            .iter()
            .enumerate()
            .map(|(index, repo)| self.fetch_repository(repo).map_ok(move |entry| (index, entry)))
            .collect();

        let mut slots: Vec<Option<FeedEntry>> = vec![None; repos.len()];
        while let Some((index, entry)) = pending.try_next().await? {
            slots[index] = Some(entry);
        }

        Ok(slots.into_iter().flatten().collect())
    }

    async fn fetch_repository(&self, repo: &RepositorySelector) -> Result<FeedEntry> {
        let full_name = repo.full_name();

        let (repo_events, issue_events) = tokio::try_join!(
            self.api.list_repo_events(&repo.owner, &repo.name),
            self.api.list_events_for_repo(&repo.owner, &repo.name),
        )
        .map_err(|source| {
            error!("Failed to fetch events for {}: {}", full_name, source);
            AggregationError::Fetch {
                repository: full_name.clone(),
                source,
            }
        })?;

        info!(
            "Fetched {} repo events and {} issue events for {}",
            repo_events.len(),
            issue_events.len(),
            full_name
        );

        Ok(RepositoryPipeline::new(&self.classifier).run(&full_name, repo_events, issue_events))
    }
}
