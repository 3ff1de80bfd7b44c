use crate::aggregator::FeedOrchestrator;
use crate::cycle::{CycleToken, FetchCycles};
use crate::types::{
    ActivityApi, AggregationError, Feed, FeedConfig, RepositoryDescriptor, RepositorySelector, Result,
};
use std::sync::Arc;
use tracing::info;

/// Repositories the user can pick from and the ones currently picked.
///
/// Every change produces a new value; nothing is cleared in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySelection {
    available: Vec<RepositoryDescriptor>,
    selected: Vec<RepositorySelector>,
}

impl RepositorySelection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn available(&self) -> &[RepositoryDescriptor] {
        &self.available
    }

    pub fn selected(&self) -> &[RepositorySelector] {
        &self.selected
    }

    /// Replace the available list. Selected repositories that are no longer
    /// available are dropped.
    pub fn with_available(&self, available: Vec<RepositoryDescriptor>) -> Self {
        let selected = self
            .selected
            .iter()
            .filter(|selector| available.iter().any(|repo| matches(repo, selector)))
            .cloned()
            .collect();
        Self { available, selected }
    }

    /// Select repositories by full name, in the given order. Every name must
    /// be a well-formed `owner/name` and one of the available repositories.
    pub fn select<I, S>(&self, full_names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selected = full_names
            .into_iter()
            .map(|name| {
                let wanted: RepositorySelector = name.as_ref().parse()?;
                self.available
                    .iter()
                    .find(|repo| matches(repo, &wanted))
                    .map(RepositorySelector::from)
                    .ok_or_else(|| AggregationError::UnknownRepository(wanted.full_name()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            available: self.available.clone(),
            selected,
        })
    }

    pub fn select_all(&self) -> Self {
        Self {
            available: self.available.clone(),
            selected: self.available.iter().map(RepositorySelector::from).collect(),
        }
    }

    /// Use `selectors` as they are, without checking them against the available list.
    pub fn with_selected(&self, selectors: Vec<RepositorySelector>) -> Self {
        Self {
            available: self.available.clone(),
            selected: selectors,
        }
    }

    pub fn reset(&self) -> Self {
        Self::empty()
    }
}

fn matches(repo: &RepositoryDescriptor, selector: &RepositorySelector) -> bool {
    match selector.id {
        Some(id) => repo.id == id,
        None => repo.full_name.eq_ignore_ascii_case(&selector.full_name()),
    }
}

/// Caller-owned context for one user: API client, selection and fetch cycles.
pub struct Session {
    api: Arc<dyn ActivityApi>,
    orchestrator: FeedOrchestrator,
    selection: RepositorySelection,
    cycles: FetchCycles,
}

impl Session {
    pub fn new(api: Arc<dyn ActivityApi>, config: FeedConfig) -> Self {
        Self {
            orchestrator: FeedOrchestrator::new(api.clone(), config),
            api,
            selection: RepositorySelection::empty(),
            cycles: FetchCycles::new(),
        }
    }

    pub fn selection(&self) -> &RepositorySelection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: RepositorySelection) {
        self.selection = selection;
    }

    pub fn orchestrator(&self) -> &FeedOrchestrator {
        &self.orchestrator
    }

    /// Refresh the list of repositories the authenticated user can select.
    pub async fn load_repositories(&mut self) -> Result<&RepositorySelection> {
        let available = self
            .api
            .list_for_authenticated_user()
            .await
            .map_err(AggregationError::Listing)?;

        info!("{} repositories available", available.len());
        self.selection = self.selection.with_available(available);
        Ok(&self.selection)
    }

    pub fn begin_cycle(&self) -> CycleToken {
        self.cycles.begin()
    }

    /// Start a new fetch cycle for the selected repositories. Any cycle still
    /// in flight is superseded and will return [`AggregationError::Superseded`].
    pub async fn refresh_feed(&self) -> Result<Feed> {
        let token = self.begin_cycle();
        self.orchestrator
            .fetch_feed_for_cycle(&token, self.selection.selected())
            .await
    }

    /// Abandon every cycle in flight.
    pub fn cancel(&self) {
        self.cycles.cancel_all();
    }

    /// Drop the selection and abandon in-flight work, e.g. when the token is revoked.
    pub fn reset(&mut self) {
        self.cancel();
        self.selection = self.selection.reset();
    }
}
