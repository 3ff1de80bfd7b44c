use crate::types::{AggregationError, Result};
use chrono::{DateTime, Utc};
use std::future::Future;
use tokio::sync::watch;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CycleState {
    latest: u64,
    cancelled_through: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    Current,
    Superseded,
    Cancelled,
}

/// Issues fetch cycle generations.
///
/// Starting a cycle supersedes every earlier one. Work running under a stale
/// token is abandoned at its next suspension point and its result dropped.
#[derive(Debug)]
pub struct FetchCycles {
    state: watch::Sender<CycleState>,
}

impl FetchCycles {
    pub fn new() -> Self {
        let (state, _) = watch::channel(CycleState::default());
        Self { state }
    }

    pub fn begin(&self) -> CycleToken {
        let mut generation = 0;
        self.state.send_modify(|state| {
            state.latest += 1;
            generation = state.latest;
        });

        CycleToken {
            generation,
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            state: self.state.subscribe(),
        }
    }

    /// Generation of the most recently started cycle, 0 if none was started.
    pub fn latest(&self) -> u64 {
        self.state.borrow().latest
    }

    /// Cancel every cycle started so far.
    pub fn cancel_all(&self) {
        self.state.send_modify(|state| state.cancelled_through = state.latest);
    }
}

impl Default for FetchCycles {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct CycleToken {
    generation: u64,
    id: Uuid,
    started_at: DateTime<Utc>,
    state: watch::Receiver<CycleState>,
}

impl CycleToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn status(&self) -> CycleStatus {
        status_of(self.generation, *self.state.borrow())
    }

    pub fn is_current(&self) -> bool {
        self.status() == CycleStatus::Current
    }

    pub fn check(&self) -> Result<()> {
        into_result(self.generation, self.status())
    }

    /// Drive `work` to completion unless this cycle goes stale first.
    pub async fn run<T, F>(&self, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;

        tokio::select! {
            result = work => {
                let value = result?;
                // finished, but a newer cycle may have started meanwhile
                self.check()?;
                Ok(value)
            }
            err = wait_until_stale(self.generation, self.state.clone()) => {
                warn!("Abandoning fetch cycle {}: {}", self.generation, err);
                Err(err)
            }
        }
    }
}

fn status_of(generation: u64, state: CycleState) -> CycleStatus {
    if state.cancelled_through >= generation {
        CycleStatus::Cancelled
    } else if state.latest > generation {
        CycleStatus::Superseded
    } else {
        CycleStatus::Current
    }
}

fn into_result(generation: u64, status: CycleStatus) -> Result<()> {
    match status {
        CycleStatus::Current => Ok(()),
        CycleStatus::Superseded => Err(AggregationError::Superseded { generation }),
        CycleStatus::Cancelled => Err(AggregationError::Cancelled { generation }),
    }
}

async fn wait_until_stale(generation: u64, mut state: watch::Receiver<CycleState>) -> AggregationError {
    loop {
        let status = status_of(generation, *state.borrow_and_update());
        if let Err(err) = into_result(generation, status) {
            return err;
        }
        if state.changed().await.is_err() {
            // the tracker is gone, nothing can supersede this cycle anymore
            std::future::pending::<()>().await;
        }
    }
}
