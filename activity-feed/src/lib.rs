pub mod types;
pub mod adapter;
pub mod filter;
pub mod merger;
pub mod classifier;
pub mod assembler;
pub mod pipeline;
pub mod cycle;
pub mod aggregator;
pub mod state;
pub mod fetcher;
pub mod render;

pub use types::*;
pub use classifier::{classify, EventClassifier};
pub use cycle::{CycleStatus, CycleToken, FetchCycles};
pub use aggregator::FeedOrchestrator;
pub use pipeline::RepositoryPipeline;
pub use state::{RepositorySelection, Session};
pub use fetcher::RestClient;
