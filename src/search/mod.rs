pub mod orchestrator;
pub mod parse;
pub mod providers;
pub mod types;

pub use orchestrator::SearchOrchestrator;
pub use types::{derive_context, ContextItem, Query, ResultRecord, SearchOutcome, PLACEHOLDER_TITLE};

/// Search backend abstraction - the orchestrator only sees this seam
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one query and return results in backend order
    async fn search(&self, query: &Query) -> Result<Vec<ResultRecord>, SearchError>;
}

/// Search-related errors
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search backend returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid search response: {0}")]
    Parse(String),
}
