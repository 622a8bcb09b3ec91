use crate::search::{Query, SearchOutcome, SearchProvider};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Runs a query against the provider and derives summary context.
///
/// Failures never escape: they are logged and resolve to an empty outcome.
pub struct SearchOrchestrator {
    provider: Arc<dyn SearchProvider>,
    context_size: usize,
    in_flight: Arc<AtomicUsize>,
}

impl SearchOrchestrator {
    pub fn new(provider: Arc<dyn SearchProvider>, context_size: usize) -> Self {
        Self {
            provider,
            context_size,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Whether a search call is currently in flight
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn context_size(&self) -> usize {
        self.context_size
    }

    /// Search for `raw`.
    ///
    /// Returns `None` without touching the network when `raw` is blank.
    pub async fn search(&self, raw: &str) -> Option<SearchOutcome> {
        let query = Query::parse(raw)?;
        Some(self.search_query(&query).await)
    }

    /// Search for an already validated query
    pub async fn search_query(&self, query: &Query) -> SearchOutcome {
        let _loading = LoadingGuard::enter(&self.in_flight);

        match self.provider.search(query).await {
            Ok(results) => {
                let outcome = SearchOutcome::from_results(results, self.context_size);
                tracing::debug!(
                    query = %query,
                    result_count = outcome.results.len(),
                    context_count = outcome.context.len(),
                    "search settled"
                );
                outcome
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "search failed");
                SearchOutcome::default()
            }
        }
    }
}

/// Counts one in-flight call until dropped, whichever way the call exits.
///
/// A counter rather than a flag: an aborted search may drop after its
/// replacement has already started.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
