use crate::config::Backend;
use crate::search::parse::parse_results;
use crate::search::{Query, ResultRecord, SearchError, SearchProvider};
use std::time::Duration;

/// JSON search endpoint of a Whoogle-style backend
///
/// Issues `GET {search_url}?q=<query>&format=json` and normalizes the
/// `results` array.
pub struct WhoogleProvider {
    client: reqwest::Client,
    search_url: String,
}

impl WhoogleProvider {
    pub fn new(backend: &Backend) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(backend.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            search_url: backend.search_url(),
        })
    }
}

#[async_trait::async_trait]
impl SearchProvider for WhoogleProvider {
    async fn search(&self, query: &Query) -> Result<Vec<ResultRecord>, SearchError> {
        tracing::debug!(query = %query, url = %self.search_url, "performing search");

        let response = self
            .client
            .get(&self.search_url)
            .header("Accept", "application/json")
            .query(&[("q", query.as_str()), ("format", "json")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "search backend error");
            return Err(SearchError::Status(status));
        }

        let bytes = response.bytes().await?;
        let body: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| SearchError::Parse(e.to_string()))?;

        let items = parse_results(&body);

        tracing::debug!(query = %query, result_count = items.len(), "search completed");

        Ok(items)
    }
}
