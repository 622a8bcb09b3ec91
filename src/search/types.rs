use serde::{Deserialize, Serialize};
use std::fmt;

/// Title used when a result carries neither `title` nor `text`
pub const PLACEHOLDER_TITLE: &str = "No Title";

/// A validated search query: trimmed and non-empty
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query(String);

impl Query {
    /// Returns `None` for empty or whitespace-only input
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One normalized search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    title: String,
    link: String,
    snippet: String,
    display_url: String,
}

impl ResultRecord {
    pub fn new(title: impl Into<String>, link: impl Into<String>, snippet: impl Into<String>) -> Self {
        let link = link.into();
        let display_url = display_url_for(&link);
        Self {
            title: title.into(),
            link,
            snippet: snippet.into(),
            display_url,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    /// Host of the link without a leading `www.`
    pub fn display_url(&self) -> &str {
        &self.display_url
    }

    pub fn to_context(&self) -> ContextItem {
        ContextItem {
            title: self.title.clone(),
            snippet: self.snippet.clone(),
        }
    }
}

fn display_url_for(link: &str) -> String {
    match url::Url::parse(link) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.strip_prefix("www.").unwrap_or(host).to_string(),
            None => link.to_string(),
        },
        Err(_) => link.to_string(),
    }
}

/// Grounding input for the answer endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextItem {
    pub title: String,
    pub snippet: String,
}

/// Project the first `limit` results into context items
pub fn derive_context(results: &[ResultRecord], limit: usize) -> Vec<ContextItem> {
    results.iter().take(limit).map(ResultRecord::to_context).collect()
}

/// What one settled search hands to the view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub results: Vec<ResultRecord>,
    pub context: Vec<ContextItem>,
}

impl SearchOutcome {
    pub fn from_results(results: Vec<ResultRecord>, context_size: usize) -> Self {
        let context = derive_context(&results, context_size);
        Self { results, context }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
