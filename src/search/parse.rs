//! Decoding of the `/search?format=json` response body.
//!
//! The backend's result objects are loosely shaped: the title may live in
//! `title` or `text`, the snippet in `content`, and failures are reported as
//! `{"error": "..."}` entries inside the same array. Every element is decoded
//! into [`RawResult`] first and then normalized explicitly.

use super::types::{ResultRecord, PLACEHOLDER_TITLE};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One element of the `results` array as the backend sends it.
///
/// Text fields of the wrong JSON type decode as absent rather than failing
/// the element; only a missing `href` rejects it.
#[derive(Debug, Default, Deserialize)]
pub struct RawResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub href: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "error_message")]
    pub error: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Any non-null `error` marks the element as a backend failure
fn error_message<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Why an element did not become a [`ResultRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    /// The backend reported an error in place of a result
    BackendError(String),
    /// No usable `href`
    MissingHref,
    /// Not a JSON object
    Malformed(String),
}

impl RawResult {
    /// Normalize into a record, applying the title fallback chain
    pub fn into_record(self) -> Result<ResultRecord, Rejected> {
        if let Some(error) = self.error {
            return Err(Rejected::BackendError(error));
        }

        let href = non_empty(self.href).ok_or(Rejected::MissingHref)?;
        let title = non_empty(self.title)
            .or_else(|| non_empty(self.text))
            .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());
        let snippet = self.content.unwrap_or_default();

        Ok(ResultRecord::new(title, href, snippet))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Map a whole response body to records, preserving backend order.
///
/// A missing or non-array `results` field yields an empty list.
pub fn parse_results(body: &Value) -> Vec<ResultRecord> {
    let Some(items) = body.get("results").and_then(Value::as_array) else {
        tracing::debug!("search response has no results array");
        return Vec::new();
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match parse_item(item) {
            Ok(record) => records.push(record),
            Err(reason) => {
                tracing::debug!(index, reason = ?reason, "skipping search result");
            }
        }
    }
    records
}

fn parse_item(item: &Value) -> Result<ResultRecord, Rejected> {
    if !item.is_object() {
        return Err(Rejected::Malformed("result is not an object".to_string()));
    }
    let raw: RawResult = serde_json::from_value(item.clone())
        .map_err(|e| Rejected::Malformed(e.to_string()))?;
    raw.into_record()
}
