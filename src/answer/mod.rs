//! Streaming client for the AI answer endpoint.

pub mod client;
pub mod decoder;

pub use client::{AnswerClient, AnswerStream};
pub use decoder::Utf8Decoder;

use crate::search::{ContextItem, Query};
use serde::Serialize;
use std::time::Duration;

/// Body of `POST /answer`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRequest {
    pub query: String,
    pub context: Vec<ContextItem>,
}

impl AnswerRequest {
    pub fn new(query: &Query, context: Vec<ContextItem>) -> Self {
        Self {
            query: query.as_str().to_string(),
            context,
        }
    }
}

/// A piece of the streamed answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerChunk {
    /// Decoded text, in arrival order
    Text(String),
    /// Body closed normally
    Done,
    /// Read failed or stalled; nothing follows
    Error(String),
}

/// Answer-related errors
#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("answer endpoint returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("answer stream failed: {0}")]
    Stream(String),

    #[error("answer stream stalled for {0:?}")]
    Stalled(Duration),
}
