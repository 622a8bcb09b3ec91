use crate::answer::decoder::Utf8Decoder;
use crate::answer::{AnswerChunk, AnswerError, AnswerRequest};
use crate::config::Backend;
use bytes::Bytes;
use futures::stream::StreamExt;
use reqwest::Client;
use std::pin::Pin;
use std::time::Duration;
use tokio_stream::Stream;

pub type AnswerStream = Pin<Box<dyn Stream<Item = AnswerChunk> + Send>>;

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// Client for the streaming `/answer` endpoint
#[derive(Clone)]
pub struct AnswerClient {
    client: Client,
    answer_url: String,
    stall_timeout: Duration,
}

impl AnswerClient {
    pub fn new(backend: &Backend) -> Result<Self, AnswerError> {
        // No total timeout: answers stream for as long as the model writes.
        // Stalls are caught while waiting for headers and per read instead.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(backend.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            answer_url: backend.answer_url(),
            stall_timeout: Duration::from_secs(backend.stall_timeout_secs),
        })
    }

    pub fn with_stall_timeout(mut self, stall_timeout: Duration) -> Self {
        self.stall_timeout = stall_timeout;
        self
    }

    /// POST the request and return once response headers are in.
    ///
    /// The returned stream yields decoded text in arrival order and ends with
    /// exactly one [`AnswerChunk::Done`] or [`AnswerChunk::Error`].
    pub async fn stream_answer(&self, request: &AnswerRequest) -> Result<AnswerStream, AnswerError> {
        tracing::debug!(
            url = %self.answer_url,
            context_count = request.context.len(),
            "answer request"
        );

        let send = self
            .client
            .post(&self.answer_url)
            .header("content-type", "application/json")
            .json(request)
            .send();

        // Same bound as a body read: a backend that never answers is a stall.
        let response = match tokio::time::timeout(self.stall_timeout, send).await {
            Ok(response) => response?,
            Err(_) => {
                tracing::warn!(
                    stall_secs = self.stall_timeout.as_secs(),
                    "answer endpoint sent no response headers"
                );
                return Err(AnswerError::Stalled(self.stall_timeout));
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "answer endpoint returned error");
            return Err(AnswerError::Status(status));
        }

        let state = ReadState {
            body: Box::pin(response.bytes_stream()),
            decoder: Utf8Decoder::new(),
            stall_timeout: self.stall_timeout,
            phase: Phase::Reading,
            bytes_read: 0,
        };

        Ok(Box::pin(futures::stream::unfold(state, read_next)))
    }
}

enum Phase {
    Reading,
    /// Body ended after a flushed tail; `Done` still owed
    Closing,
    Finished,
}

struct ReadState {
    body: ByteStream,
    decoder: Utf8Decoder,
    stall_timeout: Duration,
    phase: Phase,
    bytes_read: usize,
}

async fn read_next(mut state: ReadState) -> Option<(AnswerChunk, ReadState)> {
    match state.phase {
        Phase::Finished => return None,
        Phase::Closing => {
            state.phase = Phase::Finished;
            return Some((AnswerChunk::Done, state));
        }
        Phase::Reading => {}
    }

    loop {
        match tokio::time::timeout(state.stall_timeout, state.body.next()).await {
            Err(_) => {
                tracing::warn!(
                    stall_secs = state.stall_timeout.as_secs(),
                    bytes_read = state.bytes_read,
                    "answer stream stalled"
                );
                state.phase = Phase::Finished;
                let err = AnswerError::Stalled(state.stall_timeout);
                return Some((AnswerChunk::Error(err.to_string()), state));
            }
            Ok(Some(Ok(bytes))) => {
                state.bytes_read += bytes.len();
                let text = state.decoder.decode(&bytes);
                if text.is_empty() {
                    continue;
                }
                return Some((AnswerChunk::Text(text), state));
            }
            Ok(Some(Err(e))) => {
                tracing::warn!(error = %e, bytes_read = state.bytes_read, "answer stream error");
                state.phase = Phase::Finished;
                let err = AnswerError::Stream(e.to_string());
                return Some((AnswerChunk::Error(err.to_string()), state));
            }
            Ok(None) => {
                tracing::debug!(bytes_read = state.bytes_read, "answer stream finished");
                let tail = state.decoder.finish();
                if tail.is_empty() {
                    state.phase = Phase::Finished;
                    return Some((AnswerChunk::Done, state));
                }
                state.phase = Phase::Closing;
                return Some((AnswerChunk::Text(tail), state));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_over(chunks: Vec<&'static [u8]>, stall: Duration) -> ReadState {
        let items: Vec<reqwest::Result<Bytes>> =
            chunks.into_iter().map(|c| Ok(Bytes::from_static(c))).collect();
        ReadState {
            body: Box::pin(futures::stream::iter(items)),
            decoder: Utf8Decoder::new(),
            stall_timeout: stall,
            phase: Phase::Reading,
            bytes_read: 0,
        }
    }

    async fn collect(state: ReadState) -> Vec<AnswerChunk> {
        futures::stream::unfold(state, read_next).collect().await
    }

    #[tokio::test]
    async fn test_chunks_then_done() {
        let chunks = collect(state_over(vec![&b"Hel"[..], &b"lo, "[..], &b"world"[..]], Duration::from_secs(5))).await;
        assert_eq!(
            chunks,
            vec![
                AnswerChunk::Text("Hel".into()),
                AnswerChunk::Text("lo, ".into()),
                AnswerChunk::Text("world".into()),
                AnswerChunk::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_split_codepoint_not_emitted_alone() {
        // "né" split inside the two-byte é
        let chunks = collect(state_over(vec![&b"n\xC3"[..], &b"\xA9"[..]], Duration::from_secs(5))).await;
        assert_eq!(
            chunks,
            vec![
                AnswerChunk::Text("n".into()),
                AnswerChunk::Text("é".into()),
                AnswerChunk::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_truncated_tail_flushed_before_done() {
        let chunks = collect(state_over(vec![&b"ok\xE2\x82"[..]], Duration::from_secs(5))).await;
        assert_eq!(
            chunks,
            vec![
                AnswerChunk::Text("ok".into()),
                AnswerChunk::Text("\u{FFFD}".into()),
                AnswerChunk::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_stalled_read_ends_with_error() {
        let first = futures::stream::iter(vec![Ok::<Bytes, reqwest::Error>(Bytes::from_static(b"partial"))]);
        let body = first.chain(futures::stream::pending());
        let state = ReadState {
            body: Box::pin(body),
            decoder: Utf8Decoder::new(),
            stall_timeout: Duration::from_millis(50),
            phase: Phase::Reading,
            bytes_read: 0,
        };

        let chunks = collect(state).await;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], AnswerChunk::Text("partial".into()));
        assert!(matches!(&chunks[1], AnswerChunk::Error(msg) if msg.contains("stalled")));
    }
}
