//! Summary streamer: the state behind the AI panel above the results.
//!
//! [`SummaryStreamer`] is plain state: it decides whether a request may be
//! dispatched and folds [`SummaryEvent`]s into a [`SummaryState`]. The network
//! side runs in [`drive`], which the owner spawns and cancels.

use crate::answer::{AnswerChunk, AnswerClient, AnswerRequest};
use crate::search::{ContextItem, Query};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Lifecycle of one summary
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SummaryState {
    #[default]
    Idle,
    /// Request sent, no response headers yet
    Loading,
    /// Headers received; text so far
    Streaming(String),
    Complete(String),
    /// Rendered as nothing at all
    Failed,
}

impl SummaryState {
    /// Answer text accumulated so far, if any is showable
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Streaming(text) | Self::Complete(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete(_) | Self::Failed)
    }

    /// Whether the panel should take up space at all
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Idle | Self::Failed)
    }
}

/// The (query, context) pair a summary was dispatched for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    query: Query,
    context: Vec<ContextItem>,
}

impl RequestIdentity {
    pub fn of(query: &Query, context: &[ContextItem]) -> Self {
        Self {
            query: query.clone(),
            context: context.to_vec(),
        }
    }

    fn matches(&self, query: &Query, context: &[ContextItem]) -> bool {
        self.query == *query && self.context == context
    }
}

/// What [`drive`] reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryEvent {
    /// Response headers arrived with a success status
    Opened,
    Chunk(String),
    Finished,
    Failed(String),
}

/// Permission to run one request, stamped with its generation
#[derive(Debug, Clone)]
pub struct SummaryTicket {
    pub generation: u64,
    pub request: AnswerRequest,
    pub cancel: CancellationToken,
}

#[derive(Default)]
pub struct SummaryStreamer {
    state: SummaryState,
    generation: u64,
    last_dispatched: Option<RequestIdentity>,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl SummaryStreamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SummaryState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ask to summarize `query` with `context`.
    ///
    /// Returns `None` when there is nothing to summarize or when this exact
    /// pair was already dispatched since the last reset. Otherwise any older
    /// request is cancelled, the state moves to `Loading`, and the caller must
    /// run the ticket (see [`drive`]).
    pub fn trigger(&mut self, query: &Query, context: &[ContextItem]) -> Option<SummaryTicket> {
        if context.is_empty() {
            return None;
        }

        if self
            .last_dispatched
            .as_ref()
            .is_some_and(|last| last.matches(query, context))
        {
            return None;
        }

        self.cancel_in_flight();
        self.generation += 1;
        self.last_dispatched = Some(RequestIdentity::of(query, context));
        self.state = SummaryState::Loading;

        let cancel = CancellationToken::new();
        self.cancel = Some(cancel.clone());

        tracing::debug!(query = %query, generation = self.generation, "summary dispatched");

        Some(SummaryTicket {
            generation: self.generation,
            request: AnswerRequest::new(query, context.to_vec()),
            cancel,
        })
    }

    /// Keep the task handle so a reset can abort it
    pub fn attach(&mut self, generation: u64, task: JoinHandle<()>) {
        if generation == self.generation {
            self.task = Some(task);
        } else {
            task.abort();
        }
    }

    /// Fold an event into the state. Returns `false` for stale or ignored events.
    pub fn apply(&mut self, generation: u64, event: SummaryEvent) -> bool {
        if generation != self.generation {
            tracing::trace!(generation, current = self.generation, "dropping stale summary event");
            return false;
        }

        let next = match (std::mem::take(&mut self.state), event) {
            (SummaryState::Loading, SummaryEvent::Opened) => SummaryState::Streaming(String::new()),
            (SummaryState::Loading, SummaryEvent::Chunk(text)) => SummaryState::Streaming(text),
            (SummaryState::Streaming(mut acc), SummaryEvent::Chunk(text)) => {
                acc.push_str(&text);
                SummaryState::Streaming(acc)
            }
            (SummaryState::Loading, SummaryEvent::Finished) => SummaryState::Complete(String::new()),
            (SummaryState::Streaming(acc), SummaryEvent::Finished) => SummaryState::Complete(acc),
            (SummaryState::Loading | SummaryState::Streaming(_), SummaryEvent::Failed(reason)) => {
                tracing::warn!(generation, reason = %reason, "summary failed");
                SummaryState::Failed
            }
            (state, event) => {
                tracing::trace!(state = ?state, event = ?event, "ignoring summary event");
                self.state = state;
                return false;
            }
        };

        if next.is_terminal() {
            self.cancel = None;
            self.task = None;
        }
        self.state = next;
        true
    }

    /// Forget everything: cancel the in-flight stream, clear the guard, go idle
    pub fn reset(&mut self) {
        self.cancel_in_flight();
        self.generation += 1;
        self.last_dispatched = None;
        self.state = SummaryState::Idle;
    }

    fn cancel_in_flight(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SummaryStreamer {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}

/// Run one summary request, reporting through `emit`.
///
/// Stops early when the ticket is cancelled or when `emit` returns `false`
/// (receiver gone). Chunks are emitted strictly in read order.
pub async fn drive<F>(client: AnswerClient, ticket: SummaryTicket, mut emit: F)
where
    F: FnMut(SummaryEvent) -> bool,
{
    let SummaryTicket {
        generation,
        request,
        cancel,
    } = ticket;

    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!(generation, "summary cancelled before response");
            return;
        }
        opened = client.stream_answer(&request) => opened,
    };

    let mut stream = match opened {
        Ok(stream) => stream,
        Err(e) => {
            emit(SummaryEvent::Failed(e.to_string()));
            return;
        }
    };

    if !emit(SummaryEvent::Opened) {
        return;
    }

    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(generation, "summary cancelled mid-stream");
                return;
            }
            chunk = stream.next() => chunk,
        };

        match chunk {
            Some(AnswerChunk::Text(text)) => {
                if !emit(SummaryEvent::Chunk(text)) {
                    return;
                }
            }
            Some(AnswerChunk::Done) | None => {
                emit(SummaryEvent::Finished);
                return;
            }
            Some(AnswerChunk::Error(e)) => {
                emit(SummaryEvent::Failed(e));
                return;
            }
        }
    }
}
