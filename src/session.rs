use crate::answer::AnswerClient;
use crate::search::{ContextItem, Query, ResultRecord, SearchOrchestrator, SearchOutcome};
use crate::summary::{self, SummaryEvent, SummaryState, SummaryStreamer};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Top-level view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Home,
    Searching,
    Results,
}

/// Reports from spawned network tasks, tagged with the generation that started them
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SearchSettled { generation: u64, outcome: SearchOutcome },
    Summary { generation: u64, event: SummaryEvent },
}

/// Search session: owns the view state and wires search to summary.
///
/// This is UI-agnostic: the TUI feeds it user actions and drains
/// [`SessionEvent`]s, then renders from the accessors.
pub struct SearchSession {
    orchestrator: Arc<SearchOrchestrator>,
    answer_client: AnswerClient,
    view: ViewState,
    query: Option<Query>,
    results: Vec<ResultRecord>,
    context: Vec<ContextItem>,
    search_generation: u64,
    search_task: Option<JoinHandle<()>>,
    summary: SummaryStreamer,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SearchSession {
    pub fn new(orchestrator: Arc<SearchOrchestrator>, answer_client: AnswerClient) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            orchestrator,
            answer_client,
            view: ViewState::Home,
            query: None,
            results: Vec::new(),
            context: Vec::new(),
            search_generation: 0,
            search_task: None,
            summary: SummaryStreamer::new(),
            events_tx,
            events_rx,
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// The query the current results belong to
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    pub fn context(&self) -> &[ContextItem] {
        &self.context
    }

    pub fn summary_state(&self) -> &SummaryState {
        self.summary.state()
    }

    pub fn is_loading(&self) -> bool {
        self.view == ViewState::Searching || self.orchestrator.is_loading()
    }

    /// Search settled with nothing to show
    pub fn shows_no_results(&self) -> bool {
        self.view == ViewState::Results && self.results.is_empty()
    }

    /// Start a search. Blank input is ignored and returns `false`.
    ///
    /// Any earlier search or summary is abandoned: its task is aborted and its
    /// late events are dropped by generation.
    pub fn submit(&mut self, raw: &str) -> bool {
        let Some(query) = Query::parse(raw) else {
            return false;
        };

        self.abandon_in_flight();
        self.query = Some(query.clone());
        self.view = ViewState::Searching;

        let generation = self.search_generation;
        let orchestrator = self.orchestrator.clone();
        let tx = self.events_tx.clone();

        tracing::info!(query = %query, generation, "search submitted");

        self.search_task = Some(tokio::spawn(async move {
            let outcome = orchestrator.search_query(&query).await;
            let _ = tx.send(SessionEvent::SearchSettled { generation, outcome });
        }));

        true
    }

    /// Back to the empty home view; clears query, results, and summary
    pub fn go_home(&mut self) {
        tracing::debug!("returning home");
        self.abandon_in_flight();
        self.query = None;
        self.view = ViewState::Home;
    }

    /// Apply one event from a spawned task
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SearchSettled { generation, outcome } => {
                if generation != self.search_generation {
                    tracing::debug!(generation, current = self.search_generation, "dropping stale search result");
                    return;
                }
                self.search_task = None;
                self.results = outcome.results;
                self.context = outcome.context;
                self.view = ViewState::Results;
                self.sync_summary();
            }
            SessionEvent::Summary { generation, event } => {
                self.summary.apply(generation, event);
            }
        }
    }

    /// Make sure a summary is running for the current (query, context).
    ///
    /// Safe to call on every frame: the streamer's guard turns repeats into no-ops.
    pub fn sync_summary(&mut self) {
        if self.view != ViewState::Results {
            return;
        }
        let Some(query) = self.query.as_ref() else {
            return;
        };
        let Some(ticket) = self.summary.trigger(query, &self.context) else {
            return;
        };

        let generation = ticket.generation;
        let client = self.answer_client.clone();
        let tx = self.events_tx.clone();

        let task = tokio::spawn(async move {
            summary::drive(client, ticket, move |event| {
                tx.send(SessionEvent::Summary { generation, event }).is_ok()
            })
            .await;
        });
        self.summary.attach(generation, task);
    }

    /// Apply every event already queued; returns how many were applied
    pub fn poll_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next event without applying it
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    fn abandon_in_flight(&mut self) {
        if let Some(task) = self.search_task.take() {
            task.abort();
        }
        self.search_generation += 1;
        self.summary.reset();
        self.results.clear();
        self.context.clear();
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        if let Some(task) = self.search_task.take() {
            task.abort();
        }
    }
}
