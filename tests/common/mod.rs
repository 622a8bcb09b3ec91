//! Common test utilities: a mock backend and a session wired to it

#![allow(dead_code)]

use perceive::answer::AnswerClient;
use perceive::config::Backend;
use perceive::search::providers::WhoogleProvider;
use perceive::search::SearchOrchestrator;
use perceive::session::{SearchSession, SessionEvent};
use perceive::summary::SummaryState;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

/// Backend config pointing at a mock server
pub fn backend_for(server: &MockServer) -> Backend {
    Backend {
        base_url: server.uri(),
        request_timeout_secs: 5,
        stall_timeout_secs: 5,
        ..Backend::default()
    }
}

/// Session wired to a mock server, context size 2
pub fn session_for(server: &MockServer) -> SearchSession {
    session_with(&backend_for(server))
}

/// Session over an explicit backend config, context size 2
pub fn session_with(backend: &Backend) -> SearchSession {
    let provider = WhoogleProvider::new(backend).expect("search client");
    let orchestrator = Arc::new(SearchOrchestrator::new(Arc::new(provider), 2));
    let answer = AnswerClient::new(backend).expect("answer client");
    SearchSession::new(orchestrator, answer)
}

/// `{ "results": [...] }` with `n` well-formed entries
pub fn results_body(n: usize) -> Value {
    let results: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "title": format!("Result {i}"),
                "href": format!("https://www.site{i}.example/page"),
                "content": format!("Snippet {i}"),
            })
        })
        .collect();
    json!({ "results": results })
}

/// Apply events until the search settles
pub async fn settle_search(session: &mut SearchSession) {
    let deadline = Duration::from_secs(10);
    tokio::time::timeout(deadline, async {
        loop {
            let event = session.next_event().await.expect("event channel open");
            let settled = matches!(event, SessionEvent::SearchSettled { .. });
            session.handle_event(event);
            if settled {
                return;
            }
        }
    })
    .await
    .expect("search did not settle in time");
}

/// Apply events until the summary reaches Complete or Failed
pub async fn settle_summary(session: &mut SearchSession) -> Vec<SummaryState> {
    let deadline = Duration::from_secs(10);
    tokio::time::timeout(deadline, async {
        let mut seen = Vec::new();
        while !session.summary_state().is_terminal() {
            let event = session.next_event().await.expect("event channel open");
            session.handle_event(event);
            seen.push(session.summary_state().clone());
        }
        seen
    })
    .await
    .expect("summary did not settle in time")
}
