//! HTTP contract tests for the search endpoint and the orchestrator.

mod common;

use perceive::search::providers::WhoogleProvider;
use perceive::search::{Query, SearchError, SearchOrchestrator, SearchProvider, PLACEHOLDER_TITLE};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn orchestrator_for(server: &MockServer) -> SearchOrchestrator {
    let provider = WhoogleProvider::new(&common::backend_for(server)).unwrap();
    SearchOrchestrator::new(Arc::new(provider), 2)
}

#[tokio::test]
async fn test_request_encodes_query_and_asks_for_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust & tokio?"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::results_body(1)))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    let outcome = orchestrator.search("  rust & tokio?  ").await.unwrap();
    assert_eq!(outcome.results.len(), 1);
}

#[tokio::test]
async fn test_n_results_in_order_with_min_n_2_context() {
    for n in [0usize, 1, 2, 7] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(common::results_body(n)))
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server);
        let outcome = orchestrator.search("anything").await.unwrap();

        assert_eq!(outcome.results.len(), n);
        for (i, record) in outcome.results.iter().enumerate() {
            assert_eq!(record.title(), format!("Result {i}"));
            assert_eq!(record.link(), format!("https://www.site{i}.example/page"));
            assert_eq!(record.display_url(), format!("site{i}.example"));
        }
        assert_eq!(outcome.context.len(), n.min(2));
        for (item, record) in outcome.context.iter().zip(&outcome.results) {
            assert_eq!(item.title, record.title());
            assert_eq!(item.snippet, record.snippet());
        }
    }
}

#[tokio::test]
async fn test_blank_query_issues_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::results_body(3)))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    assert!(orchestrator.search("").await.is_none());
    assert!(orchestrator.search(" \t ").await.is_none());
}

#[tokio::test]
async fn test_missing_or_non_array_results_is_empty() {
    for body in [json!({}), json!({ "results": null }), json!({ "results": { "a": 1 } })] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server);
        let outcome = orchestrator.search("q").await.unwrap();
        assert!(outcome.results.is_empty());
        assert!(outcome.context.is_empty());
    }
}

#[tokio::test]
async fn test_title_fallbacks_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "text": "From text", "href": "https://a.example" },
                { "href": "https://b.example", "content": "only content" },
            ]
        })))
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    let outcome = orchestrator.search("q").await.unwrap();
    assert_eq!(outcome.results[0].title(), "From text");
    assert_eq!(outcome.results[0].snippet(), "");
    assert_eq!(outcome.results[1].title(), PLACEHOLDER_TITLE);
    assert_eq!(outcome.results[1].snippet(), "only content");
}

#[tokio::test]
async fn test_server_error_and_bad_json_resolve_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "boom"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    for q in ["boom", "garbage"] {
        let outcome = orchestrator.search(q).await.unwrap();
        assert!(outcome.is_empty());
        assert!(!orchestrator.is_loading());
    }
}

#[tokio::test]
async fn test_provider_reports_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = WhoogleProvider::new(&common::backend_for(&server)).unwrap();
    let err = provider.search(&Query::parse("q").unwrap()).await.unwrap_err();
    assert!(matches!(err, SearchError::Status(s) if s.as_u16() == 503));
}

#[tokio::test]
async fn test_unreachable_backend_resolves_to_empty() {
    let backend = perceive::config::Backend {
        base_url: "http://127.0.0.1:9".to_string(),
        request_timeout_secs: 2,
        ..Default::default()
    };
    let provider = WhoogleProvider::new(&backend).unwrap();
    let orchestrator = SearchOrchestrator::new(Arc::new(provider), 2);

    let outcome = orchestrator.search("offline").await.unwrap();
    assert!(outcome.is_empty());
    assert!(!orchestrator.is_loading());
}
