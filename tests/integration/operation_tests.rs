//! End-to-end operations: build, submit, poll and normalize

use scrapedeck::client::ApiClient;
use scrapedeck::config::GatewayConfig;
use scrapedeck::normalize::View;
use scrapedeck::orchestrator::Orchestrator;
use scrapedeck::{AppError, Mode, ProxyErrorKind, RawInput};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TICK: Duration = Duration::from_millis(20);

fn orchestrator(base: &str) -> Orchestrator {
    Orchestrator::new(ApiClient::new(base, None).unwrap(), TICK)
}

fn input(url: &str, formats: &[&str]) -> RawInput {
    RawInput {
        url: url.to_string(),
        formats: formats.iter().map(|f| f.to_string()).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_scrape_operation() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({
            "url": "https://example.com",
            "formats": ["markdown", "links"],
            "waitFor": 2000,
            "timeout": 30000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "markdown": "Hello",
                "links": ["https://example.com/about"],
                "screenshot": "https://cdn.example.com/shot.png"
            }
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let mut orchestrator = orchestrator(&backend.uri());
    let result = orchestrator
        .run_input(Mode::Scrape, &input("example.com", &["markdown", "links"]), |_| {})
        .await
        .unwrap();

    assert_eq!(
        result.document,
        "## Links\n\n- [https://example.com/about](https://example.com/about)\n\n\nHello"
    );
    assert_eq!(
        result.screenshot_url.as_deref(),
        Some("https://cdn.example.com/shot.png")
    );
    assert_eq!(result.initial_view(), View::Document);
}

#[tokio::test]
async fn test_extract_operation_prefers_structured_view() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({
            "formats": ["json"],
            "jsonOptions": {"prompt": "Find the price"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"json": {"price": "$10"}}
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let mut orchestrator = orchestrator(&backend.uri());
    let mut raw = input("https://shop.example.com", &[]);
    raw.prompt = Some("Find the price".to_string());

    let result = orchestrator
        .run_input(Mode::Extract, &raw, |_| {})
        .await
        .unwrap();

    assert_eq!(result.initial_view(), View::Structured);
    assert_eq!(result.structured_payload["json"]["price"], "$10");
}

#[tokio::test]
async fn test_crawl_operation_reports_progress() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .and(body_partial_json(json!({
            "url": "https://docs.example.com",
            "limit": 10,
            "maxDepth": 2,
            "scrapeOptions": {"formats": ["markdown"], "onlyMainContent": true}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "id": "job-9"})))
        .expect(1)
        .mount(&backend)
        .await;

    for (completed, total) in [(1, 3), (2, 3)] {
        Mock::given(method("GET"))
            .and(path("/v1/crawl/job-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "scraping",
                "completed": completed,
                "total": total
            })))
            .up_to_n_times(1)
            .mount(&backend)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "completed": 3,
            "total": 3,
            "data": [
                {"markdown": "Intro", "metadata": {"title": "Docs", "sourceURL": "https://docs.example.com"}},
                {"metadata": {"title": "Empty", "sourceURL": "https://docs.example.com/empty"}},
                {"markdown": "Guide", "metadata": {"sourceURL": "https://docs.example.com/guide"}}
            ]
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let mut orchestrator = orchestrator(&backend.uri());
    let mut progress = Vec::new();

    let result = orchestrator
        .run_input(
            Mode::Crawl,
            &input("https://docs.example.com", &["markdown"]),
            |p| progress.push(p.to_string()),
        )
        .await
        .unwrap();

    assert_eq!(progress, vec!["scraping 1/3 (33%)", "scraping 2/3 (67%)"]);
    assert!(result.document.starts_with("## Page 1: Docs\n\nURL: https://docs.example.com\n\nIntro"));
    assert!(result.document.contains("## Page 3: Untitled"));
    assert!(!result.document.contains("## Page 2"));
    assert_eq!(result.structured_payload.as_array().unwrap().len(), 3);
    assert!(!orchestrator.is_polling());
}

#[tokio::test]
async fn test_screenshot_failure_is_rewritten() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": "All scraping engines failed!"})),
        )
        .mount(&backend)
        .await;

    let mut orchestrator = orchestrator(&backend.uri());

    let err = orchestrator
        .run_input(Mode::Scrape, &input("example.com", &["markdown", "screenshot"]), |_| {})
        .await
        .unwrap_err();
    match err {
        AppError::Proxy(e) => {
            assert_eq!(e.kind, ProxyErrorKind::Upstream5xx);
            assert_eq!(e.upstream_status, Some(500));
            assert!(e.message.starts_with("Screenshot functionality is not supported"));
        }
        other => panic!("unexpected {:?}", other),
    }

    // Without a screenshot format the backend message stands
    let err = orchestrator
        .run_input(Mode::Scrape, &input("example.com", &["markdown"]), |_| {})
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "All scraping engines failed!");
}

#[tokio::test]
async fn test_crawl_status_failure_surfaces() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "job-x"})))
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-x"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Job expired"})))
        .expect(1)
        .mount(&backend)
        .await;

    let mut orchestrator = orchestrator(&backend.uri());
    let err = orchestrator
        .run_input(Mode::Crawl, &input("example.com", &["markdown"]), |_| {})
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Error checking crawl status: Job expired");
}

#[tokio::test]
async fn test_missing_job_id_is_malformed() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&backend)
        .await;

    let mut orchestrator = orchestrator(&backend.uri());
    let err = orchestrator
        .run_input(Mode::Crawl, &input("example.com", &[]), |_| {})
        .await
        .unwrap_err();

    match err {
        AppError::Proxy(e) => assert_eq!(e.kind, ProxyErrorKind::MalformedResponse),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_url_issues_no_request() {
    let backend = MockServer::start().await;
    let mut orchestrator = orchestrator(&backend.uri());

    for url in ["not a url", "http://"] {
        let err = orchestrator
            .run_input(Mode::Scrape, &input(url, &["markdown"]), |_| {})
            .await
            .unwrap_err();
        match err {
            AppError::Validation(e) => assert_eq!(e.code(), "invalid-url"),
            other => panic!("unexpected {:?}", other),
        }
    }

    assert!(backend.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_operation_through_running_gateway() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(header("authorization", "Bearer gateway-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"markdown": "via gateway"}
        })))
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&backend)
        .await;

    let config = GatewayConfig {
        backend_url: backend.uri(),
        api_key: Some("gateway-key".to_string()),
        ..Default::default()
    };
    let app = scrapedeck::gateway::router(&config).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });

    let mut orchestrator = orchestrator(&format!("http://{}/api", addr));

    let info = orchestrator.client().gateway_config().await.unwrap();
    assert_eq!(info.api_endpoint, backend.uri());
    assert!(info.api_key);

    let result = orchestrator
        .run_input(Mode::Scrape, &input("example.com", &["markdown"]), |_| {})
        .await
        .unwrap();
    assert_eq!(result.document, "via gateway");
}
