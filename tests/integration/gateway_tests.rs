//! Gateway tests: the router is driven in-process, the backend is a mock

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use scrapedeck::config::GatewayConfig;
use scrapedeck::gateway::router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(backend: &str, credential: Option<&str>) -> Router {
    let config = GatewayConfig {
        backend_url: backend.to_string(),
        api_key: credential.map(str::to_string),
        ..Default::default()
    };
    router(&config).unwrap()
}

async fn body_of(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_scrape_forwarded_with_prefix_stripped() {
    let backend = MockServer::start().await;

    // The inbound host must never reach the backend
    Mock::given(header("host", "client.example"))
        .respond_with(ResponseTemplate::new(418))
        .mount(&backend)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(header("authorization", "Bearer secret"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"url": "https://example.com", "formats": ["markdown"]})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-backend", "mock")
                .set_body_json(json!({"success": true, "data": {"markdown": "# Example"}})),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let app = gateway(&backend.uri(), Some("secret"));
    let request = Request::post("/api/v1/scrape")
        .header("host", "client.example")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"url":"https://example.com","formats":["markdown"]}"#,
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-backend").unwrap(), "mock");
    assert_eq!(
        body_of(response).await,
        json!({"success": true, "data": {"markdown": "# Example"}})
    );
}

#[tokio::test]
async fn test_body_without_content_type_gets_json_default() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "job-1"})))
        .expect(1)
        .mount(&backend)
        .await;

    let app = gateway(&backend.uri(), None);
    let request = Request::post("/api/v1/crawl")
        .body(Body::from(r#"{"url":"https://example.com"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_query_string_and_method_preserved() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/crawl/abc-123"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "scraping"})))
        .expect(1)
        .mount(&backend)
        .await;

    let app = gateway(&backend.uri(), None);
    let response = app
        .oneshot(
            Request::get("/api/v1/crawl/abc-123?page=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_of(response).await, json!({"status": "scraping"}));
}

#[tokio::test]
async fn test_upstream_status_and_body_copied_verbatim() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(
            ResponseTemplate::new(402).set_body_json(json!({"error": "Payment required"})),
        )
        .mount(&backend)
        .await;

    let app = gateway(&backend.uri(), None);
    let response = app
        .oneshot(
            Request::post("/api/v1/scrape")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body_of(response).await, json!({"error": "Payment required"}));
}

#[tokio::test]
async fn test_transport_failure_is_proxy_error() {
    // Nothing listens on the discard port
    let app = gateway("http://127.0.0.1:9", Some("secret"));

    let response = app
        .oneshot(
            Request::post("/api/v1/scrape")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_of(response).await;
    assert_eq!(body["error"], "Proxy error");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn test_custom_prefix() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/crawl/x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&backend)
        .await;

    let config = GatewayConfig {
        backend_url: backend.uri(),
        path_prefix: "/proxy".to_string(),
        ..Default::default()
    };
    let app = router(&config).unwrap();

    let response = app
        .oneshot(Request::get("/proxy/v1/crawl/x").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_prefix_with_trailing_slash_reaches_backend_root() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"root": true})))
        .expect(1)
        .mount(&backend)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>shell</html>").unwrap();
    let config = GatewayConfig {
        backend_url: backend.uri(),
        static_dir: dir.path().to_string_lossy().to_string(),
        ..Default::default()
    };
    let app = router(&config).unwrap();

    let response = app
        .oneshot(Request::get("/api/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_of(response).await, json!({"root": true}));
}

#[tokio::test]
async fn test_bodyless_request_keeps_content_type() {
    let backend = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/crawl/job-1"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&backend)
        .await;

    let app = gateway(&backend.uri(), None);
    let response = app
        .oneshot(
            Request::delete("/api/v1/crawl/job-1")
                .header("content-type", "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
