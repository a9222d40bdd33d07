//! Request forwarding
//!
//! # Request Flow
//!
//! 1. Strip the configured prefix from the inbound path (query kept)
//! 2. Copy inbound headers, minus `host` and hop-by-hop headers
//! 3. Inject `Authorization: Bearer <credential>` when one is configured
//! 4. Buffer the body for body-carrying methods; default its content type
//! 5. Send once (no retry), then copy status, headers and body back
//!
//! Any transport failure becomes HTTP 500 with
//! `{"error": "Proxy error", "message": <cause>}`.

use crate::client::{bearer, describe_transport_error};
use crate::gateway::GatewayState;
use crate::ProxyError;
use axum::body::{Body, Bytes};
use axum::extract::{OriginalUri, State};
use axum::http::header::{HeaderName, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HOST};
use axum::http::{HeaderMap, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use url::Url;

/// Returns true for headers that describe one connection and must not be relayed
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-connection"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Removes the gateway prefix from a path-and-query string
///
/// Returns `None` if the path does not sit under the prefix. The prefix
/// must end at a segment boundary: `/api/x` and `/api?x` qualify, `/apix`
/// does not. A bare prefix maps to the backend root.
///
/// # Examples
///
/// ```
/// use scrapedeck::gateway::rewrite_path;
///
/// assert_eq!(rewrite_path("/api/v1/scrape", "/api").as_deref(), Some("/v1/scrape"));
/// assert_eq!(rewrite_path("/api", "/api").as_deref(), Some("/"));
/// assert_eq!(rewrite_path("/apix", "/api"), None);
/// ```
pub fn rewrite_path(path_and_query: &str, prefix: &str) -> Option<String> {
    let rest = path_and_query.strip_prefix(prefix)?;

    if rest.is_empty() || rest.starts_with('?') {
        Some(format!("/{}", rest))
    } else if rest.starts_with('/') {
        Some(rest.to_string())
    } else {
        None
    }
}

/// Joins a rewritten path onto the backend base URL
///
/// The base keeps any path of its own (`http://host/base` + `/v1/x` gives
/// `http://host/base/v1/x`).
pub fn target_url(backend_url: &str, rewritten: &str) -> Result<Url, ProxyError> {
    let joined = format!("{}{}", backend_url.trim_end_matches('/'), rewritten);
    Url::parse(&joined)
        .map_err(|e| ProxyError::malformed(format!("Unroutable path '{}': {}", rewritten, e)))
}

/// Returns true for methods whose body is forwarded
pub fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Builds the header set sent to the backend
pub fn outbound_headers(inbound: &HeaderMap, credential: Option<&str>, has_body: bool) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 2);
    for (name, value) in inbound.iter() {
        // Host belongs to the inbound connection; length is recomputed
        if name == HOST || name == CONTENT_LENGTH || is_hop_by_hop(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if let Some(value) = credential.and_then(bearer) {
        headers.insert(AUTHORIZATION, value);
    }

    if has_body && !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    headers
}

/// Copies upstream headers for the response, minus hop-by-hop headers
fn inbound_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream.iter() {
        if !is_hop_by_hop(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Handler for every method under the gateway prefix
pub async fn forward(
    State(state): State<GatewayState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    let target = match rewrite_path(path_and_query, state.prefix())
        .ok_or_else(|| {
            ProxyError::malformed(format!(
                "Path '{}' is outside prefix '{}'",
                uri.path(),
                state.prefix()
            ))
        })
        .and_then(|rewritten| target_url(state.backend_url(), &rewritten))
    {
        Ok(target) => target,
        Err(e) => {
            tracing::error!(method = %method, path = %uri.path(), error = %e, "Cannot route request");
            return e.into_response();
        }
    };

    tracing::info!(method = %method, path = %uri.path(), upstream = %target, "Proxying request");

    let has_body = carries_body(&method) && !body.is_empty();
    let mut request = state
        .client()
        .request(method.clone(), target.clone())
        .headers(outbound_headers(&headers, state.credential(), has_body));

    if has_body {
        request = request.body(body);
    }

    match relay(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(method = %method, upstream = %target, error = %e, "Proxy error");
            e.into_response()
        }
    }
}

/// Sends the outbound request and mirrors the upstream response
async fn relay(request: reqwest::RequestBuilder) -> Result<Response, ProxyError> {
    let upstream = request
        .send()
        .await
        .map_err(|e| ProxyError::network(describe_transport_error(&e)))?;

    let status = upstream.status();
    let headers = inbound_response_headers(upstream.headers());
    let body = upstream
        .bytes()
        .await
        .map_err(|e| ProxyError::network(describe_transport_error(&e)))?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
