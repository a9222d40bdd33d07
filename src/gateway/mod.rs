//! HTTP surface: API forwarding, gateway introspection and the web shell
//!
//! ```text
//! {prefix}, {prefix}/*   any method   forwarded to the backend
//! GET /config                         {"apiEndpoint": ..., "apiKey": bool}
//! everything else                     static files, index.html fallback
//! ```

mod proxy;
mod server;

pub use proxy::{carries_body, forward, outbound_headers, rewrite_path, target_url};
pub use server::serve;

use crate::client::{build_passthrough_client, GatewayInfo};
use crate::config::GatewayConfig;
use crate::{AppError, ProxyError, Result};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Largest request body the gateway will buffer
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Shared state for gateway handlers
#[derive(Clone)]
pub struct GatewayState {
    inner: Arc<StateInner>,
}

struct StateInner {
    client: reqwest::Client,
    backend_url: String,
    credential: Option<String>,
    prefix: String,
}

impl GatewayState {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = build_passthrough_client()
            .map_err(|e| AppError::Server(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            inner: Arc::new(StateInner {
                client,
                backend_url: config.backend_url.clone(),
                credential: config.credential().map(str::to_string),
                prefix: config.path_prefix.clone(),
            }),
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// Backend base URL exactly as configured
    pub fn backend_url(&self) -> &str {
        &self.inner.backend_url
    }

    pub fn credential(&self) -> Option<&str> {
        self.inner.credential.as_deref()
    }

    pub fn prefix(&self) -> &str {
        &self.inner.prefix
    }

    /// Public view of this gateway; the credential itself never leaves
    pub fn info(&self) -> GatewayInfo {
        GatewayInfo {
            api_endpoint: self.inner.backend_url.clone(),
            api_key: self.inner.credential.is_some(),
        }
    }
}

/// Builds the complete gateway application
pub fn router(config: &GatewayConfig) -> Result<Router> {
    let state = GatewayState::new(config)?;

    let static_dir = PathBuf::from(&config.static_dir);
    let spa = ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let prefix = config.path_prefix.as_str();

    Ok(Router::new()
        .route(prefix, any(forward))
        .route(&format!("{}/", prefix), any(forward))
        .route(&format!("{}/*rest", prefix), any(forward))
        .route("/config", get(gateway_config))
        .fallback_service(spa)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn gateway_config(State(state): State<GatewayState>) -> Json<GatewayInfo> {
    Json(state.info())
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Proxy error",
                "message": self.message,
            })),
        )
            .into_response()
    }
}
