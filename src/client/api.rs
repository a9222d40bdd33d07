//! Typed access to the extraction API
//!
//! Requests normally go through the gateway (`http://host:port/api`), but the
//! client works just as well pointed straight at the backend.

use crate::client::classify::{describe_upstream_error, RequestContext};
use crate::client::transport::{build_api_client, describe_transport_error};
use crate::payload::{ExtractionRequest, Mode};
use crate::{AppError, ProxyError, Result};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// What the gateway reports about itself at `GET /config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayInfo {
    pub api_endpoint: String,
    /// Whether a credential is configured; never the credential itself
    pub api_key: bool,
}

/// Outcome of submitting a request
#[derive(Debug, Clone)]
pub enum Submission {
    /// Scrape/extract results, the full response body
    Single(Value),
    /// Crawl accepted; poll this job id
    Job(String),
}

/// One crawl status snapshot
#[derive(Debug, Clone)]
pub struct CrawlStatusResponse {
    pub status: Option<String>,
    pub completed: Option<u64>,
    pub total: Option<u64>,
    /// The full response body
    pub payload: Value,
}

impl CrawlStatusResponse {
    /// Picks the known fields out of a status body
    pub fn from_payload(payload: Value) -> Self {
        Self {
            status: payload
                .get("status")
                .and_then(Value::as_str)
                .map(str::to_string),
            completed: payload.get("completed").and_then(as_count),
            total: payload.get("total").and_then(as_count),
            payload,
        }
    }
}

/// Reads a non-negative count that may have been serialized as a float
fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u64)
    })
}

/// Client for the extraction API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// Creates a client rooted at `base`
    ///
    /// # Arguments
    ///
    /// * `base` - API root, e.g. `http://localhost:3000/api`
    /// * `credential` - Bearer credential, only needed when bypassing the gateway
    pub fn new(base: &str, credential: Option<&str>) -> Result<Self> {
        let base = Url::parse(base.trim_end_matches('/'))
            .map_err(|e| AppError::Server(format!("Invalid API base '{}': {}", base, e)))?;

        if base.cannot_be_a_base() {
            return Err(AppError::Server(format!("Invalid API base '{}'", base)));
        }

        let http = build_api_client(credential)
            .map_err(|e| AppError::Server(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Joins API path segments onto the base, keeping the base path
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    /// Sends a request for any mode
    pub async fn submit(&self, request: &ExtractionRequest) -> Result<Submission> {
        match request.mode() {
            Mode::Crawl => self.start_crawl(request).await.map(Submission::Job),
            Mode::Scrape | Mode::Extract => self.scrape(request).await.map(Submission::Single),
        }
    }

    /// Posts a scrape or extract request and returns the response body
    pub async fn scrape(&self, request: &ExtractionRequest) -> Result<Value> {
        let context = match request.mode() {
            Mode::Extract => RequestContext::Extract,
            _ => RequestContext::Submit {
                screenshot_requested: request.wants_screenshot(),
            },
        };

        let url = self.endpoint(&["v1", "scrape"]);
        tracing::info!(mode = %request.mode(), url = %url, "Sending request");

        self.send(self.http.post(url).json(&request.body()), context)
            .await
    }

    /// Posts a crawl request and returns the job id assigned by the backend
    pub async fn start_crawl(&self, request: &ExtractionRequest) -> Result<String> {
        let context = RequestContext::Submit {
            screenshot_requested: request.wants_screenshot(),
        };

        let url = self.endpoint(&["v1", "crawl"]);
        tracing::info!(mode = %request.mode(), url = %url, "Sending request");

        let body = self
            .send(self.http.post(url).json(&request.body()), context)
            .await?;

        body.get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::malformed("Invalid response from API: missing crawl job id"))
    }

    /// Fetches one status snapshot for a crawl job
    pub async fn crawl_status(&self, job_id: &str) -> Result<CrawlStatusResponse> {
        let url = self.endpoint(&["v1", "crawl", job_id]);
        tracing::debug!(job_id, url = %url, "Checking crawl status");

        let body = self
            .send(self.http.get(url), RequestContext::CrawlStatus)
            .await?;

        Ok(CrawlStatusResponse::from_payload(body))
    }

    /// Reads `GET /config` from the gateway serving this API base
    pub async fn gateway_config(&self) -> Result<GatewayInfo> {
        let mut url = self.base.clone();
        url.set_path("/config");
        url.set_query(None);

        let body = self.send(self.http.get(url), RequestContext::Other).await?;

        serde_json::from_value(body)
            .map_err(|e| AppError::malformed(format!("Invalid gateway configuration: {}", e)))
    }

    /// Sends a request and decodes the JSON body, translating every failure
    async fn send(&self, request: RequestBuilder, context: RequestContext) -> Result<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| ProxyError::network(describe_transport_error(&e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProxyError::network(describe_transport_error(&e)))?;

        let body: Option<Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let message = body
                .as_ref()
                .and_then(|b| b.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("API returned status {}", status.as_u16()));

            tracing::warn!(status = status.as_u16(), error = %message, "API request failed");

            return Err(ProxyError::upstream(
                status.as_u16(),
                describe_upstream_error(&message, context),
            )
            .into());
        }

        body.ok_or_else(|| AppError::malformed("Invalid response from API: body is not JSON"))
    }
}
