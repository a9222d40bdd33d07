//! End-to-end operations
//!
//! One operation runs strictly in order: build the payload, submit it, poll
//! the crawl job (crawl mode only), then normalize the final payload. Any
//! failure ends the operation and is returned to the caller.

use crate::client::{ApiClient, Submission};
use crate::config::ClientConfig;
use crate::normalize::{normalize, NormalizedResult};
use crate::payload::{build, ExtractionRequest, Mode, RawInput};
use crate::poller::{PollEvent, PollSession, Progress};
use crate::{AppError, Result};
use serde_json::Value;
use std::time::Duration;

/// Drives operations against the extraction API
pub struct Orchestrator {
    client: ApiClient,
    session: PollSession,
}

impl Orchestrator {
    pub fn new(client: ApiClient, poll_interval: Duration) -> Self {
        let session = PollSession::new(client.clone(), poll_interval);
        Self { client, session }
    }

    /// Creates an orchestrator from client settings
    ///
    /// # Arguments
    ///
    /// * `config` - API base and poll interval
    /// * `credential` - Only needed when the API base is the backend itself
    pub fn from_config(config: &ClientConfig, credential: Option<&str>) -> Result<Self> {
        let client = ApiClient::new(&config.api_base, credential)?;
        Ok(Self::new(
            client,
            Duration::from_millis(config.poll_interval_ms),
        ))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Returns true while a crawl job is being polled
    pub fn is_polling(&self) -> bool {
        self.session.is_active()
    }

    /// Abandons any crawl job still being polled
    pub fn reset(&mut self) {
        self.session.cancel();
    }

    /// Validates raw input, then runs the operation
    pub async fn run_input<F>(
        &mut self,
        mode: Mode,
        input: &RawInput,
        on_progress: F,
    ) -> Result<NormalizedResult>
    where
        F: FnMut(&Progress),
    {
        let request = build(mode, input)?;
        self.run(&request, on_progress).await
    }

    /// Runs one operation to completion
    ///
    /// Starting an operation cancels any crawl job still being polled.
    /// `on_progress` is called for each crawl progress update.
    pub async fn run<F>(&mut self, request: &ExtractionRequest, mut on_progress: F) -> Result<NormalizedResult>
    where
        F: FnMut(&Progress),
    {
        self.session.cancel();

        let mode = request.mode();
        tracing::info!(mode = %mode, url = %request.url, "Starting operation");

        let payload = match self.client.submit(request).await? {
            Submission::Single(body) => body,
            Submission::Job(job_id) => {
                tracing::info!(job_id = %job_id, "Crawl job accepted");
                self.await_job(job_id, &mut on_progress).await?
            }
        };

        let result = normalize(&payload, mode)?;
        tracing::debug!(
            document_len = result.document.len(),
            links = result.links.len(),
            "Normalized result"
        );
        Ok(result)
    }

    async fn await_job<F>(&mut self, job_id: String, on_progress: &mut F) -> Result<Value>
    where
        F: FnMut(&Progress),
    {
        let mut events = self.session.start(job_id);

        while let Some(event) = events.recv().await {
            match event {
                PollEvent::Progress(progress) => on_progress(&progress),
                PollEvent::Completed { payload, .. } => return Ok(payload),
                PollEvent::Failed { error, .. } => return Err(status_check_failed(error)),
            }
        }

        Err(AppError::Server(
            "Polling stopped before the crawl job finished".to_string(),
        ))
    }
}

/// Prefixes a polling failure so the banner says what was being done
fn status_check_failed(error: AppError) -> AppError {
    match error {
        AppError::Proxy(mut e) => {
            e.message = format!("Error checking crawl status: {}", e.message);
            AppError::Proxy(e)
        }
        other => other,
    }
}
