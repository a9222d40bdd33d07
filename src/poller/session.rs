//! Caller-owned polling session
//!
//! A session runs at most one polling loop. The loop queries job status
//! right away and then once per interval until the job reaches a terminal
//! state, an error occurs, or the session cancels it. Events are delivered
//! over a channel; dropping the receiver also ends the loop.

use crate::client::ApiClient;
use crate::poller::handle::{CrawlJobHandle, Progress};
use crate::poller::state::{JobStatus, PollState};
use crate::{AppError, ProxyError, ProxyErrorKind};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Something the polling loop reports to its caller
#[derive(Debug)]
pub enum PollEvent {
    Progress(Progress),
    /// Terminal success; the full final status payload
    Completed {
        handle: CrawlJobHandle,
        payload: Value,
    },
    /// Terminal failure
    Failed { state: PollState, error: AppError },
}

struct ActiveLoop {
    job_id: String,
    cancel: CancellationToken,
    task: JoinHandle<PollState>,
}

/// Owns the single polling loop for the current operation
pub struct PollSession {
    client: ApiClient,
    interval: Duration,
    active: Option<ActiveLoop>,
}

impl PollSession {
    pub fn new(client: ApiClient, interval: Duration) -> Self {
        Self {
            client,
            interval,
            active: None,
        }
    }

    /// Starts polling `job_id`, cancelling any loop already running
    pub fn start(&mut self, job_id: impl Into<String>) -> mpsc::UnboundedReceiver<PollEvent> {
        self.cancel();

        let job_id = job_id.into();
        let (events, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        tracing::info!(job_id = %job_id, interval_ms = self.interval.as_millis() as u64, "Polling crawl job");

        let task = tokio::spawn(poll_loop(
            self.client.clone(),
            CrawlJobHandle::new(job_id.clone()),
            self.interval,
            cancel.clone(),
            events,
        ));

        self.active = Some(ActiveLoop {
            job_id,
            cancel,
            task,
        });

        receiver
    }

    /// Stops the current loop, if any
    ///
    /// A status query already in flight is abandoned and its result dropped.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            if !active.task.is_finished() {
                tracing::debug!(job_id = %active.job_id, "Cancelling polling loop");
            }
            active.cancel.cancel();
        }
    }

    /// Returns true while a loop is still querying
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.task.is_finished())
    }

    /// Job id of the current (or most recent, if not cancelled) loop
    pub fn job_id(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.job_id.as_str())
    }
}

impl Drop for PollSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn transition(handle: &CrawlJobHandle, state: &mut PollState, next: PollState) {
    if *state == next {
        return;
    }
    if !state.can_transition_to(next) {
        tracing::warn!(job_id = %handle.job_id, from = %state, to = %next, "Ignoring illegal poll transition");
        return;
    }
    tracing::debug!(job_id = %handle.job_id, from = %state, to = %next, "Poll state changed");
    *state = next;
}

/// Builds the error for a job the backend itself reports as failed
fn job_failure(handle: &CrawlJobHandle, payload: &Value) -> AppError {
    let message = payload
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Crawl job {}", handle.status_text));

    ProxyError {
        kind: ProxyErrorKind::Upstream5xx,
        message,
        upstream_status: None,
    }
    .into()
}

async fn poll_loop(
    client: ApiClient,
    mut handle: CrawlJobHandle,
    period: Duration,
    cancel: CancellationToken,
    events: mpsc::UnboundedSender<PollEvent>,
) -> PollState {
    let mut state = PollState::Pending;
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return state,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return state,
            result = client.crawl_status(&handle.job_id) => result,
        };

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(error) => {
                let next = PollState::from_error(&error);
                transition(&handle, &mut state, next);
                tracing::warn!(job_id = %handle.job_id, state = %state, error = %error, "Crawl status check failed");
                let _ = events.send(PollEvent::Failed { state, error });
                return state;
            }
        };

        let progress = handle.update(&snapshot);

        let event = match handle.status {
            JobStatus::Completed => {
                transition(&handle, &mut state, PollState::Completed);
                tracing::info!(
                    job_id = %handle.job_id,
                    completed = handle.completed,
                    total = handle.total,
                    elapsed_ms = handle.elapsed().num_milliseconds(),
                    "Crawl job completed"
                );
                let _ = events.send(PollEvent::Completed {
                    handle,
                    payload: snapshot.payload,
                });
                return state;
            }
            JobStatus::Failed => {
                transition(&handle, &mut state, PollState::FailedUpstream);
                let error = job_failure(&handle, &snapshot.payload);
                tracing::warn!(job_id = %handle.job_id, error = %error, "Crawl job failed");
                let _ = events.send(PollEvent::Failed { state, error });
                return state;
            }
            JobStatus::Processing | JobStatus::Unknown => {
                transition(&handle, &mut state, PollState::Processing);
                match progress {
                    Some(progress) => PollEvent::Progress(progress),
                    None => continue,
                }
            }
        };

        if events.send(event).is_err() {
            tracing::debug!(job_id = %handle.job_id, "Poll receiver dropped, stopping");
            return state;
        }
    }
}
