use crate::client::CrawlStatusResponse;
use crate::poller::state::JobStatus;
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Status text shown when the backend omits one
pub const DEFAULT_STATUS_TEXT: &str = "Processing";

/// The in-flight crawl job, owned by one polling loop
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlJobHandle {
    /// Opaque id assigned by the backend
    pub job_id: String,
    pub status: JobStatus,
    /// Backend status text, for display
    pub status_text: String,
    pub completed: u64,
    pub total: u64,
    /// When polling began for this job
    pub started_at: DateTime<Utc>,
}

impl CrawlJobHandle {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Unknown,
            status_text: String::new(),
            completed: 0,
            total: 0,
            started_at: Utc::now(),
        }
    }

    /// Applies one status snapshot
    ///
    /// Counters only move when the snapshot carries both of them and a
    /// non-zero total; in that case the new progress is returned.
    pub fn update(&mut self, snapshot: &CrawlStatusResponse) -> Option<Progress> {
        self.status = JobStatus::from_backend(snapshot.status.as_deref());
        self.status_text = snapshot
            .status
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_STATUS_TEXT.to_string());

        match (snapshot.completed, snapshot.total) {
            (Some(completed), Some(total)) if total > 0 => {
                self.completed = completed;
                self.total = total;
                self.progress()
            }
            _ => None,
        }
    }

    /// Time since polling began, never negative
    pub fn elapsed(&self) -> Duration {
        (Utc::now() - self.started_at).max(Duration::zero())
    }

    /// Completion percentage, rounded and clamped to 0..=100
    pub fn percent(&self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        let ratio = self.completed as f64 / self.total as f64 * 100.0;
        Some(ratio.round().clamp(0.0, 100.0) as u8)
    }

    pub fn progress(&self) -> Option<Progress> {
        self.percent().map(|percent| Progress {
            status: self.status_text.clone(),
            completed: self.completed,
            total: self.total,
            percent,
        })
    }
}

/// One progress update for the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub status: String,
    pub completed: u64,
    pub total: u64,
    pub percent: u8,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} ({}%)",
            self.status, self.completed, self.total, self.percent
        )
    }
}
