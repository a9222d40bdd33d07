/// Polling state definitions for crawl jobs
///
/// A polling loop moves through these states; the backend's own job status is
/// tracked separately by [`JobStatus`].
use crate::{AppError, ProxyErrorKind};
use std::fmt;

/// Represents where a polling loop is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollState {
    // ===== Active States =====
    /// Job accepted, no status query answered yet
    Pending,

    /// At least one status query answered, job still running
    Processing,

    // ===== Terminal States =====
    /// Backend reported the job as completed
    Completed,

    /// A status query could not reach the backend
    FailedTransport,

    /// The backend answered with an error, or reported the job as failed
    FailedUpstream,
}

impl PollState {
    /// Returns true if no further queries will be issued
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if the loop is still querying
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FailedTransport | Self::FailedUpstream)
    }

    /// Checks whether moving to `next` is a legal transition
    ///
    /// Terminal states are final, and a loop never returns to `Pending`.
    pub fn can_transition_to(&self, next: PollState) -> bool {
        match self {
            Self::Pending => true,
            Self::Processing => next != Self::Pending,
            _ => false,
        }
    }

    /// Picks the failure state matching an error raised by a status query
    pub fn from_error(error: &AppError) -> Self {
        match error {
            AppError::Proxy(e) if e.kind == ProxyErrorKind::Network => Self::FailedTransport,
            _ => Self::FailedUpstream,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::FailedTransport => "failed-transport",
            Self::FailedUpstream => "failed-upstream",
        }
    }

    pub fn all_states() -> [Self; 5] {
        [
            Self::Pending,
            Self::Processing,
            Self::Completed,
            Self::FailedTransport,
            Self::FailedUpstream,
        ]
    }
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Job status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// No status query answered yet
    Unknown,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Interprets the backend's `status` field
    ///
    /// Anything other than `completed`, `failed` or `cancelled` (including a
    /// missing field) means the job is still running.
    pub fn from_backend(status: Option<&str>) -> Self {
        match status {
            Some("completed") => Self::Completed,
            Some("failed") | Some("cancelled") => Self::Failed,
            _ => Self::Processing,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProxyError;

    #[test]
    fn test_is_terminal() {
        assert!(!PollState::Pending.is_terminal());
        assert!(!PollState::Processing.is_terminal());

        assert!(PollState::Completed.is_terminal());
        assert!(PollState::FailedTransport.is_terminal());
        assert!(PollState::FailedUpstream.is_terminal());
    }

    #[test]
    fn test_is_failure() {
        assert!(PollState::FailedTransport.is_failure());
        assert!(PollState::FailedUpstream.is_failure());

        assert!(!PollState::Completed.is_failure());
        assert!(!PollState::Pending.is_failure());
    }

    #[test]
    fn test_transitions() {
        for next in PollState::all_states() {
            assert!(PollState::Pending.can_transition_to(next));
        }

        assert!(PollState::Processing.can_transition_to(PollState::Processing));
        assert!(PollState::Processing.can_transition_to(PollState::Completed));
        assert!(!PollState::Processing.can_transition_to(PollState::Pending));

        for terminal in [
            PollState::Completed,
            PollState::FailedTransport,
            PollState::FailedUpstream,
        ] {
            for next in PollState::all_states() {
                assert!(
                    !terminal.can_transition_to(next),
                    "{} -> {} should be rejected",
                    terminal,
                    next
                );
            }
        }
    }

    #[test]
    fn test_from_error() {
        let transport: AppError = ProxyError::network("connection refused").into();
        assert_eq!(PollState::from_error(&transport), PollState::FailedTransport);

        let upstream: AppError = ProxyError::upstream(404, "Job not found").into();
        assert_eq!(PollState::from_error(&upstream), PollState::FailedUpstream);

        let malformed = AppError::malformed("Invalid response from API");
        assert_eq!(PollState::from_error(&malformed), PollState::FailedUpstream);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PollState::Pending), "pending");
        assert_eq!(format!("{}", PollState::FailedTransport), "failed-transport");
        assert_eq!(format!("{}", PollState::FailedUpstream), "failed-upstream");
    }

    #[test]
    fn test_all_states_complete() {
        let all = PollState::all_states();
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                assert_ne!(all[i], all[j], "Duplicate state found");
            }
        }
    }

    #[test]
    fn test_job_status_from_backend() {
        assert_eq!(JobStatus::from_backend(Some("completed")), JobStatus::Completed);
        assert_eq!(JobStatus::from_backend(Some("failed")), JobStatus::Failed);
        assert_eq!(JobStatus::from_backend(Some("cancelled")), JobStatus::Failed);
        assert_eq!(JobStatus::from_backend(Some("scraping")), JobStatus::Processing);
        assert_eq!(JobStatus::from_backend(None), JobStatus::Processing);

        assert!(JobStatus::Completed.is_terminal());
        assert!(!JobStatus::Unknown.is_terminal());
    }
}
