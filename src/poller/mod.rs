//! Crawl job polling
//!
//! ```text
//! pending ──► processing ──► completed
//!    │            │
//!    └────────────┴──► failed-transport | failed-upstream
//! ```

mod handle;
mod session;
mod state;

pub use handle::{CrawlJobHandle, Progress, DEFAULT_STATUS_TEXT};
pub use session::{PollEvent, PollSession};
pub use state::{JobStatus, PollState};

use std::time::Duration;

/// Default time between status queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);
