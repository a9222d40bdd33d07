//! Upstream error message classification
//!
//! Some backend deployments only report free-text failures. A handful of
//! generic messages are known to show up when a screenshot format is
//! requested from an instance without a browser engine, so they are
//! rewritten into a more useful note here, and nowhere else.
//!
//! | Signature                       | Context                         | Outcome                 |
//! |---------------------------------|---------------------------------|-------------------------|
//! | `All scraping engines failed`   | scrape/crawl with screenshot    | `ScreenshotUnsupported` |
//! | `Internal server error`         | scrape/crawl with screenshot    | `ScreenshotUnsupported` |
//! | either of the above             | extract, crawl status           | `PossiblyScreenshot`    |
//! | either of the above             | scrape/crawl without screenshot | `Unchanged`             |
//! | anything else                   | any                             | `Unchanged`             |
//!
//! `PossiblyScreenshot` keeps the backend's own message: a generic internal
//! error is not proof that screenshots are the cause.

/// Message fragments that mark a generic engine failure
const ENGINE_FAILURE_SIGNATURES: &[&str] = &["All scraping engines failed", "Internal server error"];

const SCREENSHOT_UNSUPPORTED: &str = "Screenshot functionality is not supported by this API instance. Please try without screenshot format.";

/// What the failing request was doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestContext {
    /// Initial scrape or crawl submission
    Submit { screenshot_requested: bool },
    /// Schema-guided extraction
    Extract,
    /// Crawl job status query
    CrawlStatus,
    /// Anything without a screenshot heuristic
    Other,
}

/// Result of matching a message against the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    ScreenshotUnsupported,
    PossiblyScreenshot,
    Unchanged,
}

/// Looks up a backend message in the classification table
pub fn classify(message: &str, context: RequestContext) -> Classification {
    let engine_failure = ENGINE_FAILURE_SIGNATURES
        .iter()
        .any(|signature| message.contains(signature));

    if !engine_failure {
        return Classification::Unchanged;
    }

    match context {
        RequestContext::Submit {
            screenshot_requested: true,
        } => Classification::ScreenshotUnsupported,
        RequestContext::Submit {
            screenshot_requested: false,
        } => Classification::Unchanged,
        RequestContext::Extract | RequestContext::CrawlStatus => {
            Classification::PossiblyScreenshot
        }
        RequestContext::Other => Classification::Unchanged,
    }
}

/// Produces the user-facing message for a backend failure
pub fn describe_upstream_error(message: &str, context: RequestContext) -> String {
    match classify(message, context) {
        Classification::ScreenshotUnsupported => SCREENSHOT_UNSUPPORTED.to_string(),
        Classification::PossiblyScreenshot => format!(
            "The API instance encountered an error ({}). If you were trying to use screenshot functionality, it may not be supported by this API instance.",
            message
        ),
        Classification::Unchanged => message.to_string(),
    }
}
