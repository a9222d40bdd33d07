//! Result normalization
//!
//! Turns any backend result (one page, or a batch of crawled pages) into a
//! [`NormalizedResult`]. Normalization is a pure function of the payload.

mod batch;
mod links;
mod single;

pub use batch::{UNKNOWN_URL, UNTITLED};
pub use links::{collect_links, Link, LinkEntry};

use crate::{Mode, Result};
use serde_json::Value;

/// Unified view model for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResult {
    /// Combined markdown document, possibly empty
    pub document: String,
    /// Result object (single page) or list of page records (crawl)
    pub structured_payload: Value,
    pub screenshot_url: Option<String>,
    pub links: Vec<Link>,
}

/// Which view is presented first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Document,
    Structured,
    Empty,
}

impl NormalizedResult {
    /// The structured payload, pretty-printed
    pub fn structured_json(&self) -> String {
        serde_json::to_string_pretty(&self.structured_payload)
            .unwrap_or_else(|_| self.structured_payload.to_string())
    }

    /// Document first when there is one, structured data otherwise
    pub fn initial_view(&self) -> View {
        if !self.document.is_empty() {
            View::Document
        } else if !self.structured_payload.is_null() {
            View::Structured
        } else {
            View::Empty
        }
    }
}

/// Normalizes a backend response body for the given mode
///
/// # Arguments
///
/// * `payload` - Full response body (`{"data": ...}`)
/// * `mode` - The mode that produced it
///
/// # Returns
///
/// * `Ok(NormalizedResult)` - Built fresh from the payload
/// * `Err(AppError::Proxy)` - `data` is missing or has the wrong shape
pub fn normalize(payload: &Value, mode: Mode) -> Result<NormalizedResult> {
    if mode.is_batched() {
        batch::normalize_pages(payload)
    } else {
        single::normalize_page(payload)
    }
}
