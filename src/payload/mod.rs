//! Payload Builder
//!
//! Turns raw form-like input into a validated, mode-specific request body:
//! - URL normalization (`https://` assumed when no scheme is given)
//! - Output format selection
//! - Numeric option coercion with defaults
//! - Path filter splitting and eager JSON schema parsing

mod builder;
mod types;
mod target;

pub use builder::{
    build, coerce_non_negative, split_path_filter, RawInput, DEFAULT_LIMIT, DEFAULT_MAX_DEPTH,
    DEFAULT_TIMEOUT_MS, DEFAULT_WAIT_FOR_MS,
};
pub use types::{
    CrawlOptions, ExtractOptions, ExtractionRequest, Mode, ModeOptions, OutputFormat,
    RequestBody, ScrapeOptions,
};
pub use target::normalize_target_url;
