//! Payload construction from raw, form-like input
//!
//! Numeric fields arrive as text, the way an HTML form or a command line
//! delivers them, and are coerced here.

use crate::payload::types::{
    CrawlOptions, ExtractOptions, ExtractionRequest, Mode, ModeOptions, OutputFormat,
    ScrapeOptions,
};
use crate::payload::target::normalize_target_url;
use crate::ValidationError;
use serde_json::Value;

pub const DEFAULT_WAIT_FOR_MS: u64 = 2000;
pub const DEFAULT_TIMEOUT_MS: u64 = 30000;
pub const DEFAULT_MAX_DEPTH: u64 = 2;
pub const DEFAULT_LIMIT: u64 = 10;

/// Unvalidated user input, one field per form control
#[derive(Debug, Clone, Default)]
pub struct RawInput {
    pub url: String,
    /// Selected output format tags
    pub formats: Vec<String>,
    pub only_main_content: bool,
    pub remove_base64_images: bool,
    pub wait_for: Option<String>,
    pub timeout: Option<String>,
    pub max_depth: Option<String>,
    pub limit: Option<String>,
    pub ignore_sitemap: bool,
    pub allow_external_links: bool,
    /// Comma-separated path filters
    pub include_paths: Option<String>,
    pub exclude_paths: Option<String>,
    pub prompt: Option<String>,
    /// JSON schema as typed
    pub schema: Option<String>,
}

/// Builds a validated request for the given mode
///
/// # Arguments
///
/// * `mode` - The extraction mode
/// * `input` - Raw form input
///
/// # Returns
///
/// * `Ok(ExtractionRequest)` - Ready to send
/// * `Err(ValidationError)` - Bad URL, unknown format, or unparseable schema
///
/// # Example
///
/// ```
/// use scrapedeck::payload::{build, Mode, RawInput};
///
/// let input = RawInput {
///     url: "example.com".to_string(),
///     formats: vec!["markdown".to_string()],
///     ..Default::default()
/// };
/// let request = build(Mode::Scrape, &input).unwrap();
/// assert_eq!(request.url, "https://example.com");
/// ```
pub fn build(mode: Mode, input: &RawInput) -> Result<ExtractionRequest, ValidationError> {
    let url = normalize_target_url(&input.url)?;

    let request = match mode {
        Mode::Scrape => ExtractionRequest {
            url,
            formats: parse_formats(&input.formats)?,
            options: ModeOptions::Scrape(ScrapeOptions {
                only_main_content: input.only_main_content,
                remove_base64_images: input.remove_base64_images,
                wait_for: coerce_non_negative(input.wait_for.as_deref(), DEFAULT_WAIT_FOR_MS),
                timeout: coerce_non_negative(input.timeout.as_deref(), DEFAULT_TIMEOUT_MS),
            }),
        },
        Mode::Crawl => ExtractionRequest {
            url,
            formats: parse_formats(&input.formats)?,
            options: ModeOptions::Crawl(CrawlOptions {
                max_depth: coerce_non_negative(input.max_depth.as_deref(), DEFAULT_MAX_DEPTH),
                limit: coerce_non_negative(input.limit.as_deref(), DEFAULT_LIMIT),
                ignore_sitemap: input.ignore_sitemap,
                allow_external_links: input.allow_external_links,
                include_paths: split_path_filter(input.include_paths.as_deref()),
                exclude_paths: split_path_filter(input.exclude_paths.as_deref()),
                only_main_content: true,
            }),
        },
        Mode::Extract => ExtractionRequest {
            url,
            formats: vec![OutputFormat::Json],
            options: ModeOptions::Extract(ExtractOptions {
                prompt: non_empty(input.prompt.as_deref()),
                schema: parse_schema(input.schema.as_deref())?,
                wait_for: coerce_non_negative(input.wait_for.as_deref(), DEFAULT_WAIT_FOR_MS),
            }),
        },
    };

    tracing::debug!(mode = %mode, url = %request.url, "Built request payload");

    Ok(request)
}

/// Parses selected format tags, dropping duplicates but keeping order
fn parse_formats(tags: &[String]) -> Result<Vec<OutputFormat>, ValidationError> {
    let mut formats: Vec<OutputFormat> = Vec::with_capacity(tags.len());
    for tag in tags {
        let format: OutputFormat = tag.parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    Ok(formats)
}

/// Coerces numeric text to a non-negative integer
///
/// Leading digits are taken the way a lenient form parser would ("2000ms"
/// reads as 2000). Negative numbers clamp to 0; blank or non-numeric text
/// falls back to `default`.
pub fn coerce_non_negative(raw: Option<&str>, default: u64) -> u64 {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return default;
    };

    let (negative, digits) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return default;
    }

    if negative {
        return 0;
    }

    // Too many digits for u64: saturate
    digits.parse().unwrap_or(u64::MAX)
}

/// Splits a comma-separated path filter
///
/// Blank input yields `None` so the field is omitted from the payload.
pub fn split_path_filter(raw: Option<&str>) -> Option<Vec<String>> {
    let text = raw.map(str::trim).filter(|t| !t.is_empty())?;
    Some(text.split(',').map(|p| p.trim().to_string()).collect())
}

/// Parses the schema text eagerly; blank means no schema
fn parse_schema(raw: Option<&str>) -> Result<Option<Value>, ValidationError> {
    match raw.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => serde_json::from_str(text)
            .map(Some)
            .map_err(|e| ValidationError::InvalidSchema(e.to_string())),
        None => Ok(None),
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
