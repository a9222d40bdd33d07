use crate::ValidationError;
use url::Url;

/// Scheme assumed for input typed without one
const DEFAULT_SCHEME_PREFIX: &str = "https://";

/// Normalizes a user-typed target URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. Prepend `https://` when the input carries no scheme
/// 3. Parse as an absolute URL; reject if malformed
/// 4. Require an http or https scheme and a non-empty host
///
/// The returned string is the candidate text itself, not the parser's
/// re-serialization, so an already-schemed input comes back unchanged.
///
/// # Examples
///
/// ```
/// use scrapedeck::payload::normalize_target_url;
///
/// assert_eq!(normalize_target_url("example.com").unwrap(), "https://example.com");
/// assert_eq!(normalize_target_url("http://example.com/a").unwrap(), "http://example.com/a");
/// assert!(normalize_target_url("not a url").is_err());
/// ```
pub fn normalize_target_url(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidUrl("Please enter a URL".to_string()));
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME_PREFIX, trimmed)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| ValidationError::InvalidUrl(format!("{}: {}", candidate, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::InvalidUrl(format!(
            "only http and https are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(candidate),
        _ => Err(ValidationError::InvalidUrl(format!(
            "{}: missing host",
            candidate
        ))),
    }
}

/// Returns true if the input starts with `<scheme>://`
fn has_scheme(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };

    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.'),
        _ => false,
    }
}
