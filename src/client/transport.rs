//! HTTP client construction
//!
//! Two flavours are built from the same base:
//! - a pass-through client for the gateway, which must hand bodies back
//!   byte-for-byte and therefore never decompresses or follows redirects
//! - an API client for the orchestrator, which decodes responses normally

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// User agent sent when the caller did not supply one
pub fn user_agent() -> String {
    format!("scrapedeck/{}", env!("CARGO_PKG_VERSION"))
}

/// Formats a bearer credential as an `Authorization` header value
pub fn bearer(credential: &str) -> Option<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", credential)).ok()?;
    value.set_sensitive(true);
    Some(value)
}

/// Builds the client the gateway forwards through
///
/// Upstream status, headers and body must reach the caller unmodified, so
/// redirects are returned rather than followed and content encodings are
/// left alone.
pub fn build_passthrough_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(false)
        .brotli(false)
        .build()
}

/// Builds the client used to talk to the API directly
///
/// # Arguments
///
/// * `credential` - Optional bearer credential sent with every request
///
/// # Example
///
/// ```
/// use scrapedeck::client::build_api_client;
///
/// let client = build_api_client(Some("fc-123")).unwrap();
/// ```
pub fn build_api_client(credential: Option<&str>) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Some(value) = credential.filter(|c| !c.is_empty()).and_then(bearer) {
        headers.insert(AUTHORIZATION, value);
    }

    Client::builder()
        .user_agent(user_agent())
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Describes a transport failure in a few words
pub fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("Request timeout: {}", error)
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_clients() {
        assert!(build_passthrough_client().is_ok());
        assert!(build_api_client(None).is_ok());
        assert!(build_api_client(Some("secret")).is_ok());
    }

    #[test]
    fn test_bearer_header() {
        let value = bearer("abc").unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer abc");
        assert!(value.is_sensitive());

        // Control characters cannot go into a header
        assert!(bearer("bad\nkey").is_none());
    }

    #[test]
    fn test_user_agent_format() {
        assert!(user_agent().starts_with("scrapedeck/"));
    }
}
