//! Link reconciliation
//!
//! The backend reports links in several shapes. Each raw entry is resolved
//! once into a [`LinkEntry`]; anything unrecognised is skipped.

use serde_json::{Map, Value};

/// A recognised link shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEntry {
    /// `{"href": ..., "text": ...}`
    HrefText { href: String, text: Option<String> },
    /// `{"url": ..., "title": ..., "text": ...}`
    UrlTitle {
        url: String,
        title: Option<String>,
        text: Option<String>,
    },
    /// A bare URL string
    Plain(String),
}

/// A resolved link, annotated with the page it was found on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
    pub source_url: Option<String>,
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Returns true for values that look like a link target
fn looks_like_target(candidate: &str) -> bool {
    candidate.starts_with("http") || candidate.starts_with('/')
}

impl LinkEntry {
    /// Classifies one element of a `links` array
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Plain(s.clone())),
            Value::Object(object) => {
                if let Some(href) = non_empty_str(object, "href") {
                    Some(Self::HrefText {
                        href: href.to_string(),
                        text: non_empty_str(object, "text").map(str::to_string),
                    })
                } else {
                    non_empty_str(object, "url").map(|url| Self::UrlTitle {
                        url: url.to_string(),
                        title: non_empty_str(object, "title").map(str::to_string),
                        text: non_empty_str(object, "text").map(str::to_string),
                    })
                }
            }
            _ => None,
        }
    }

    /// Classifies one entry of a `links` mapping
    ///
    /// A target-like value wins over a target-like key.
    pub fn from_pair(key: &str, value: &Value) -> Option<Self> {
        let text = value.as_str().filter(|s| !s.is_empty());

        match text {
            Some(v) if looks_like_target(v) => Some(Self::HrefText {
                href: v.to_string(),
                text: Some(key.to_string()),
            }),
            _ if looks_like_target(key) => Some(Self::HrefText {
                href: key.to_string(),
                text: text.map(str::to_string),
            }),
            _ => None,
        }
    }

    /// Resolves display text and attaches the source page
    pub fn resolve(self, source_url: Option<&str>) -> Link {
        let (href, text) = match self {
            Self::HrefText { href, text } => {
                let text = text.unwrap_or_else(|| href.clone());
                (href, text)
            }
            Self::UrlTitle { url, title, text } => {
                let text = title.or(text).unwrap_or_else(|| url.clone());
                (url, text)
            }
            Self::Plain(url) => (url.clone(), url),
        };

        Link {
            href,
            text,
            source_url: source_url.map(str::to_string),
        }
    }
}

/// Ingests a page's `links` field, in document order
pub fn collect_links(links: Option<&Value>, source_url: Option<&str>) -> Vec<Link> {
    let entries: Vec<LinkEntry> = match links {
        Some(Value::Array(items)) => items.iter().filter_map(LinkEntry::from_value).collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(key, value)| LinkEntry::from_pair(key, value))
            .collect(),
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .map(|entry| entry.resolve(source_url))
        .collect()
}
