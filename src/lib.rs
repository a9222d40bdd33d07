//! Scrapedeck: a gateway and job orchestrator for a remote content-extraction service
//!
//! This crate forwards browser-originated calls to the extraction backend,
//! builds scrape/crawl/extract payloads, drives crawl jobs to completion, and
//! reconciles the backend's heterogeneous result shapes into one view model.

pub mod client;
pub mod config;
pub mod gateway;
pub mod normalize;
pub mod orchestrator;
pub mod payload;
pub mod poller;
pub mod render;

use std::fmt;
use thiserror::Error;

/// Main error type for Scrapedeck operations
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Proxy(#[from] ProxyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl AppError {
    /// Builds a malformed-response error with the given message
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Proxy(ProxyError::malformed(message))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Input validation errors raised before any network call is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("Invalid JSON schema format: {0}")]
    InvalidSchema(String),

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),
}

impl ValidationError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid-url",
            Self::InvalidSchema(_) => "invalid-schema",
            Self::UnknownFormat(_) => "invalid-format",
        }
    }
}

/// Classification of a failed network hop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyErrorKind {
    /// DNS failure, refused connection, timeout
    Network,
    /// Backend answered with a 4xx status
    Upstream4xx,
    /// Backend answered with a 5xx (or any other non-success) status
    Upstream5xx,
    /// Backend answered, but not with the expected shape
    MalformedResponse,
}

impl ProxyErrorKind {
    /// Picks the upstream kind matching an HTTP status code
    pub fn from_status(status: u16) -> Self {
        if (400..500).contains(&status) {
            Self::Upstream4xx
        } else {
            Self::Upstream5xx
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Upstream4xx => "upstream-4xx",
            Self::Upstream5xx => "upstream-5xx",
            Self::MalformedResponse => "malformed-response",
        }
    }

    /// Returns true for failures reported by the backend itself
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream4xx | Self::Upstream5xx)
    }
}

impl fmt::Display for ProxyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure on the path between this process and the backend service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProxyError {
    pub kind: ProxyErrorKind,
    pub message: String,
    pub upstream_status: Option<u16>,
}

impl ProxyError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ProxyErrorKind::Network,
            message: message.into(),
            upstream_status: None,
        }
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ProxyErrorKind::from_status(status),
            message: message.into(),
            upstream_status: Some(status),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: ProxyErrorKind::MalformedResponse,
            message: message.into(),
            upstream_status: None,
        }
    }
}

/// Result type alias for Scrapedeck operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for payload validation
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

// Re-export commonly used types
pub use config::Config;
pub use normalize::{normalize, NormalizedResult};
pub use payload::{build, ExtractionRequest, Mode, RawInput};
pub use poller::{CrawlJobHandle, PollSession, PollState};
