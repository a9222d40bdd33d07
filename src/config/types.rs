use serde::Deserialize;

/// Main configuration structure for Scrapedeck
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub server: ServerConfig,
    pub client: ClientConfig,
}

/// Request gateway configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the extraction backend
    #[serde(rename = "backend-url")]
    pub backend_url: String,

    /// Bearer credential injected into forwarded requests
    #[serde(rename = "api-key")]
    pub api_key: Option<String>,

    /// Local path prefix stripped before forwarding
    #[serde(rename = "path-prefix")]
    pub path_prefix: String,

    /// Directory holding the single-page application shell
    #[serde(rename = "static-dir")]
    pub static_dir: String,
}

impl GatewayConfig {
    /// Returns the credential only if one is actually configured
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://firecrawl:3002".to_string(),
            api_key: None,
            path_prefix: "/api".to_string(),
            static_dir: "./static".to_string(),
        }
    }
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Launch a browser pointed at the application on startup
    #[serde(rename = "open-browser")]
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            open_browser: true,
        }
    }
}

/// Settings for the command-line client side
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Where API calls are sent; usually the gateway's prefix
    #[serde(rename = "api-base")]
    pub api_base: String,

    /// Delay between crawl status checks (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:3000/api".to_string(),
            poll_interval_ms: 5000,
        }
    }
}
