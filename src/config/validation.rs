use crate::config::types::{ClientConfig, Config, GatewayConfig, ServerConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_gateway_config(&config.gateway)?;
    validate_server_config(&config.server)?;
    validate_client_config(&config.client)?;
    Ok(())
}

/// Validates request gateway configuration
fn validate_gateway_config(config: &GatewayConfig) -> Result<(), ConfigError> {
    validate_http_url("backend_url", &config.backend_url)?;
    validate_path_prefix(&config.path_prefix)?;

    if config.static_dir.is_empty() {
        return Err(ConfigError::Validation(
            "static_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates listener configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.host.is_empty() {
        return Err(ConfigError::Validation("host cannot be empty".to_string()));
    }

    if config.port == 0 {
        return Err(ConfigError::Validation("port must be non-zero".to_string()));
    }

    Ok(())
}

/// Validates client configuration
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    validate_http_url("api_base", &config.api_base)?;

    if config.poll_interval_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be >= 100ms, got {}ms",
            config.poll_interval_ms
        )));
    }

    Ok(())
}

/// Validates that a value is an absolute http(s) URL
fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", name, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            name, value
        )));
    }

    Ok(())
}

/// Validates the gateway path prefix (e.g. "/api")
fn validate_path_prefix(prefix: &str) -> Result<(), ConfigError> {
    if !prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "path_prefix must start with '/', got '{}'",
            prefix
        )));
    }

    if prefix.len() > 1 && prefix.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "path_prefix must not end with '/', got '{}'",
            prefix
        )));
    }

    if prefix == "/" || prefix.contains('*') || prefix.contains(':') {
        return Err(ConfigError::Validation(format!(
            "path_prefix must be a plain non-root path, got '{}'",
            prefix
        )));
    }

    Ok(())
}
