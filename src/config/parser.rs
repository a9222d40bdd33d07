use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads the complete configuration
///
/// # Arguments
///
/// * `path` - Optional path to a TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Defaults, overlaid with the file, overlaid with the environment
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    // A missing .env file is not an error
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!("Ignoring unreadable .env file: {}", e);
        }
    }

    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => Config::default(),
    };

    apply_env(&mut config, |name| std::env::var(name).ok())?;

    validate(&config)?;

    Ok(config)
}

/// Parses a TOML configuration file without applying the environment
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Overlays environment variables onto a configuration
///
/// `lookup` resolves a variable name to its value; it is `std::env::var` in
/// production and a map in tests.
pub fn apply_env<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("BACKEND_URL") {
        config.gateway.backend_url = url;
    }

    if let Some(key) = lookup("BACKEND_API_KEY") {
        config.gateway.api_key = if key.is_empty() { None } else { Some(key) };
    }

    if let Some(prefix) = lookup("API_PREFIX") {
        config.gateway.path_prefix = prefix;
    }

    if let Some(dir) = lookup("STATIC_DIR") {
        config.gateway.static_dir = dir;
    }

    if let Some(host) = lookup("HOST") {
        config.server.host = host;
    }

    if let Some(port) = lookup("PORT") {
        config.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
            name: "PORT",
            value: port.clone(),
        })?;
    }

    // Only an explicit "false" turns the browser launch off
    if let Some(open) = lookup("OPEN_BROWSER") {
        config.server.open_browser = open != "false";
    }

    if let Some(base) = lookup("API_BASE") {
        config.client.api_base = base;
    }

    if let Some(interval) = lookup("POLL_INTERVAL_MS") {
        config.client.poll_interval_ms =
            interval.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "POLL_INTERVAL_MS",
                value: interval.clone(),
            })?;
    }

    Ok(())
}
