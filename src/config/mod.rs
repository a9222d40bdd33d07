//! Configuration module for Scrapedeck
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables (a `.env` file is honoured).
//!
//! # Example
//!
//! ```no_run
//! use scrapedeck::config::load_config;
//!
//! let config = load_config(None).unwrap();
//! println!("Forwarding to: {}", config.gateway.backend_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ClientConfig, Config, GatewayConfig, ServerConfig};

// Re-export parser functions
pub use parser::{apply_env, load_config, load_config_file};
pub use validation::validate;
