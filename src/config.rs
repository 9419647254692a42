//! Configuration loading and constants.
//!
//! Settings come from an optional TOML file, with the store connection string
//! and listening port taken from the environment. `AppConfig` is the root
//! configuration struct; `AppConfig::store_url` is resolved separately so a
//! missing store never gets as far as binding a socket.

use const_format::formatcp;
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// Counter values change on every increment, so API responses are never cached
pub const CACHE_CONTROL_API: &str = "no-store";

// =============================================================================
// Environment
// =============================================================================

/// Environment variable holding the store connection string (required)
pub const STORE_URL_ENV: &str = "COUNTER_STORE_URL";

/// Environment variable overriding `http.port`
pub const PORT_ENV: &str = "PORT";

// =============================================================================
// Store Constants
// =============================================================================

/// Capacity of the command queue feeding the in-memory store's writer task
pub const MEMORY_STORE_QUEUE_CAPACITY: usize = 64;

/// Default key under which the counter record is stored
pub const DEFAULT_STORE_KEY: &str = formatcp!("{}:counter", CRATE_NAME);

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Crate name used as the log target and key prefix
pub const CRATE_NAME: &str = "tally";

/// Default log filter when neither --log-level nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = formatcp!("{}=debug,tower_http=debug", CRATE_NAME);

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Message returned by the status endpoint
pub const STATUS_MESSAGE: &str = "Server is running";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Counter store settings
    #[serde(default)]
    pub store: StoreSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        4000
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Key holding the counter record
    #[serde(default = "StoreSettings::default_key")]
    pub key: String,
    /// Upper bound for a single store operation, in seconds
    #[serde(default = "StoreSettings::default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            key: Self::default_key(),
            timeout_seconds: Self::default_timeout(),
        }
    }
}

impl StoreSettings {
    fn default_key() -> String {
        DEFAULT_STORE_KEY.to_string()
    }

    fn default_timeout() -> u64 {
        5
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, or use defaults when no path is given.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                Ok(toml::from_str(&contents)?)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment overrides (currently only `PORT`).
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_port_override(std::env::var(PORT_ENV).ok())
    }

    fn apply_port_override(&mut self, value: Option<String>) -> Result<(), ConfigError> {
        if let Some(raw) = value {
            self.http.port = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?;
        }
        Ok(())
    }

    /// Resolve the store connection string from `COUNTER_STORE_URL`.
    pub fn store_url() -> Result<String, ConfigError> {
        resolve_store_url(std::env::var(STORE_URL_ENV).ok())
    }
}

fn resolve_store_url(value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(url) if !url.trim().is_empty() => Ok(url.trim().to_string()),
        _ => Err(ConfigError::MissingStoreUrl(STORE_URL_ENV)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0} is not set; the counter store connection string is required")]
    MissingStoreUrl(&'static str),
    #[error("Invalid port: {0:?}")]
    InvalidPort(String),
}
