//! Client configuration.
//!
//! Resolved once when the mobile host opens the client and then passed
//! into the HTTP backend and the resolver. Nothing reads the environment
//! after startup.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const ENV_API_URL: &str = "CITAS_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "CITAS_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "CITAS_CONNECT_TIMEOUT_SECS";
pub const ENV_RESOLVE_CONCURRENCY: &str = "CITAS_RESOLVE_CONCURRENCY";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RESOLVE_CONCURRENCY: usize = 1;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing setting: {0}")]
    Missing(&'static str),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for talking to the clinic backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Backend root, e.g. "https://api.clinica.example/v1"
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Doctors probed concurrently during specialty resolution
    #[serde(default = "default_resolve_concurrency")]
    pub resolve_concurrency: usize,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_resolve_concurrency() -> usize {
    DEFAULT_RESOLVE_CONCURRENCY
}

impl ClientConfig {
    /// Create a validated config with default timeouts.
    pub fn new(base_url: &str) -> ConfigResult<Self> {
        let config = Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            resolve_concurrency: DEFAULT_RESOLVE_CONCURRENCY,
        };
        config.validate()?;
        Ok(config)
    }

    /// Read `CITAS_*` variables, loading a `.env` file first if present.
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any key lookup (environment, host-provided map).
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_API_URL).ok_or(ConfigError::Missing(ENV_API_URL))?;
        let mut config = Self::new(&base_url)?;

        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = parse_value(ENV_TIMEOUT_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_CONNECT_TIMEOUT_SECS) {
            config.connect_timeout_secs = parse_value(ENV_CONNECT_TIMEOUT_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_RESOLVE_CONCURRENCY) {
            config.resolve_concurrency = parse_value(ENV_RESOLVE_CONCURRENCY, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file bundled with the app.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: ClientConfig = serde_json::from_str(&content)?;
        config.base_url = config.base_url.trim().trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    /// Check URL scheme and numeric ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", self.base_url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "URL must use http or https scheme, got: {}",
                parsed.scheme()
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: ENV_TIMEOUT_SECS,
                value: "0".into(),
            });
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: ENV_CONNECT_TIMEOUT_SECS,
                value: "0".into(),
            });
        }
        if self.resolve_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                name: ENV_RESOLVE_CONCURRENCY,
                value: "0".into(),
            });
        }
        Ok(())
    }

    pub fn base_url(&self) -> ConfigResult<Url> {
        Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn parse_value<T: std::str::FromStr>(name: &'static str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}
