//! Client configuration.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Environment variable that overrides the configured server URL.
pub const SERVER_URL_ENV: &str = "STRICTLY_ULTIMATE_SERVER_URL";

/// Configuration for the game client.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the game server.
    #[serde(default = "default_server_url")]
    server_url: String,

    /// Deadline for every server request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,

    /// Interval between liveness pings, in seconds.
    #[serde(default = "default_ping_interval_secs")]
    ping_interval_secs: u64,

    /// File the terminal client writes its log to.
    #[serde(default = "default_log_file")]
    log_file: String,
}

#[instrument]
fn default_server_url() -> String {
    "http://localhost:5000".to_string()
}

#[instrument]
fn default_request_timeout_secs() -> u64 {
    10
}

#[instrument]
fn default_ping_interval_secs() -> u64 {
    10
}

#[instrument]
fn default_log_file() -> String {
    "strictly_ultimate.log".to_string()
}

impl ClientConfig {
    /// Creates a configuration for the given server with default timings.
    #[instrument(skip(server_url), fields(server_url = %server_url))]
    pub fn new(server_url: String) -> Self {
        Self {
            server_url,
            request_timeout_secs: default_request_timeout_secs(),
            ping_interval_secs: default_ping_interval_secs(),
            log_file: default_log_file(),
        }
    }

    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        if config.request_timeout_secs == 0 || config.ping_interval_secs == 0 {
            return Err(ConfigError::new(
                "request_timeout_secs and ping_interval_secs must be positive".to_string(),
            ));
        }

        info!(server_url = %config.server_url, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file if it exists, otherwise starts from defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies the environment override, then an explicit URL, in that order.
    #[instrument(skip(self))]
    pub fn with_overrides(mut self, server_url: Option<String>) -> Self {
        if let Ok(url) = std::env::var(SERVER_URL_ENV)
            && !url.trim().is_empty()
        {
            debug!(url = %url, "Server URL from environment");
            self.server_url = url;
        }
        if let Some(url) = server_url {
            self.server_url = url;
        }
        self.server_url = self.server_url.trim_end_matches('/').to_string();
        self
    }

    /// Request deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Liveness ping period.
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(default_server_url())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
