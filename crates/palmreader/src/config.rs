//! Configuration management for palmreader.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "palmreader";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "PALMREADER_";

/// Hosted palm line segmentation model.
pub const DEFAULT_ENDPOINT: &str = "https://detect.roboflow.com/palm-line-segmentation/1";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PALMREADER_`, sections split on `__`)
/// 2. TOML config file at `~/.config/palmreader/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Hosted detector configuration.
    pub detection: DetectionConfig,
    /// Overlay animation configuration.
    pub overlay: OverlayConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Maximum request body size in bytes.
    pub body_limit_bytes: usize,
    /// Origins allowed by CORS. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

/// Hosted detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Use the hosted detector. When off, every reading uses demo data.
    pub enabled: bool,
    /// Inference endpoint URL.
    pub endpoint: String,
    /// API key sent as the `api_key` query parameter.
    pub api_key: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Replace failed or empty detections with demo data.
    pub demo_fallback: bool,
}

/// Overlay animation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Delay between revealing consecutive overlay elements, in milliseconds.
    pub reveal_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            body_limit_bytes: 10 * 1024 * 1024,
            allowed_origins: Vec::new(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            timeout_ms: 10_000,
            demo_fallback: true,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            reveal_interval_ms: 800,
        }
    }
}

impl DetectionConfig {
    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Whether the hosted detector can actually be called.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.api_key.is_empty()
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        if self.server.body_limit_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "server.body_limit_bytes must be greater than 0".to_string(),
            });
        }

        if self.bind_address().is_err() {
            return Err(Error::ConfigValidation {
                message: format!("server.host is not an IP address: {}", self.server.host),
            });
        }

        if self.detection.timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "detection.timeout_ms must be greater than 0".to_string(),
            });
        }

        let endpoint = &self.detection.endpoint;
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(Error::ConfigValidation {
                message: format!("detection.endpoint must be an http(s) URL: {endpoint}"),
            });
        }

        if self.overlay.reveal_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "overlay.reveal_interval_ms must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Socket address the server binds to.
    ///
    /// # Errors
    ///
    /// Returns an error if `server.host` is not an IP address.
    pub fn bind_address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| Error::ConfigValidation {
                message: format!("invalid bind address: {e}"),
            })
    }

    /// Get the overlay reveal interval as a Duration.
    #[must_use]
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.overlay.reveal_interval_ms)
    }

    /// A copy safe to print: the API key is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.detection.api_key.is_empty() {
            config.detection.api_key = "********".to_string();
        }
        config
    }
}
