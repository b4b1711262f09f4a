//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Vehicle link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    /// MAVLink connection string (udpin/udpout/udpbcast/tcpin/tcpout/serial)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// How long the startup handshake may wait for a heartbeat
    #[serde(default = "default_handshake_timeout_s")]
    pub handshake_timeout_s: u64,
}

/// Rolling history configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

/// Render scheduler configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_render_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_render_start_active")]
    pub start_active: bool,
}

/// Sample log configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_path")]
    pub path: String,
}

// Default value functions
fn default_endpoint() -> String { crate::link::DEFAULT_ENDPOINT.to_string() }
fn default_handshake_timeout_s() -> u64 { 30 }

fn default_history_capacity() -> usize { crate::telemetry::DEFAULT_HISTORY_CAPACITY }

fn default_render_interval_ms() -> u64 { crate::render::DEFAULT_RENDER_INTERVAL_MS }
fn default_render_start_active() -> bool { true }

fn default_log_path() -> String { "log.csv".to_string() }

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            handshake_timeout_s: default_handshake_timeout_s(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_render_interval_ms(),
            start_active: default_render_start_active(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
        }
    }
}

/// Endpoint prefixes the `mavlink` crate understands
const ENDPOINT_PREFIXES: &[&str] = &[
    "udpin:", "udpout:", "udpbcast:", "tcpin:", "tcpout:", "serial:", "file:",
];

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, TOML parsing fails or
    /// validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.link.endpoint.is_empty() {
            return Err(crate::error::HoverConsoleError::Config(
                toml::de::Error::custom("link endpoint cannot be empty"),
            ));
        }

        if !ENDPOINT_PREFIXES
            .iter()
            .any(|prefix| self.link.endpoint.starts_with(prefix))
        {
            return Err(crate::error::HoverConsoleError::Config(
                toml::de::Error::custom(format!(
                    "link endpoint must start with one of {:?}, got {:?}",
                    ENDPOINT_PREFIXES, self.link.endpoint
                )),
            ));
        }

        if self.link.handshake_timeout_s == 0 || self.link.handshake_timeout_s > 600 {
            return Err(crate::error::HoverConsoleError::Config(
                toml::de::Error::custom("handshake_timeout_s must be between 1 and 600"),
            ));
        }

        if self.history.capacity == 0 || self.history.capacity > 100_000 {
            return Err(crate::error::HoverConsoleError::Config(
                toml::de::Error::custom("history capacity must be between 1 and 100000"),
            ));
        }

        if self.render.interval_ms == 0 || self.render.interval_ms > 60_000 {
            return Err(crate::error::HoverConsoleError::Config(
                toml::de::Error::custom("render interval_ms must be between 1 and 60000"),
            ));
        }

        if self.log.path.is_empty() {
            return Err(crate::error::HoverConsoleError::Config(
                toml::de::Error::custom("log path cannot be empty"),
            ));
        }

        Ok(())
    }
}
