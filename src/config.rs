// src/config.rs

//! Manages process configuration: loading, defaults, and validation.

use crate::core::window::DEFAULT_WINDOW_SECS;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::warn;

/// Configuration for the plaintext status endpoint.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StatusConfig {
    /// If false, the status endpoint is not mounted. The recording layer stays in place.
    #[serde(default = "default_status_enabled")]
    pub enabled: bool,
    /// The URI prefix the endpoint answers on.
    #[serde(default = "default_status_location")]
    pub location: String,
}

fn default_status_enabled() -> bool {
    true
}
fn default_status_location() -> String {
    "/stubs_status".to_string()
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: default_status_enabled(),
            location: default_status_location(),
        }
    }
}

/// Configuration for the rate and latency window.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WindowConfig {
    /// Length of one accumulation window in seconds.
    #[serde(default = "default_window_seconds")]
    pub seconds: u64,
}

fn default_window_seconds() -> u64 {
    DEFAULT_WINDOW_SECS
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            seconds: default_window_seconds(),
        }
    }
}

/// A raw representation of the config file before validation.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    status: StatusConfig,
    #[serde(default)]
    window: WindowConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Represents the final, validated configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            status: StatusConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance by reading and parsing a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        Self::from_toml_str(&contents).with_context(|| format!("Invalid config in '{path}'"))
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let raw_config: RawConfig =
            toml::from_str(contents).context("Failed to parse TOML configuration")?;

        let config = Config {
            host: raw_config.host,
            port: raw_config.port,
            log_level: raw_config.log_level,
            status: raw_config.status,
            window: raw_config.window,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration to ensure logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("port cannot be 0"));
        }
        if self.host.trim().is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }
        if self.window.seconds == 0 {
            return Err(anyhow!("window.seconds cannot be 0"));
        }
        if self.window.seconds != DEFAULT_WINDOW_SECS {
            warn!(
                "window.seconds is {}; rates are averaged over that window instead of {}s.",
                self.window.seconds, DEFAULT_WINDOW_SECS
            );
        }

        if self.status.enabled {
            let location = &self.status.location;
            if !location.starts_with('/') {
                return Err(anyhow!("status.location must start with '/'"));
            }
            if location.len() > 1 && location.ends_with('/') {
                return Err(anyhow!(
                    "status.location cannot end with '/', such requests are passed through"
                ));
            }
        }
        Ok(())
    }
}
