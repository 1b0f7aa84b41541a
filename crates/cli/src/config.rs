// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is read from a TOML file with four sections:
//! - `[relay]`: HTTP and WebSocket base URLs of the relay backend
//! - `[inventory]`: HTTP and WebSocket base URLs of the inventory backend
//! - `[reconnect]`: backoff policy for the relay channel
//! - `[http]`: per-request timeout for upload and inventory calls
//!
//! Every field has a default, so an empty or partial file is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::relay::ReconnectPolicy;

const CONFIG_DIR_NAME: &str = "portal";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Relay backend endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Base URL for `POST /connect` and `POST /upload`.
    #[serde(default = "default_relay_api_url")]
    pub api_url: String,
    /// Base URL for the session channel (`{ws_url}/ws/{session_id}`).
    #[serde(default = "default_relay_ws_url")]
    pub ws_url: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            api_url: default_relay_api_url(),
            ws_url: default_relay_ws_url(),
        }
    }
}

/// Inventory backend endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Base URL for `/api/tree`, `/files/{name}` and `/api/save-file`.
    #[serde(default = "default_inventory_api_url")]
    pub api_url: String,
    /// Base URL for the new-file push channel (`{ws_url}/ws`).
    #[serde(default = "default_inventory_ws_url")]
    pub ws_url: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        InventoryConfig {
            api_url: default_inventory_api_url(),
            ws_url: default_inventory_ws_url(),
        }
    }
}

/// Reconnect backoff for the relay channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Consecutive failed attempts before giving up (0 = unlimited).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Factor applied to the delay after each failed attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Upper bound on the delay, in seconds.
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    /// Uptime, in seconds, after which a dropped channel no longer counts
    /// toward `max_attempts`.
    #[serde(default = "default_stable_after_secs")]
    pub stable_after_secs: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        ReconnectConfig {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_secs: default_max_delay_secs(),
            stable_after_secs: default_stable_after_secs(),
        }
    }
}

impl ReconnectConfig {
    /// The backoff policy described by this section.
    pub fn policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
            max_delay: Duration::from_secs(self.max_delay_secs),
            stable_after: Duration::from_secs(self.stable_after_secs),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout for a single upload or inventory request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_relay_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_relay_ws_url() -> String {
    "ws://localhost:8000".to_string()
}

fn default_inventory_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_inventory_ws_url() -> String {
    "ws://localhost:8080".to_string()
}

fn default_max_attempts() -> u32 {
    10
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_delay_secs() -> u64 {
    30
}

fn default_stable_after_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Loads and validates configuration from the given file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolves the configuration to use.
    ///
    /// An explicit path must exist. Otherwise the user config file is used if
    /// present, falling back to built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Checks URL schemes and backoff parameters.
    pub fn validate(&self) -> Result<()> {
        check_scheme("relay.api_url", &self.relay.api_url, &["http://", "https://"])?;
        check_scheme("relay.ws_url", &self.relay.ws_url, &["ws://", "wss://"])?;
        check_scheme(
            "inventory.api_url",
            &self.inventory.api_url,
            &["http://", "https://"],
        )?;
        check_scheme("inventory.ws_url", &self.inventory.ws_url, &["ws://", "wss://"])?;

        if self.reconnect.initial_delay_ms == 0 {
            return Err(Error::Config(
                "reconnect.initial_delay_ms must be greater than 0".to_string(),
            ));
        }
        let multiplier = self.reconnect.backoff_multiplier;
        if multiplier.is_nan() || multiplier < 1.0 {
            return Err(Error::Config(format!(
                "reconnect.backoff_multiplier must be at least 1.0 (got {})",
                multiplier
            )));
        }
        if self.http.request_timeout_secs == 0 {
            return Err(Error::Config(
                "http.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_scheme(field: &str, url: &str, schemes: &[&str]) -> Result<()> {
    if schemes.iter().any(|s| url.starts_with(s)) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "invalid {} '{}': must start with {}",
            field,
            url,
            schemes.join(" or ")
        )))
    }
}

/// Location of the user config file (`$XDG_CONFIG_HOME/portal/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
