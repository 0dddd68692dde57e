//! Configuration loading and management.
//!
//! Split into logical submodules:
//! - [`limits`]: social-graph and command-surface limits
//! - [`defaults`]: serde default value functions, including the
//!   stock permission-group table
//!
//! The `[groups]` table is the live authorization configuration: it
//! maps a permission-group name to its required 8-bit mask. Removing a
//! group (or zeroing its mask) deactivates every command in it without
//! a recompile.

mod defaults;
mod limits;

pub use limits::LimitsConfig;

use crate::command::CommandGroups;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Permission-group name -> required bitmask (1..=255).
    #[serde(default = "defaults::default_groups")]
    pub groups: HashMap<String, u8>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Sanity-check values that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.name.is_empty() {
            return Err(ConfigError::Invalid("server.name must not be empty".into()));
        }
        if self.limits.max_friends == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_friends must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Snapshot of the authorization gate for the dispatcher.
    pub fn command_groups(&self) -> CommandGroups {
        CommandGroups::new(self.groups.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            limits: LimitsConfig::default(),
            groups: defaults::default_groups(),
        }
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server display name.
    #[serde(default = "defaults::default_server_name")]
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: defaults::default_server_name(),
        }
    }
}
