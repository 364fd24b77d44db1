//! Configuration file support for the CLI.
//!
//! Loads CLI configuration from TOML files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quarry_common::ClientConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default output format of `render`.
    #[serde(default = "default_format")]
    pub output_format: String,

    /// Client settings shared with library users.
    #[serde(default)]
    pub client: ClientConfig,
}

fn default_format() -> String {
    "table".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output_format: default_format(),
            client: ClientConfig::default(),
        }
    }
}

impl CliConfig {
    /// Reads and validates a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.client.validate()?;
        Ok(config)
    }

    /// Loads `<config dir>/quarry/config.toml`, or defaults when absent.
    pub fn load_default() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/quarry/config.toml`, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("quarry").join("config.toml"))
    }
}
