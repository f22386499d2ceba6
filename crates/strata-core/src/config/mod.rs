//! Configuration management for Strata.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `strata.toml` file
//! 3. User config `~/.config/strata/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Audit engine configuration.
    pub audit: AuditConfig,

    /// Snapshot storage configuration.
    pub snapshots: SnapshotConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./strata.toml` (project local)
    /// 2. `~/.config/strata/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(PROJECT_CONFIG_FILE).exists() {
            return Self::from_file(PROJECT_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(USER_CONFIG_DIR).join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(dir) = std::env::var("STRATA_SNAPSHOT_DIR") {
            self.snapshots.storage_dir = dir;
        }
        if let Ok(max) = std::env::var("STRATA_MAX_SNAPSHOTS") {
            self.snapshots.max_snapshots = max
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("STRATA_MAX_SNAPSHOTS={max}")))?;
        }
        if let Ok(branches) = std::env::var("STRATA_MAX_CHAIN_BRANCHES") {
            self.audit.max_chain_branches = branches.parse().map_err(|_| {
                ConfigError::Invalid(format!("STRATA_MAX_CHAIN_BRANCHES={branches}"))
            })?;
        }
        if let Ok(format) = std::env::var("STRATA_OUTPUT_FORMAT") {
            self.audit.output_format = format;
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Audit engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Edge budget for each transitive-chain search (0 = unbounded).
    pub max_chain_branches: usize,

    /// Output format: "text", "markdown" or "json".
    pub output_format: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_chain_branches: DEFAULT_MAX_CHAIN_BRANCHES,
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
        }
    }
}

/// Snapshot storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Directory holding snapshot files (default: ".strata/audit-snapshots").
    pub storage_dir: String,

    /// Retention limit; older snapshots beyond it are removed on save.
    /// Zero keeps every snapshot.
    pub max_snapshots: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            storage_dir: DEFAULT_SNAPSHOT_DIR.to_string(),
            max_snapshots: DEFAULT_MAX_SNAPSHOTS,
        }
    }
}

impl SnapshotConfig {
    /// Get the snapshot storage root as a path.
    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_dir)
    }
}
