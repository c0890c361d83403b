//! Configuration for mutant-scan.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ScanResult;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "mutant-scan.toml";

/// Data directory created by `init`.
pub const DATA_DIR: &str = ".mutant-scan";

/// Main configuration for mutant-scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Record store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Available record store backends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local map, lost on exit.
    Memory,
    /// SQLite file at `db_path`.
    Sqlite,
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend to use.
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// SQLite database path.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            db_path: default_db_path(),
        }
    }
}

fn default_backend() -> StoreBackend {
    if cfg!(feature = "sqlite") {
        StoreBackend::Sqlite
    } else {
        StoreBackend::Memory
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DATA_DIR).join("mutant-scan.db")
}

/// Analysis cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// In-process hot layer in front of the store.
    #[serde(default = "default_true")]
    pub hot_enabled: bool,

    /// Hot layer capacity (number of verdicts). 0 disables it.
    #[serde(default = "default_hot_capacity")]
    pub hot_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            hot_enabled: true,
            hot_capacity: default_hot_capacity(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_hot_capacity() -> usize {
    1000
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> ScanResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ScanResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            store: StoreConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
