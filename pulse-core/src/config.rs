//! Application configuration.
//!
//! Locates the two storage backends and names the OHLCV symbols the context
//! loader tracks. Thresholds and series key layouts are fixed constants in
//! their owning modules, not configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Top-level configuration, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct PulseConfig {
    /// Root directory of the object store.
    pub data_dir: PathBuf,

    /// Path to the freshness registry JSON file.
    pub registry_path: PathBuf,

    /// Benchmark equity index symbol.
    #[serde(default = "default_benchmark_symbol")]
    pub benchmark_symbol: String,

    /// Dollar-strength proxy symbol.
    #[serde(default = "default_dollar_symbol")]
    pub dollar_symbol: String,
}

fn default_benchmark_symbol() -> String {
    "SPY".to_string()
}

fn default_dollar_symbol() -> String {
    "UUP".to_string()
}

impl PulseConfig {
    /// Load and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }
}
