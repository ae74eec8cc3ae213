//! Configuration module for pinctl
//!
//! Supports loading configuration from a TOML file.

use cpupin::store::{DEFAULT_DOMAINS_DIR, DEFAULT_LAYOUTS_DIR};
use cpupin::Store;
use serde::Deserialize;
use std::path::Path;

/// Tool configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// File locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where domain and layout files live
#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    /// Base directory (default: libvirt)
    #[serde(default = "default_root")]
    pub root: String,

    /// Domain documents under the root, one subdirectory per host (default: domains)
    #[serde(default = "default_domains_dir")]
    pub domains_dir: String,

    /// Layout descriptions under the root (default: layout)
    #[serde(default = "default_layouts_dir")]
    pub layouts_dir: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level filter (default: "pinctl=info,cpupin=info")
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_root() -> String {
    "libvirt".to_string()
}

fn default_domains_dir() -> String {
    DEFAULT_DOMAINS_DIR.to_string()
}

fn default_layouts_dir() -> String {
    DEFAULT_LAYOUTS_DIR.to_string()
}

fn default_log_level() -> String {
    "pinctl=info,cpupin=info".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            domains_dir: default_domains_dir(),
            layouts_dir: default_layouts_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.display().to_string(), e.to_string()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.display().to_string(), e.to_string()))
    }

    /// File store, with an optional root override
    pub fn store(&self, root: Option<&Path>) -> Store {
        match root {
            Some(root) => Store::new(root, &self.paths.domains_dir, &self.paths.layouts_dir),
            None => Store::new(
                &self.paths.root,
                &self.paths.domains_dir,
                &self.paths.layouts_dir,
            ),
        }
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    ReadError(String, String),
    ParseError(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, err) => {
                write!(f, "Failed to read config file '{}': {}", path, err)
            }
            ConfigError::ParseError(path, err) => {
                write!(f, "Failed to parse config file '{}': {}", path, err)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
