//! Configuration loader for memory-mods
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name looked up beside the executable when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "memory-mods.toml";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_engine")]
    pub engine: EngineConfig,

    #[serde(default = "default_workers")]
    pub workers: WorkerConfig,

    #[serde(default = "default_mods")]
    pub mods: ModsConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Poller, exit key and shutdown timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
    #[serde(default = "default_exit_key")]
    pub exit_key: String,
    #[serde(default = "default_exit_poll_interval_ms")]
    pub exit_poll_interval_ms: u64,
}

impl EngineConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn exit_poll_interval(&self) -> Duration {
        Duration::from_millis(self.exit_poll_interval_ms)
    }
}

/// Worker pool sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default = "default_max_blocking_threads")]
    pub max_blocking_threads: usize,
}

/// Mod discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModsConfig {
    /// Mods directory; `mods` beside the executable when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration, falling back to defaults only when the file is missing
    pub fn load_or_default(&self) -> Result<Config, ConfigError> {
        match self.load() {
            Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Directory containing the running executable, or the working directory
/// if that cannot be determined
pub fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

// Default functions for serde
fn default_engine() -> EngineConfig {
    let defaults = default_config().engine;
    EngineConfig {
        poll_interval_ms: defaults.poll_interval_ms,
        shutdown_timeout_ms: defaults.shutdown_timeout_ms,
        exit_key: defaults.exit_key,
        exit_poll_interval_ms: defaults.exit_poll_interval_ms,
    }
}

fn default_workers() -> WorkerConfig {
    let defaults = default_config().workers;
    WorkerConfig {
        threads: defaults.threads,
        max_blocking_threads: defaults.max_blocking_threads,
    }
}

fn default_mods() -> ModsConfig {
    ModsConfig {
        directory: None,
        extension: default_config().mods.extension,
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_config().logging.level,
    }
}

// Individual field defaults
fn default_poll_interval_ms() -> u64 {
    default_config().engine.poll_interval_ms
}

fn default_shutdown_timeout_ms() -> u64 {
    default_config().engine.shutdown_timeout_ms
}

fn default_exit_key() -> String {
    default_config().engine.exit_key
}

fn default_exit_poll_interval_ms() -> u64 {
    default_config().engine.exit_poll_interval_ms
}

fn default_threads() -> usize {
    default_config().workers.threads
}

fn default_max_blocking_threads() -> usize {
    default_config().workers.max_blocking_threads
}

fn default_extension() -> String {
    default_config().mods.extension
}

fn default_log_level() -> String {
    default_config().logging.level
}

impl Default for Config {
    fn default() -> Self {
        Config {
            engine: default_engine(),
            workers: default_workers(),
            mods: default_mods(),
            logging: default_logging(),
        }
    }
}
