//! Configuration validator for memory-mods
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError, EngineConfig, LoggingConfig, ModsConfig, WorkerConfig};
use crate::input::VirtualKey;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_engine(&config.engine)?;
        Self::validate_workers(&config.workers)?;
        Self::validate_mods(&config.mods)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
        if !(1..=1000).contains(&engine.poll_interval_ms) {
            return Err(ConfigError::Invalid(
                "Poll interval must be between 1 and 1000 ms".to_string(),
            ));
        }

        if !(10..=1000).contains(&engine.exit_poll_interval_ms) {
            return Err(ConfigError::Invalid(
                "Exit poll interval must be between 10 and 1000 ms".to_string(),
            ));
        }

        if engine.shutdown_timeout_ms > 60_000 {
            return Err(ConfigError::Invalid(
                "Shutdown timeout cannot exceed 60000 ms".to_string(),
            ));
        }

        if VirtualKey::parse(&engine.exit_key).is_none() {
            return Err(ConfigError::Invalid(format!(
                "Unknown exit key: {}",
                engine.exit_key
            )));
        }

        Ok(())
    }

    fn validate_workers(workers: &WorkerConfig) -> Result<(), ConfigError> {
        if !(1..=256).contains(&workers.threads) {
            return Err(ConfigError::Invalid(
                "Worker threads must be between 1 and 256".to_string(),
            ));
        }

        if workers.max_blocking_threads == 0 {
            return Err(ConfigError::Invalid(
                "Blocking threads must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_mods(mods: &ModsConfig) -> Result<(), ConfigError> {
        if mods.extension.is_empty() || mods.extension.contains('.') {
            return Err(ConfigError::Invalid(format!(
                "Mod extension must be non-empty and without a dot: '{}'",
                mods.extension
            )));
        }

        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
