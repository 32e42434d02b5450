//! Configuration module for memory-mods
//!
//! Provides configuration loading, validation, and default settings
//! for the mod engine.

mod defaults;
mod loader;
mod validator;

pub use defaults::{default_config, ConfigDefaults};
pub use loader::{
    executable_dir, ConfigLoader, EngineConfig, LoggingConfig, ModsConfig, WorkerConfig,
    DEFAULT_CONFIG_FILE,
};
pub use validator::{validate_config, ConfigValidator};

// Re-export the main configuration structure
pub use loader::Config;

// Configuration-related error type
pub use loader::ConfigError;

// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;
