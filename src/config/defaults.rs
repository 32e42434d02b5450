//! Default configuration values for memory-mods

use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub engine: EngineDefaults,
    pub workers: WorkerDefaults,
    pub mods: ModDefaults,
    pub logging: LoggingDefaults,
}

/// Default engine timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineDefaults {
    pub poll_interval_ms: u64,
    pub shutdown_timeout_ms: u64,
    pub exit_key: String,
    pub exit_poll_interval_ms: u64,
}

/// Default worker pool sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerDefaults {
    pub threads: usize,
    pub max_blocking_threads: usize,
}

/// Default mod discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModDefaults {
    pub directory_name: String,
    pub extension: String,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        engine: EngineDefaults {
            poll_interval_ms: 10,
            shutdown_timeout_ms: 1000,
            exit_key: "escape".to_string(),
            exit_poll_interval_ms: 100,
        },
        workers: WorkerDefaults {
            threads: num_cpus::get().min(8),
            max_blocking_threads: 64,
        },
        mods: ModDefaults {
            directory_name: "mods".to_string(),
            extension: "rhai".to_string(),
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
        },
    }
}
