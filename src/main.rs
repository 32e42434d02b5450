use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use memory_mods::config::{executable_dir, ConfigLoader, DEFAULT_CONFIG_FILE};
use memory_mods::ModEngine;

#[derive(Parser, Debug)]
#[command(name = "memory-mods", version, about = "Run memory mods against a target process")]
struct Args {
    /// Configuration file (defaults to memory-mods.toml beside the executable)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to load mods from
    #[arg(short, long)]
    mods_dir: Option<PathBuf>,

    /// Log level, overriding the configuration file
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| executable_dir().join(DEFAULT_CONFIG_FILE));
    let mut config = ConfigLoader::new(&config_path)
        .load_or_default()
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    if let Some(dir) = args.mods_dir {
        config.mods.directory = Some(dir);
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    // RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_lowercase()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("memory-mods v{}", env!("CARGO_PKG_VERSION"));
    if !config_path.exists() {
        info!("No config at {}; using defaults", config_path.display());
    }

    let mut engine = ModEngine::new(config)?;
    info!("Mods directory: {}", engine.mods_directory().display());

    let summary = engine.run()?;
    if !summary.poller_joined {
        warn!("Key poller was abandoned at shutdown");
    }
    if summary.abandoned_jobs > 0 {
        warn!("{} job(s) were still running at exit", summary.abandoned_jobs);
    }

    info!("Stopped");
    Ok(())
}
