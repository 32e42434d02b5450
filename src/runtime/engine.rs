//! Wires the components together and owns their lifecycle

use super::console::{install_ctrlc_handler, ExitWatcher};
use super::pool::{Dispatch, WorkerPool};
use super::shutdown::ShutdownSignal;
use crate::config::{default_config, executable_dir, validate_config, Config};
use crate::input::{
    CallbackRegistry, KeyStatePoller, KeyStateSource, PollerHandle, SystemKeyboard, VirtualKey,
};
use crate::process::{ProcessAccessor, ProcessBackend, SystemProcessBackend};
use crate::scripting::{ModLoader, ScriptBindings, ScriptHost};
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of `ModEngine::shutdown`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShutdownSummary {
    /// The poller thread stopped within the timeout
    pub poller_joined: bool,
    /// Jobs still running when the pool gave up waiting
    pub abandoned_jobs: usize,
}

/// The mod engine: attachment, hotkeys, worker pool and loaded mods
pub struct ModEngine {
    config: Config,
    shutdown: Arc<ShutdownSignal>,
    process: Arc<ProcessAccessor>,
    registry: Arc<CallbackRegistry>,
    keyboard: Arc<dyn KeyStateSource>,
    pool: Arc<WorkerPool>,
    host: ScriptHost,
    loader: ModLoader,
    poller: Option<PollerHandle>,
    stopped: bool,
}

impl ModEngine {
    /// Build an engine against the real OS process list and keyboard
    pub fn new(config: Config) -> Result<Self> {
        Self::with_backends(
            config,
            Arc::new(SystemProcessBackend::new()),
            Arc::new(SystemKeyboard::new()),
        )
    }

    /// Build an engine over explicit process and keyboard backends
    pub fn with_backends(
        config: Config,
        backend: Arc<dyn ProcessBackend>,
        keyboard: Arc<dyn KeyStateSource>,
    ) -> Result<Self> {
        validate_config(&config)?;

        let pool = WorkerPool::new(config.workers.threads, config.workers.max_blocking_threads)
            .context("failed to start worker pool")?;

        let shutdown = Arc::new(ShutdownSignal::new());
        let process = Arc::new(ProcessAccessor::new(backend));
        let registry = Arc::new(CallbackRegistry::new());
        let bindings = Arc::new(ScriptBindings::new(
            Arc::clone(&process),
            Arc::clone(&registry),
            Arc::clone(&shutdown),
        ));
        let loader = ModLoader::new(mods_directory(&config), config.mods.extension.clone());

        Ok(ModEngine {
            config,
            shutdown,
            process,
            registry,
            keyboard,
            pool: Arc::new(pool),
            host: ScriptHost::new(bindings),
            loader,
            poller: None,
            stopped: false,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bindings(&self) -> &Arc<ScriptBindings> {
        self.host.bindings()
    }

    pub fn host(&self) -> &ScriptHost {
        &self.host
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    pub fn shutdown_signal(&self) -> &Arc<ShutdownSignal> {
        &self.shutdown
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    pub fn mods_directory(&self) -> &std::path::Path {
        self.loader.directory()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(PollerHandle::is_running)
    }

    /// Start the key poller and submit every mod for loading.
    ///
    /// Returns the number of mods submitted. Mods load in the background;
    /// this does not wait for them.
    pub fn start(&mut self) -> Result<usize> {
        if self.poller.is_none() {
            let dispatcher: Arc<dyn Dispatch> = self.pool.clone();
            let poller = KeyStatePoller::spawn(
                Arc::clone(&self.registry),
                Arc::clone(&self.keyboard),
                dispatcher,
                self.config.engine.poll_interval(),
            )
            .context("failed to start key poller")?;
            self.poller = Some(poller);
        }

        Ok(self.loader.load_all(&self.host, self.pool.as_ref()))
    }

    /// Start, block until the exit key or Ctrl+C, then shut down
    pub fn run(&mut self) -> Result<ShutdownSummary> {
        let exit_key = VirtualKey::parse(&self.config.engine.exit_key)
            .ok_or_else(|| anyhow!("unknown exit key '{}'", self.config.engine.exit_key))?;

        if let Err(e) = install_ctrlc_handler(Arc::clone(&self.shutdown)) {
            warn!("Cannot install Ctrl+C handler: {}", e);
        }

        self.start()?;
        info!("Running. Press {} to exit.", exit_key);

        ExitWatcher::new(exit_key, self.config.engine.exit_poll_interval()).run(&self.shutdown);
        Ok(self.shutdown())
    }

    /// Stop polling, detach, and wait a bounded time for in-flight jobs.
    ///
    /// Safe to call more than once; later calls do nothing.
    pub fn shutdown(&mut self) -> ShutdownSummary {
        if self.stopped {
            return ShutdownSummary {
                poller_joined: true,
                abandoned_jobs: 0,
            };
        }
        self.stopped = true;

        info!("Shutting down");
        self.shutdown.trigger();

        let timeout = self.config.engine.shutdown_timeout();
        let poller_joined = match self.poller.as_mut() {
            Some(poller) => poller.shutdown(timeout),
            None => true,
        };
        self.poller = None;

        self.process.detach();
        let abandoned_jobs = self.pool.shutdown(timeout);

        ShutdownSummary {
            poller_joined,
            abandoned_jobs,
        }
    }
}

impl Drop for ModEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The configured mods directory, or `mods` beside the executable
pub fn mods_directory(config: &Config) -> PathBuf {
    config
        .mods
        .directory
        .clone()
        .unwrap_or_else(|| executable_dir().join(default_config().mods.directory_name))
}
