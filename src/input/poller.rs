//! Background key polling with edge-triggered dispatch
//!
//! Each key is either `Released` or `Pressed`. Only the transition into
//! `Pressed` dispatches, so a held key fires once and fires again only after
//! it has been released.

use super::keys::VirtualKey;
use super::registry::{CallbackRegistry, KeyBinding};
use super::state::KeyStateSource;
use crate::runtime::pool::Dispatch;
use crate::runtime::ShutdownSignal;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Per-key edge state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    #[default]
    Released,
    Pressed,
}

impl KeyState {
    /// Next state given the current physical state, and whether this is a press edge
    pub fn advance(self, down: bool) -> (KeyState, bool) {
        match (self, down) {
            (KeyState::Released, true) => (KeyState::Pressed, true),
            (KeyState::Pressed, false) => (KeyState::Released, false),
            (state, _) => (state, false),
        }
    }
}

/// Tracks key states across ticks and dispatches on press edges
#[derive(Debug, Default)]
pub struct EdgeDetector {
    states: HashMap<VirtualKey, KeyState>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample every bound key once and dispatch the callbacks of keys that
    /// were just pressed. Returns the number of press edges seen.
    pub fn tick(
        &mut self,
        bindings: &[KeyBinding],
        source: &dyn KeyStateSource,
        dispatcher: &dyn Dispatch,
    ) -> usize {
        let mut edges = 0;

        for binding in bindings {
            let down = source.is_key_down(binding.key);
            let state = self.states.entry(binding.key).or_default();
            let (next, pressed) = state.advance(down);
            *state = next;

            if pressed {
                edges += 1;
                debug!(key = %binding.key, callbacks = binding.callbacks.len(), "key pressed");
                for bound in &binding.callbacks {
                    let callback = Arc::clone(&bound.callback);
                    let label = format!("{} hotkey {}", bound.owner, binding.key);
                    dispatcher.submit(&label, Box::new(move || callback()));
                }
            }
        }

        edges
    }

    pub fn state(&self, key: VirtualKey) -> KeyState {
        self.states.get(&key).copied().unwrap_or_default()
    }
}

/// Spawns the polling thread
pub struct KeyStatePoller;

impl KeyStatePoller {
    /// Start polling every `interval` on a dedicated thread
    pub fn spawn(
        registry: Arc<CallbackRegistry>,
        source: Arc<dyn KeyStateSource>,
        dispatcher: Arc<dyn Dispatch>,
        interval: Duration,
    ) -> io::Result<PollerHandle> {
        let stop = Arc::new(ShutdownSignal::new());
        let thread_stop = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name("key-poller".to_string())
            .spawn(move || {
                debug!(interval_ms = interval.as_millis() as u64, "Key poller started");
                let mut detector = EdgeDetector::new();
                while !thread_stop.is_shutdown() {
                    let bindings = registry.snapshot();
                    let edges = detector.tick(&bindings, source.as_ref(), dispatcher.as_ref());
                    if edges > 0 {
                        trace!(edges, "poll tick dispatched");
                    }
                    thread_stop.wait(interval);
                }
                debug!("Key poller stopped");
            })?;

        Ok(PollerHandle {
            stop,
            thread: Some(thread),
        })
    }
}

/// Owner of the running poller thread
pub struct PollerHandle {
    stop: Arc<ShutdownSignal>,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stop polling and join the thread within `timeout`.
    ///
    /// Returns `true` if the thread was joined. If it did not finish in time
    /// it is abandoned, not killed.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        self.stop.trigger();

        let Some(thread) = self.thread.take() else {
            return true;
        };

        let deadline = Instant::now() + timeout;
        while !thread.is_finished() {
            if Instant::now() >= deadline {
                warn!("Key poller did not stop within {:?}; abandoning it", timeout);
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }

        if thread.join().is_err() {
            warn!("Key poller panicked");
        }
        true
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop.trigger();
    }
}
