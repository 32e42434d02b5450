//! Key to callback bindings
//!
//! Registration swaps in a new immutable binding list; the poller works from
//! whichever list was current at the start of its tick. Registration can
//! therefore happen from any thread at any time without blocking a tick in
//! progress, and takes effect on the next tick.

use super::keys::VirtualKey;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A closure run on every press edge of its key
pub type HotkeyCallback = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// A callback together with the name of whoever registered it
#[derive(Clone)]
pub struct BoundCallback {
    pub owner: Arc<str>,
    pub callback: HotkeyCallback,
}

impl fmt::Debug for BoundCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundCallback")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// All callbacks for one key, in registration order
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: VirtualKey,
    pub callbacks: Vec<BoundCallback>,
}

/// Immutable view of every binding, keys in first-registration order
pub type BindingSnapshot = Arc<Vec<KeyBinding>>;

#[derive(Default)]
pub struct CallbackRegistry {
    bindings: RwLock<BindingSnapshot>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `callback` to the key called `key_name`.
    ///
    /// Unknown key names are logged and ignored; `None` is returned.
    pub fn register(
        &self,
        key_name: &str,
        owner: &str,
        callback: HotkeyCallback,
    ) -> Option<VirtualKey> {
        match VirtualKey::parse(key_name) {
            Some(key) => {
                self.register_key(key, owner, callback);
                Some(key)
            }
            None => {
                warn!(owner, "Ignoring hotkey for unknown key '{}'", key_name);
                None
            }
        }
    }

    /// Bind `callback` to `key`, creating the binding on first use
    pub fn register_key(&self, key: VirtualKey, owner: &str, callback: HotkeyCallback) {
        let bound = BoundCallback {
            owner: Arc::from(owner),
            callback,
        };

        let mut current = self.bindings.write();
        let mut next: Vec<KeyBinding> = current.as_ref().clone();
        match next.iter_mut().find(|b| b.key == key) {
            Some(binding) => binding.callbacks.push(bound),
            None => next.push(KeyBinding {
                key,
                callbacks: vec![bound],
            }),
        }
        *current = Arc::new(next);

        debug!(owner, key = %key, "hotkey registered");
    }

    /// The binding list as of now
    pub fn snapshot(&self) -> BindingSnapshot {
        self.bindings.read().clone()
    }

    /// Number of distinct keys bound
    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of callbacks bound to `key`
    pub fn callback_count(&self, key: VirtualKey) -> usize {
        self.bindings
            .read()
            .iter()
            .find(|b| b.key == key)
            .map_or(0, |b| b.callbacks.len())
    }
}
