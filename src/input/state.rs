//! Physical key state sources

use super::keys::VirtualKey;

/// Answers "is this key down right now"
pub trait KeyStateSource: Send + Sync {
    fn is_key_down(&self, key: VirtualKey) -> bool;
}

/// Keyboard state from the operating system.
///
/// On Windows this samples `GetAsyncKeyState`. Other platforms have no
/// global key-state query, so every key reads as released.
#[derive(Debug)]
pub struct SystemKeyboard {
    _private: (),
}

impl SystemKeyboard {
    pub fn new() -> Self {
        #[cfg(not(windows))]
        tracing::warn!("Global key state is only available on Windows; hotkeys will never fire");
        SystemKeyboard { _private: () }
    }
}

impl Default for SystemKeyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyStateSource for SystemKeyboard {
    #[cfg(windows)]
    fn is_key_down(&self, key: VirtualKey) -> bool {
        crate::windows::user32::is_key_down(key.code())
    }

    #[cfg(not(windows))]
    fn is_key_down(&self, _key: VirtualKey) -> bool {
        false
    }
}
