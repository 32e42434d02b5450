//! Hotkeys: key names, physical key state, bindings and the poll loop

pub mod keys;
pub mod poller;
pub mod registry;
pub mod state;

pub use keys::VirtualKey;
pub use poller::{EdgeDetector, KeyState, KeyStatePoller, PollerHandle};
pub use registry::{BoundCallback, CallbackRegistry, HotkeyCallback, KeyBinding};
pub use state::{KeyStateSource, SystemKeyboard};
