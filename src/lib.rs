//! memory-mods: scriptable process memory access and global hotkeys
//!
//! Mod scripts attach to a running process, read and write its memory through
//! raw addresses and pointer chains, and bind closures to key presses that
//! are polled in the background.

pub mod config;
pub mod core;
pub mod input;
pub mod memory;
pub mod process;
pub mod runtime;
pub mod scripting;
pub mod testing;

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(windows)]
pub mod windows;

pub use crate::config::Config;
pub use crate::core::types::{
    Address, AttachError, MemoryError, MemoryResult, ProcessId, ProcessInfo, ScriptError,
};
pub use crate::input::{CallbackRegistry, KeyStatePoller, VirtualKey};
pub use crate::memory::{MemoryAccessor, PointerResolver};
pub use crate::process::ProcessAccessor;
pub use crate::runtime::{ModEngine, ShutdownSignal, WorkerPool};
pub use crate::scripting::{ScriptBindings, ScriptHost};
