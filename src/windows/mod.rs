//! Windows API layer for process memory and keyboard state
//!
//! All unsafe FFI calls are contained within this module.

pub mod bindings;
pub mod types;

pub use bindings::{kernel32, user32};
pub use types::Handle;
