//! Core type definitions
//!
//! This module contains the address wrapper, process descriptions and the
//! error types used throughout the crate.

mod address;
mod error;
mod process_info;

pub use address::Address;
pub use error::{AttachError, MemoryError, MemoryResult, ScriptError};
pub use process_info::{strip_executable_suffix, ProcessInfo};

// Common type aliases
pub type ProcessId = u32;
