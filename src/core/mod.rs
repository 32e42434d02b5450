//! Core module containing fundamental types shared by every subsystem
//!
//! Addresses, process descriptions and the error taxonomy live here so the
//! process, memory, input and scripting layers agree on one vocabulary.

pub mod types;

pub use types::{
    Address, AttachError, MemoryError, MemoryResult, ProcessId, ProcessInfo, ScriptError,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
