//! Error types for attachment, memory access and mod scripts

use super::ProcessId;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why an attach request failed
#[derive(Error, Debug)]
pub enum AttachError {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process {pid}: {reason}")]
    HandleOpenFailed { pid: ProcessId, reason: String },
}

impl AttachError {
    /// Creates a handle open failure
    pub fn handle_open_failed(pid: ProcessId, reason: impl Into<String>) -> Self {
        AttachError::HandleOpenFailed {
            pid,
            reason: reason.into(),
        }
    }
}

/// Error type for memory operations against the attached process
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("No process attached")]
    NotAttached,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read memory at {address}: {reason}")]
    ReadFailed { address: String, reason: String },

    #[error("Failed to write memory at {address}: {reason}")]
    WriteFailed { address: String, reason: String },

    #[error("Partial read at {address}: expected {expected} bytes, got {actual}")]
    PartialRead {
        address: String,
        expected: usize,
        actual: usize,
    },

    #[error("Partial write at {address}: expected {expected} bytes, wrote {actual}")]
    PartialWrite {
        address: String,
        expected: usize,
        actual: usize,
    },

    #[error("Pointer chain broken at level {level}: {reason}")]
    PointerChainBroken { level: usize, reason: String },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

/// Result type alias for memory operations
pub type MemoryResult<T> = Result<T, MemoryError>;

impl MemoryError {
    /// Creates a read failed error
    pub fn read_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::ReadFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a write failed error
    pub fn write_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::WriteFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a pointer chain broken error
    pub fn pointer_chain_broken(level: usize, reason: impl Into<String>) -> Self {
        MemoryError::PointerChainBroken {
            level,
            reason: reason.into(),
        }
    }

    /// Creates an invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        MemoryError::InvalidArgument(reason.into())
    }
}

/// Failures of a single mod file, isolated from every other mod
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Failed to load mod {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Mod {path} failed: {reason}")]
    Runtime { path: PathBuf, reason: String },

    #[error("Hotkey callback for {key} in {script} failed: {reason}")]
    Callback {
        key: String,
        script: String,
        reason: String,
    },
}
