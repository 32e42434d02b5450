//! Capability traits separating process access from the OS
//!
//! `ProcessAccessor` only talks to these traits, so the same attach and
//! memory logic runs against a real process or an in-memory mock.

use crate::core::types::{Address, AttachError, MemoryResult, ProcessId, ProcessInfo};

/// Locates processes and opens handles to them
pub trait ProcessBackend: Send + Sync {
    /// Finds the first process whose name matches `name` (suffix already stripped)
    fn find_process(&self, name: &str) -> Option<ProcessInfo>;

    /// Opens a read/write handle to `process`
    fn open(&self, process: &ProcessInfo) -> Result<Box<dyn ProcessMemory>, AttachError>;
}

/// An open handle to a target process; dropping it releases the OS resource
pub trait ProcessMemory: Send + Sync {
    /// The process this handle refers to
    fn pid(&self) -> ProcessId;

    /// Reads into `buffer`, returning the number of bytes copied
    fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize>;

    /// Writes `data`, returning the number of bytes copied
    fn write(&self, address: Address, data: &[u8]) -> MemoryResult<usize>;
}
