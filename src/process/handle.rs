//! Owned process handle with RAII semantics

use super::backend::ProcessMemory;
use crate::core::types::{Address, AttachError, MemoryResult, ProcessId};
use std::fmt;

#[cfg(target_os = "linux")]
use crate::linux::ProcMem;
#[cfg(windows)]
use crate::windows::{kernel32, Handle};

/// Platform handle to another process, opened with read and write access
pub struct ProcessHandle {
    pid: ProcessId,
    #[cfg(windows)]
    handle: Handle,
    #[cfg(target_os = "linux")]
    mem: ProcMem,
}

impl ProcessHandle {
    /// Open a process with all access rights
    #[cfg(windows)]
    pub fn open_all_access(pid: ProcessId) -> Result<Self, AttachError> {
        let raw = kernel32::open_process_all_access(pid)?;
        Ok(ProcessHandle {
            pid,
            handle: Handle::new(raw),
        })
    }

    /// Open a process with all access rights
    #[cfg(target_os = "linux")]
    pub fn open_all_access(pid: ProcessId) -> Result<Self, AttachError> {
        Ok(ProcessHandle {
            pid,
            mem: ProcMem::open(pid)?,
        })
    }

    /// Open a process with all access rights
    #[cfg(not(any(windows, target_os = "linux")))]
    pub fn open_all_access(pid: ProcessId) -> Result<Self, AttachError> {
        Err(AttachError::handle_open_failed(
            pid,
            "process memory access is not supported on this platform",
        ))
    }

    /// Get the process ID
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    #[cfg(windows)]
    fn read_raw(&self, address: u64, buffer: &mut [u8]) -> MemoryResult<usize> {
        unsafe { kernel32::read_process_memory(self.handle.raw(), address, buffer) }
    }

    #[cfg(windows)]
    fn write_raw(&self, address: u64, data: &[u8]) -> MemoryResult<usize> {
        unsafe { kernel32::write_process_memory(self.handle.raw(), address, data) }
    }

    #[cfg(target_os = "linux")]
    fn read_raw(&self, address: u64, buffer: &mut [u8]) -> MemoryResult<usize> {
        self.mem.read(address, buffer)
    }

    #[cfg(target_os = "linux")]
    fn write_raw(&self, address: u64, data: &[u8]) -> MemoryResult<usize> {
        self.mem.write(address, data)
    }

    #[cfg(not(any(windows, target_os = "linux")))]
    fn read_raw(&self, _address: u64, _buffer: &mut [u8]) -> MemoryResult<usize> {
        Err(crate::core::types::MemoryError::UnsupportedOperation(
            "read".to_string(),
        ))
    }

    #[cfg(not(any(windows, target_os = "linux")))]
    fn write_raw(&self, _address: u64, _data: &[u8]) -> MemoryResult<usize> {
        Err(crate::core::types::MemoryError::UnsupportedOperation(
            "write".to_string(),
        ))
    }
}

impl ProcessMemory for ProcessHandle {
    fn pid(&self) -> ProcessId {
        self.pid
    }

    fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
        self.read_raw(address.as_u64(), buffer)
    }

    fn write(&self, address: Address, data: &[u8]) -> MemoryResult<usize> {
        self.write_raw(address.as_u64(), data)
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .finish()
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcessHandle(pid={})", self.pid)
    }
}
