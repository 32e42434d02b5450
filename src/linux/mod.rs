//! Linux process memory access through procfs
//!
//! `/proc/<pid>/mem` exposes the target's address space as a file; positional
//! reads and writes at an offset equal to the virtual address perform the
//! cross-process copy. Access is subject to ptrace permission checks.

use crate::core::types::{AttachError, MemoryError, MemoryResult};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::PathBuf;

/// An open `/proc/<pid>/mem` file
#[derive(Debug)]
pub struct ProcMem {
    file: File,
}

impl ProcMem {
    /// Opens the memory file of `pid` for reading and writing
    pub fn open(pid: u32) -> Result<Self, AttachError> {
        let path = mem_path(pid);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| {
                AttachError::handle_open_failed(pid, format!("{}: {}", path.display(), e))
            })?;
        Ok(ProcMem { file })
    }

    pub fn read(&self, address: u64, buffer: &mut [u8]) -> MemoryResult<usize> {
        self.file
            .read_at(buffer, address)
            .map_err(|e| MemoryError::read_failed(format!("0x{:X}", address), e.to_string()))
    }

    pub fn write(&self, address: u64, data: &[u8]) -> MemoryResult<usize> {
        self.file
            .write_at(data, address)
            .map_err(|e| MemoryError::write_failed(format!("0x{:X}", address), e.to_string()))
    }
}

fn mem_path(pid: u32) -> PathBuf {
    PathBuf::from(format!("/proc/{}/mem", pid))
}
