//! Kernel32.dll bindings for process and memory operations

use crate::core::types::{AttachError, MemoryError, MemoryResult};
use winapi::shared::minwindef::{FALSE, LPCVOID, LPVOID};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{ReadProcessMemory, WriteProcessMemory};
use winapi::um::processthreadsapi::OpenProcess;
use winapi::um::winnt::{HANDLE, PROCESS_ALL_ACCESS};

/// Safe wrapper for OpenProcess with full access rights
pub fn open_process_all_access(pid: u32) -> Result<HANDLE, AttachError> {
    unsafe {
        let handle = OpenProcess(PROCESS_ALL_ACCESS, FALSE, pid);
        if handle.is_null() {
            Err(AttachError::handle_open_failed(
                pid,
                format!("OpenProcess failed (error {})", GetLastError()),
            ))
        } else {
            Ok(handle)
        }
    }
}

/// Safe wrapper for CloseHandle
///
/// # Safety
/// The handle must be a valid Windows handle
pub unsafe fn close_handle(handle: HANDLE) -> MemoryResult<()> {
    if handle.is_null() {
        return Ok(());
    }

    if CloseHandle(handle) == FALSE {
        Err(MemoryError::UnsupportedOperation(format!(
            "CloseHandle failed (error {})",
            GetLastError()
        )))
    } else {
        Ok(())
    }
}

/// Safe wrapper for ReadProcessMemory
///
/// # Safety
/// The handle must be a valid process handle with read access
pub unsafe fn read_process_memory(
    handle: HANDLE,
    address: u64,
    buffer: &mut [u8],
) -> MemoryResult<usize> {
    let mut bytes_read = 0;

    let result = ReadProcessMemory(
        handle,
        address as usize as LPCVOID,
        buffer.as_mut_ptr() as LPVOID,
        buffer.len(),
        &mut bytes_read,
    );

    if result == FALSE {
        Err(MemoryError::read_failed(
            format!("0x{:X}", address),
            format!("ReadProcessMemory failed (error {})", GetLastError()),
        ))
    } else {
        Ok(bytes_read)
    }
}

/// Safe wrapper for WriteProcessMemory
///
/// # Safety
/// The handle must be a valid process handle with write access
pub unsafe fn write_process_memory(
    handle: HANDLE,
    address: u64,
    data: &[u8],
) -> MemoryResult<usize> {
    let mut bytes_written = 0;

    let result = WriteProcessMemory(
        handle,
        address as usize as LPVOID,
        data.as_ptr() as LPCVOID,
        data.len(),
        &mut bytes_written,
    );

    if result == FALSE {
        Err(MemoryError::write_failed(
            format!("0x{:X}", address),
            format!("WriteProcessMemory failed (error {})", GetLastError()),
        ))
    } else {
        Ok(bytes_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_open_process_pid_zero_fails() {
        let result = open_process_all_access(0);
        assert!(matches!(
            result,
            Err(AttachError::HandleOpenFailed { pid: 0, .. })
        ));
    }

    #[test]
    fn test_close_null_handle() {
        let result = unsafe { close_handle(std::ptr::null_mut()) };
        assert!(result.is_ok());
    }
}
