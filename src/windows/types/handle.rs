//! Safe HANDLE wrapper with automatic cleanup

use crate::windows::bindings::kernel32;
use winapi::um::winnt::HANDLE;

/// Safe wrapper around Windows HANDLE with RAII semantics
pub struct Handle {
    handle: HANDLE,
}

impl Handle {
    /// Create a new Handle wrapper
    pub fn new(handle: HANDLE) -> Self {
        Handle { handle }
    }

    /// Get the raw handle
    pub fn raw(&self) -> HANDLE {
        self.handle
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe {
                if let Err(e) = kernel32::close_handle(self.handle) {
                    tracing::warn!("{}", e);
                }
            }
        }
    }
}

// HANDLEs are process-local kernel object references
unsafe impl Send for Handle {}
unsafe impl Sync for Handle {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_raw_returns_wrapped_handle() {
        let handle = Handle::new(ptr::null_mut());
        assert_eq!(handle.raw(), ptr::null_mut());
    }

    #[test]
    fn test_handle_drop_null() {
        {
            let _handle = Handle::new(ptr::null_mut());
        }
    }
}
