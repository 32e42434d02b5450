//! Attachment lifecycle: one target process at a time
//!
//! The accessor exclusively owns the open handle. A handle is present exactly
//! while the accessor is attached; replacing or detaching drops it, which
//! closes the OS resource.

use super::backend::{ProcessBackend, ProcessMemory};
use crate::core::types::{
    strip_executable_suffix, AttachError, MemoryError, MemoryResult, ProcessId, ProcessInfo,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{error, info};

struct Attachment {
    process: ProcessInfo,
    memory: Box<dyn ProcessMemory>,
}

/// Owns the attached-process handle and hands it out for memory access
pub struct ProcessAccessor {
    backend: Arc<dyn ProcessBackend>,
    attachment: RwLock<Option<Attachment>>,
}

impl ProcessAccessor {
    /// Create an unattached accessor over `backend`
    pub fn new(backend: Arc<dyn ProcessBackend>) -> Self {
        ProcessAccessor {
            backend,
            attachment: RwLock::new(None),
        }
    }

    /// Attach to the first process named `name` (a trailing `.exe` is ignored).
    ///
    /// On success any previous target is detached. On failure the previous
    /// attachment, if any, is left untouched.
    pub fn attach(&self, name: &str) -> Result<ProcessInfo, AttachError> {
        let wanted = strip_executable_suffix(name.trim());

        let process = match self.backend.find_process(wanted) {
            Some(process) => process,
            None => {
                let err = AttachError::ProcessNotFound(wanted.to_string());
                error!("Attach failed: {}", err);
                return Err(err);
            }
        };

        let memory = self.backend.open(&process).map_err(|err| {
            error!("Attach failed: {}", err);
            err
        })?;

        let previous = self.attachment.write().replace(Attachment {
            process: process.clone(),
            memory,
        });

        if let Some(previous) = previous {
            info!("Detached from {}", previous.process);
        }
        info!("Attached to {}", process);
        Ok(process)
    }

    /// Close the handle if one is open; safe to call repeatedly
    pub fn detach(&self) {
        let previous = self.attachment.write().take();
        if let Some(previous) = previous {
            info!("Detached from {}", previous.process);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.read().is_some()
    }

    pub fn attached_pid(&self) -> Option<ProcessId> {
        self.attachment.read().as_ref().map(|a| a.memory.pid())
    }

    /// The process currently attached, if any
    pub fn target(&self) -> Option<ProcessInfo> {
        self.attachment.read().as_ref().map(|a| a.process.clone())
    }

    /// Run `f` against the open handle, or fail with `NotAttached`
    pub fn with_memory<R>(
        &self,
        f: impl FnOnce(&dyn ProcessMemory) -> MemoryResult<R>,
    ) -> MemoryResult<R> {
        let guard = self.attachment.read();
        match guard.as_ref() {
            Some(attachment) => f(attachment.memory.as_ref()),
            None => Err(MemoryError::NotAttached),
        }
    }
}

impl Drop for ProcessAccessor {
    fn drop(&mut self) {
        self.detach();
    }
}
