//! Process discovery and the OS-backed process backend.

use super::backend::{ProcessBackend, ProcessMemory};
use super::handle::ProcessHandle;
use crate::core::types::{AttachError, ProcessInfo};
use parking_lot::Mutex;
use sysinfo::{ProcessesToUpdate, System};
use tracing::debug;

/// Finds running processes by name using `sysinfo` and opens real handles.
///
/// When several processes share a name the one with the lowest PID wins,
/// which keeps repeated lookups stable.
pub struct SystemProcessBackend {
    system: Mutex<System>,
}

impl Default for SystemProcessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProcessBackend {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }

    /// Snapshot of every running process
    pub fn processes(&self) -> Vec<ProcessInfo> {
        let mut system = self.system.lock();
        system.refresh_processes(ProcessesToUpdate::All, true);

        let mut processes: Vec<ProcessInfo> = system
            .processes()
            .iter()
            .map(|(pid, process)| {
                ProcessInfo::new(pid.as_u32(), process.name().to_string_lossy().into_owned())
            })
            .collect();
        processes.sort_by_key(|p| p.pid);
        processes
    }
}

impl ProcessBackend for SystemProcessBackend {
    fn find_process(&self, name: &str) -> Option<ProcessInfo> {
        let found = first_match(self.processes(), name);
        debug!(name, found = ?found, "process lookup");
        found
    }

    fn open(&self, process: &ProcessInfo) -> Result<Box<dyn ProcessMemory>, AttachError> {
        let handle = ProcessHandle::open_all_access(process.pid)?;
        Ok(Box::new(handle))
    }
}

/// First process (in the given order) matching `name`
pub fn first_match(
    processes: impl IntoIterator<Item = ProcessInfo>,
    name: &str,
) -> Option<ProcessInfo> {
    processes.into_iter().find(|p| p.matches(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_prefers_order() {
        let processes = vec![
            ProcessInfo::new(10, "game.exe"),
            ProcessInfo::new(20, "Game.exe"),
            ProcessInfo::new(30, "launcher.exe"),
        ];
        assert_eq!(first_match(processes.clone(), "game").unwrap().pid, 10);
        assert_eq!(first_match(processes.clone(), "launcher.exe").unwrap().pid, 30);
        assert!(first_match(processes, "gam").is_none());
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_missing_process_not_found() {
        let backend = SystemProcessBackend::new();
        assert!(backend
            .find_process("definitely-not-a-running-process-7f3a")
            .is_none());
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_processes_sorted_by_pid() {
        let backend = SystemProcessBackend::new();
        let processes = backend.processes();
        assert!(processes.windows(2).all(|w| w[0].pid <= w[1].pid));
    }
}
