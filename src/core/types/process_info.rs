//! Process information types

use super::ProcessId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A running process that matched an attach request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: ProcessId,
    pub name: String,
}

impl ProcessInfo {
    /// Creates a new ProcessInfo
    pub fn new(pid: ProcessId, name: impl Into<String>) -> Self {
        ProcessInfo {
            pid,
            name: name.into(),
        }
    }

    /// The process name without a trailing executable suffix
    pub fn stem(&self) -> &str {
        strip_executable_suffix(&self.name)
    }

    /// Checks whether this process answers to `name` (suffix and case insensitive)
    pub fn matches(&self, name: &str) -> bool {
        self.stem()
            .eq_ignore_ascii_case(strip_executable_suffix(name.trim()))
    }
}

impl fmt::Display for ProcessInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (pid {})", self.name, self.pid)
    }
}

/// Strips a trailing `.exe` (any case) from a process name
pub fn strip_executable_suffix(name: &str) -> &str {
    const SUFFIX: &str = ".exe";
    if name.len() > SUFFIX.len() {
        let split = name.len() - SUFFIX.len();
        if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(SUFFIX) {
            return &name[..split];
        }
    }
    name
}
