//! Memory operations against the attached process
//!
//! This module provides the fixed-width accessors scripts use and the pointer
//! chain resolver built on top of them:
//! - `try_*` operations returning `MemoryResult` with the failure reason
//! - convenience operations that collapse any failure into a zero read or a
//!   skipped write, so a bad address never aborts a script

pub mod pointer;
pub mod reader;
pub mod writer;

pub use pointer::PointerResolver;

use crate::process::ProcessAccessor;
use std::sync::Arc;

/// Fixed-width reads and writes through the accessor's handle
#[derive(Clone)]
pub struct MemoryAccessor {
    process: Arc<ProcessAccessor>,
}

impl MemoryAccessor {
    /// Create a memory accessor sharing `process`'s attachment
    pub fn new(process: Arc<ProcessAccessor>) -> Self {
        MemoryAccessor { process }
    }

    /// The process accessor this memory accessor reads through
    pub fn process(&self) -> &Arc<ProcessAccessor> {
        &self.process
    }
}
