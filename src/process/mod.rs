//! Process attachment
//!
//! This module provides process discovery, owned process handles and the
//! `ProcessAccessor` that holds the single attached target.

pub mod accessor;
pub mod backend;
pub mod discovery;
pub mod handle;

pub use accessor::ProcessAccessor;
pub use backend::{ProcessBackend, ProcessMemory};
pub use discovery::SystemProcessBackend;
pub use handle::ProcessHandle;
