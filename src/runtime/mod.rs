//! Engine lifecycle: worker pool, shutdown signalling, console exit key
//! and the `ModEngine` that wires every component together.

pub mod console;
pub mod engine;
pub mod pool;
pub mod shutdown;

pub use engine::ModEngine;
pub use pool::{Dispatch, Job, WorkerPool};
pub use shutdown::ShutdownSignal;
