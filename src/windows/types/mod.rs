//! Windows-specific owned types

mod handle;

pub use handle::Handle;
