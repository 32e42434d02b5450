//! Mod scripting
//!
//! `ScriptBindings` is the surface scripts see, `ScriptHost` runs rhai source
//! against it and `ModLoader` finds mod files and loads them on the worker
//! pool.

pub mod bindings;
pub mod host;
pub mod loader;

pub use bindings::ScriptBindings;
pub use host::ScriptHost;
pub use loader::ModLoader;
