//! The operations a mod script can call
//!
//! Everything here is safe to call from any thread. Memory calls never fail
//! towards the script: reads yield zero and writes are skipped when the
//! target is missing or rejects the access.

use crate::core::types::{Address, MemoryResult};
use crate::input::{CallbackRegistry, HotkeyCallback, VirtualKey};
use crate::memory::{MemoryAccessor, PointerResolver};
use crate::process::ProcessAccessor;
use crate::runtime::ShutdownSignal;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared boundary between the scripting engine and the core components
pub struct ScriptBindings {
    process: Arc<ProcessAccessor>,
    memory: MemoryAccessor,
    resolver: PointerResolver,
    registry: Arc<CallbackRegistry>,
    shutdown: Arc<ShutdownSignal>,
}

impl ScriptBindings {
    pub fn new(
        process: Arc<ProcessAccessor>,
        registry: Arc<CallbackRegistry>,
        shutdown: Arc<ShutdownSignal>,
    ) -> Self {
        let memory = MemoryAccessor::new(Arc::clone(&process));
        let resolver = PointerResolver::new(memory.clone());
        ScriptBindings {
            process,
            memory,
            resolver,
            registry,
            shutdown,
        }
    }

    /// Attach to the first process called `name`; failures are logged
    pub fn attach(&self, name: &str) -> bool {
        self.process.attach(name).is_ok()
    }

    pub fn read_int32(&self, address: u64) -> i32 {
        self.memory.read_int32(Address::new(address))
    }

    pub fn write_int32(&self, address: u64, value: i32) {
        self.memory.write_int32(Address::new(address), value)
    }

    pub fn read_float32(&self, address: u64) -> f32 {
        self.memory.read_float32(Address::new(address))
    }

    pub fn write_float32(&self, address: u64, value: f32) {
        self.memory.write_float32(Address::new(address), value)
    }

    pub fn read_byte(&self, address: u64) -> u8 {
        self.memory.read_byte(Address::new(address))
    }

    pub fn write_byte(&self, address: u64, value: u8) {
        self.memory.write_byte(Address::new(address), value)
    }

    /// Follow a pointer chain; 0 if any link cannot be read.
    ///
    /// Only an empty offset list is reported as an error.
    pub fn resolve_ptr(&self, base: u64, offsets: &[i64]) -> MemoryResult<u64> {
        self.resolver
            .resolve(Address::new(base), offsets)
            .map(|address| address.as_u64())
    }

    /// Emit a message from `script` on the `script` log target
    pub fn log(&self, script: &str, message: &str) {
        info!(target: "script", script, "{}", message);
    }

    /// Block the calling script for `milliseconds`.
    ///
    /// Returns early, with `false`, once the engine is shutting down.
    pub fn wait(&self, milliseconds: u64) -> bool {
        !self.shutdown.wait(Duration::from_millis(milliseconds))
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_shutdown()
    }

    /// Bind `callback` to the key called `key_name` on behalf of `script`.
    ///
    /// Unknown key names are logged and ignored.
    pub fn on_key_down(
        &self,
        script: &str,
        key_name: &str,
        callback: HotkeyCallback,
    ) -> Option<VirtualKey> {
        self.registry.register(key_name, script, callback)
    }

    pub fn process(&self) -> &Arc<ProcessAccessor> {
        &self.process
    }

    pub fn memory(&self) -> &MemoryAccessor {
        &self.memory
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MemoryError;
    use crate::testing::{MockMemory, MockProcessBackend};
    use std::time::Instant;

    fn bindings(memory: &MockMemory) -> ScriptBindings {
        let backend = MockProcessBackend::new(memory.clone());
        backend.add_process(42, "game.exe");
        ScriptBindings::new(
            Arc::new(ProcessAccessor::new(Arc::new(backend))),
            Arc::new(CallbackRegistry::new()),
            Arc::new(ShutdownSignal::new()),
        )
    }

    #[test]
    fn test_attach_reports_outcome() {
        let bindings = bindings(&MockMemory::new());
        assert!(!bindings.attach("missing"));
        assert!(bindings.attach("game.exe"));
        assert_eq!(bindings.process().attached_pid(), Some(42));
    }

    #[test]
    fn test_memory_calls_before_attach() {
        let memory = MockMemory::new();
        memory.put_bytes(0x100, &7i32.to_ne_bytes());
        let bindings = bindings(&memory);

        assert_eq!(bindings.read_int32(0x100), 0);
        bindings.write_int32(0x100, 9);
        assert_eq!(memory.get_bytes(0x100, 4), Some(7i32.to_ne_bytes().to_vec()));
        assert_eq!(bindings.resolve_ptr(0x100, &[0]).unwrap(), 0);
    }

    #[test]
    fn test_memory_round_trip() {
        let memory = MockMemory::new();
        memory.map(0x100, 16);
        let bindings = bindings(&memory);
        bindings.attach("game");

        bindings.write_int32(0x100, -5);
        bindings.write_float32(0x104, 2.25);
        bindings.write_byte(0x108, 0xFE);
        assert_eq!(bindings.read_int32(0x100), -5);
        assert_eq!(bindings.read_float32(0x104), 2.25);
        assert_eq!(bindings.read_byte(0x108), 0xFE);
    }

    #[test]
    fn test_resolve_ptr_rejects_empty_offsets() {
        let bindings = bindings(&MockMemory::new());
        bindings.attach("game");
        assert!(matches!(
            bindings.resolve_ptr(0x1000, &[]),
            Err(MemoryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_wait_is_interrupted_by_shutdown() {
        let memory = MockMemory::new();
        let backend = MockProcessBackend::new(memory);
        let shutdown = Arc::new(ShutdownSignal::new());
        let bindings = ScriptBindings::new(
            Arc::new(ProcessAccessor::new(Arc::new(backend))),
            Arc::new(CallbackRegistry::new()),
            Arc::clone(&shutdown),
        );

        assert!(bindings.wait(1));
        shutdown.trigger();
        let start = Instant::now();
        assert!(!bindings.wait(10_000));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(bindings.is_shutting_down());
    }

    #[test]
    fn test_on_key_down_registers() {
        let bindings = bindings(&MockMemory::new());
        let key = bindings.on_key_down("speed.rhai", "F3", Arc::new(|| Ok(())));
        assert_eq!(key, VirtualKey::function_key(3));
        assert_eq!(bindings.on_key_down("speed.rhai", "bogus", Arc::new(|| Ok(()))), None);
        assert_eq!(bindings.registry().len(), 1);
    }
}
