//! In-memory stand-ins for the OS-facing capabilities
//!
//! These let pointer resolution, memory access, hotkey dispatch and mod
//! scripts be exercised deterministically without a real target process or
//! keyboard.

use crate::core::types::{
    Address, AttachError, MemoryError, MemoryResult, ProcessId, ProcessInfo,
};
use crate::input::{KeyStateSource, VirtualKey};
use crate::process::discovery::first_match;
use crate::process::{ProcessBackend, ProcessMemory};
use crate::runtime::pool::{run_isolated, Dispatch, Job};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct MockMemoryState {
    bytes: HashMap<u64, u8>,
    protected: Vec<Range<u64>>,
    reads: usize,
}

/// Sparse fake address space shared by every clone.
///
/// Only mapped bytes can be read or written; a read or write that starts on
/// an unmapped byte fails, one that runs off the end of mapped memory
/// returns a short count.
#[derive(Clone, Default)]
pub struct MockMemory {
    state: Arc<Mutex<MockMemoryState>>,
}

impl MockMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `len` zeroed bytes at `base` (existing bytes are kept)
    pub fn map(&self, base: u64, len: u64) {
        let mut state = self.state.lock();
        for addr in base..base + len {
            state.bytes.entry(addr).or_insert(0);
        }
    }

    /// Map and fill bytes at `base`
    pub fn put_bytes(&self, base: u64, data: &[u8]) {
        let mut state = self.state.lock();
        for (addr, byte) in (base..).zip(data) {
            state.bytes.insert(addr, *byte);
        }
    }

    /// Store a 4-byte pointer value at `base`
    pub fn put_u32(&self, base: u64, value: u32) {
        self.put_bytes(base, &value.to_ne_bytes());
    }

    /// Read back mapped bytes, `None` if any are unmapped
    pub fn get_bytes(&self, base: u64, len: u64) -> Option<Vec<u8>> {
        let state = self.state.lock();
        (base..base + len)
            .map(|addr| state.bytes.get(&addr).copied())
            .collect()
    }

    /// Make writes into `[base, base + len)` fail
    pub fn protect(&self, base: u64, len: u64) {
        self.state.lock().protected.push(base..base + len);
    }

    /// Number of read calls served
    pub fn read_count(&self) -> usize {
        self.state.lock().reads
    }

    fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
        let mut state = self.state.lock();
        state.reads += 1;

        let mut copied = 0;
        for (addr, slot) in (address.as_u64()..).zip(buffer.iter_mut()) {
            match state.bytes.get(&addr) {
                Some(byte) => *slot = *byte,
                None => break,
            }
            copied += 1;
        }

        if copied == 0 && !buffer.is_empty() {
            return Err(MemoryError::read_failed(address, "unmapped page"));
        }
        Ok(copied)
    }

    fn write(&self, address: Address, data: &[u8]) -> MemoryResult<usize> {
        let mut state = self.state.lock();
        let start = address.as_u64();
        let end = start.saturating_add(data.len() as u64);

        if state
            .protected
            .iter()
            .any(|r| r.start < end && start < r.end)
        {
            return Err(MemoryError::write_failed(address, "page is read-only"));
        }

        let mut copied = 0;
        for (addr, byte) in (start..).zip(data) {
            match state.bytes.get_mut(&addr) {
                Some(slot) => *slot = *byte,
                None => break,
            }
            copied += 1;
        }

        if copied == 0 && !data.is_empty() {
            return Err(MemoryError::write_failed(address, "unmapped page"));
        }
        Ok(copied)
    }
}

#[derive(Default)]
struct MockBackendState {
    processes: Vec<ProcessInfo>,
    denied: HashSet<ProcessId>,
    last_lookup: Option<String>,
}

/// Process backend over a fixed process list, every process sharing one
/// `MockMemory`. Lookups scan in pid order like the system backend.
#[derive(Clone)]
pub struct MockProcessBackend {
    state: Arc<Mutex<MockBackendState>>,
    memory: MockMemory,
    open_handles: Arc<AtomicUsize>,
}

impl MockProcessBackend {
    pub fn new(memory: MockMemory) -> Self {
        MockProcessBackend {
            state: Arc::default(),
            memory,
            open_handles: Arc::default(),
        }
    }

    pub fn add_process(&self, pid: ProcessId, name: &str) {
        self.state
            .lock()
            .processes
            .push(ProcessInfo::new(pid, name));
    }

    /// Make opening `pid` fail as if access were denied
    pub fn deny_open(&self, pid: ProcessId) {
        self.state.lock().denied.insert(pid);
    }

    /// The name most recently passed to `find_process`
    pub fn last_lookup(&self) -> Option<String> {
        self.state.lock().last_lookup.clone()
    }

    /// Handles opened and not yet dropped
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    pub fn memory(&self) -> &MockMemory {
        &self.memory
    }
}

impl ProcessBackend for MockProcessBackend {
    fn find_process(&self, name: &str) -> Option<ProcessInfo> {
        let mut state = self.state.lock();
        state.last_lookup = Some(name.to_string());
        let mut processes = state.processes.clone();
        processes.sort_by_key(|p| p.pid);
        first_match(processes, name)
    }

    fn open(&self, process: &ProcessInfo) -> Result<Box<dyn ProcessMemory>, AttachError> {
        if self.state.lock().denied.contains(&process.pid) {
            return Err(AttachError::handle_open_failed(process.pid, "access denied"));
        }
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockHandle {
            pid: process.pid,
            memory: self.memory.clone(),
            open_handles: Arc::clone(&self.open_handles),
        }))
    }
}

struct MockHandle {
    pid: ProcessId,
    memory: MockMemory,
    open_handles: Arc<AtomicUsize>,
}

impl ProcessMemory for MockHandle {
    fn pid(&self) -> ProcessId {
        self.pid
    }

    fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
        self.memory.read(address, buffer)
    }

    fn write(&self, address: Address, data: &[u8]) -> MemoryResult<usize> {
        self.memory.write(address, data)
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Keyboard whose key states are set by the test
#[derive(Clone, Default)]
pub struct ScriptedKeyboard {
    down: Arc<Mutex<HashSet<VirtualKey>>>,
}

impl ScriptedKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, key: VirtualKey) {
        self.down.lock().insert(key);
    }

    pub fn release(&self, key: VirtualKey) {
        self.down.lock().remove(&key);
    }
}

impl KeyStateSource for ScriptedKeyboard {
    fn is_key_down(&self, key: VirtualKey) -> bool {
        self.down.lock().contains(&key)
    }
}

/// Runs each job immediately on the submitting thread, isolating faults the
/// same way the worker pool does
#[derive(Default)]
pub struct InlineDispatcher {
    submitted: AtomicUsize,
}

impl InlineDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }
}

impl Dispatch for InlineDispatcher {
    fn submit(&self, label: &str, job: Job) {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        run_isolated(label, job);
    }
}
