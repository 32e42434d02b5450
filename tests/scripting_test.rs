//! Integration tests running rhai mods against the mock process

use memory_mods::input::{CallbackRegistry, EdgeDetector, VirtualKey};
use memory_mods::process::ProcessAccessor;
use memory_mods::runtime::{ShutdownSignal, WorkerPool};
use memory_mods::scripting::{ModLoader, ScriptBindings, ScriptHost};
use memory_mods::testing::{InlineDispatcher, MockMemory, MockProcessBackend, ScriptedKeyboard};
use memory_mods::ScriptError;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const HEALTH_BASE: u64 = 0x0050_0000;

fn game_memory() -> MockMemory {
    // [[0x500000] + 0x18] + 0x2C holds health
    let memory = MockMemory::new();
    memory.put_u32(HEALTH_BASE, 0x1000);
    memory.put_u32(0x1018, 0x2000);
    memory.put_bytes(0x202C, &100i32.to_ne_bytes());
    memory
}

fn host(memory: &MockMemory) -> ScriptHost {
    let backend = MockProcessBackend::new(memory.clone());
    backend.add_process(1234, "game.exe");
    let bindings = ScriptBindings::new(
        Arc::new(ProcessAccessor::new(Arc::new(backend))),
        Arc::new(CallbackRegistry::new()),
        Arc::new(ShutdownSignal::new()),
    );
    ScriptHost::new(Arc::new(bindings))
}

fn health(memory: &MockMemory) -> i32 {
    let bytes = memory.get_bytes(0x202C, 4).unwrap();
    i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[test]
fn test_infinite_health_mod() {
    let memory = game_memory();
    let host = host(&memory);

    host.run_source(
        Path::new("health.rhai"),
        r#"
            if attach("game.exe") {
                log("attached");
            }
            on_key_down("F1", || {
                let hp = resolve_ptr(0x500000, [0x18, 0x2C]);
                write_int32(hp, 999);
                log(`health set at ${hp}`);
            });
        "#,
    )
    .unwrap();
    assert_eq!(health(&memory), 100);

    let keyboard = ScriptedKeyboard::new();
    let dispatcher = InlineDispatcher::new();
    let mut detector = EdgeDetector::new();
    let registry = host.bindings().registry();

    keyboard.press(VirtualKey::function_key(1).unwrap());
    for _ in 0..10 {
        detector.tick(&registry.snapshot(), &keyboard, &dispatcher);
    }

    assert_eq!(health(&memory), 999);
    assert_eq!(dispatcher.submitted(), 1);
}

#[test]
fn test_script_survives_bad_addresses() {
    let memory = game_memory();
    let host = host(&memory);

    host.run_source(
        Path::new("lookup.rhai"),
        r#"
            attach("game");
            let missing = resolve_ptr(0xDEAD0000, 0x10, 0x20);
            if missing != 0 { throw "expected a null chain"; }
            if read_int32(0xDEAD0000) != 0 { throw "expected zero"; }
            if read_float32(0xDEAD0000) != 0.0 { throw "expected zero"; }
            write_byte(0xDEAD0000, 1);
        "#,
    )
    .unwrap();
}

#[test]
fn test_runtime_error_is_isolated_per_file() {
    let memory = game_memory();
    let host = host(&memory);

    let err = host
        .run_source(Path::new("broken.rhai"), "attach(\"game\"); undefined_fn();")
        .unwrap_err();
    assert!(matches!(err, ScriptError::Runtime { .. }));
    assert!(err.to_string().contains("broken.rhai"));

    // the host is still usable
    host.run_source(Path::new("fine.rhai"), "write_int32(0x202C, 5);")
        .unwrap();
    assert_eq!(health(&memory), 5);
}

#[test]
fn test_loader_runs_every_mod_despite_failures() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a_broken.rhai"), "let = ;").unwrap();
    fs::write(dir.path().join("b_throws.rhai"), "throw \"boom\";").unwrap();
    fs::write(
        dir.path().join("c_good.rhai"),
        "attach(\"game\"); write_int32(0x202C, 77);",
    )
    .unwrap();
    fs::write(dir.path().join("readme.txt"), "not a mod").unwrap();

    let memory = game_memory();
    let host = host(&memory);
    let dispatcher = InlineDispatcher::new();
    let loader = ModLoader::new(dir.path(), "rhai");

    assert_eq!(loader.load_all(&host, &dispatcher), 3);
    assert_eq!(dispatcher.submitted(), 3);
    assert_eq!(health(&memory), 77);
}

#[test]
fn test_loader_on_worker_pool() {
    let dir = TempDir::new().unwrap();
    for i in 0..4 {
        fs::write(
            dir.path().join(format!("mod{}.rhai", i)),
            format!("on_key_down(\"F{}\", || {{}});", i + 1),
        )
        .unwrap();
    }

    let host = host(&game_memory());
    let pool = WorkerPool::new(2, 8).unwrap();
    let loader = ModLoader::new(dir.path(), "rhai");
    assert_eq!(loader.load_all(&host, &pool), 4);
    assert!(pool.wait_idle(Duration::from_secs(5)));

    let registry = host.bindings().registry();
    assert_eq!(registry.len(), 4);
    for i in 1..=4 {
        assert_eq!(registry.callback_count(VirtualKey::function_key(i).unwrap()), 1);
    }
    pool.shutdown(Duration::from_secs(1));
}

#[test]
fn test_empty_mods_directory_is_created() {
    let dir = TempDir::new().unwrap();
    let mods = dir.path().join("mods");
    let loader = ModLoader::new(&mods, "rhai");
    let dispatcher = InlineDispatcher::new();

    assert_eq!(loader.load_all(&host(&game_memory()), &dispatcher), 0);
    assert!(mods.is_dir());
    assert_eq!(dispatcher.submitted(), 0);
}
