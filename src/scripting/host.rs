//! Executes mod scripts with rhai
//!
//! Every mod file gets its own `Engine` with the bindings registered. After a
//! file is compiled, its engine and AST are stored together so that hotkey
//! closures registered by the script can be called later, from any worker
//! thread, through the same AST.
//!
//! The engine's `on_key_down` only holds a weak reference to that storage;
//! the registered callbacks hold the strong ones. A mod that never binds a
//! key is freed as soon as it finishes running.
//!
//! Registered functions reach the bindings through a `Weak` as well. The
//! registry owns the callbacks, the callbacks own the engines, and the
//! bindings own the registry, so a strong capture here would keep all of
//! them alive after the host is dropped.

use super::bindings::ScriptBindings;
use crate::core::types::ScriptError;
use crate::input::HotkeyCallback;
use rhai::{Array, Dynamic, Engine, EvalAltResult, FnPtr, AST, FLOAT, INT};
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock, Weak};
use tracing::{debug, info};

type RhaiResult<T> = Result<T, Box<EvalAltResult>>;

struct CompiledMod {
    engine: Engine,
    ast: AST,
}

impl CompiledMod {
    fn call(&self, callback: &FnPtr) -> RhaiResult<Dynamic> {
        callback.call::<Dynamic>(&self.engine, &self.ast, ())
    }
}

type ModSlot = OnceLock<CompiledMod>;

/// Script addresses are rhai integers reinterpreted as unsigned
fn address(value: INT) -> u64 {
    value as u64
}

/// Runs mod sources against a shared set of bindings
#[derive(Clone)]
pub struct ScriptHost {
    bindings: Arc<ScriptBindings>,
}

impl ScriptHost {
    pub fn new(bindings: Arc<ScriptBindings>) -> Self {
        ScriptHost { bindings }
    }

    pub fn bindings(&self) -> &Arc<ScriptBindings> {
        &self.bindings
    }

    /// Load and run the mod at `path`
    pub fn run_file(&self, path: &Path) -> Result<(), ScriptError> {
        let source = fs::read_to_string(path).map_err(|e| ScriptError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.run_source(path, &source)
    }

    /// Compile and run `source`, reporting errors against `path`
    pub fn run_source(&self, path: &Path, source: &str) -> Result<(), ScriptError> {
        let name: Arc<str> = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy())
            .into();

        let slot: Arc<ModSlot> = Arc::new(OnceLock::new());
        let engine = self.build_engine(&name, Arc::downgrade(&slot));

        let ast = engine.compile(source).map_err(|e| ScriptError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let compiled = slot.get_or_init(|| CompiledMod { engine, ast });
        debug!(script = %name, "running mod");
        compiled
            .engine
            .run_ast(&compiled.ast)
            .map_err(|e| ScriptError::Runtime {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        info!("Mod {} finished loading", name);
        Ok(())
    }

    fn build_engine(&self, script: &Arc<str>, slot: Weak<ModSlot>) -> Engine {
        let mut engine = Engine::new();
        let bindings = Arc::downgrade(&self.bindings);

        let name = Arc::clone(script);
        engine.on_print(move |text| info!(target: "script", script = %name, "{}", text));
        let name = Arc::clone(script);
        engine.on_debug(move |text, _source, pos| {
            debug!(target: "script", script = %name, "{} @ {}", text, pos)
        });

        let b = bindings.clone();
        engine.register_fn("attach", move |process: &str| -> RhaiResult<bool> {
            Ok(live(&b)?.attach(process))
        });

        let b = bindings.clone();
        engine.register_fn("read_int32", move |at: INT| -> RhaiResult<INT> {
            Ok(INT::from(live(&b)?.read_int32(address(at))))
        });
        let b = bindings.clone();
        engine.register_fn("write_int32", move |at: INT, value: INT| -> RhaiResult<()> {
            live(&b)?.write_int32(address(at), value as i32);
            Ok(())
        });

        let b = bindings.clone();
        engine.register_fn("read_float32", move |at: INT| -> RhaiResult<FLOAT> {
            Ok(FLOAT::from(live(&b)?.read_float32(address(at))))
        });
        let b = bindings.clone();
        engine.register_fn("write_float32", move |at: INT, value: FLOAT| -> RhaiResult<()> {
            live(&b)?.write_float32(address(at), value as f32);
            Ok(())
        });
        let b = bindings.clone();
        engine.register_fn("write_float32", move |at: INT, value: INT| -> RhaiResult<()> {
            live(&b)?.write_float32(address(at), value as f32);
            Ok(())
        });

        let b = bindings.clone();
        engine.register_fn("read_byte", move |at: INT| -> RhaiResult<INT> {
            Ok(INT::from(live(&b)?.read_byte(address(at))))
        });
        let b = bindings.clone();
        engine.register_fn("write_byte", move |at: INT, value: INT| -> RhaiResult<()> {
            live(&b)?.write_byte(address(at), value as u8);
            Ok(())
        });

        register_resolve_ptr(&mut engine, &bindings);

        let b = bindings.clone();
        let name = Arc::clone(script);
        engine.register_fn("log", move |message: Dynamic| -> RhaiResult<()> {
            live(&b)?.log(&name, &message.to_string());
            Ok(())
        });

        // a released host reads as shutdown, so `while wait(..)` loops end
        let b = bindings.clone();
        engine.register_fn("wait", move |ms: INT| match b.upgrade() {
            Some(b) => b.wait(ms.max(0) as u64),
            None => false,
        });

        let b = bindings;
        let name = Arc::clone(script);
        engine.register_fn("on_key_down", move |key: &str, callback: FnPtr| -> bool {
            let (Some(compiled), Some(b)) = (slot.upgrade(), b.upgrade()) else {
                return false;
            };
            let hotkey = hotkey_callback(compiled, callback, key, &name);
            b.on_key_down(&name, key, hotkey).is_some()
        });

        engine
    }
}

fn live(bindings: &Weak<ScriptBindings>) -> RhaiResult<Arc<ScriptBindings>> {
    bindings
        .upgrade()
        .ok_or_else(|| "mod host has shut down".into())
}

/// Registers `resolve_ptr(base, [offsets])` and positional forms taking one
/// to four offsets. Longer chains go through the array form.
fn register_resolve_ptr(engine: &mut Engine, bindings: &Weak<ScriptBindings>) {
    let b = bindings.clone();
    engine.register_fn("resolve_ptr", move |base: INT, offsets: Array| -> RhaiResult<INT> {
        let offsets = offsets
            .into_iter()
            .map(|o| o.as_int())
            .collect::<Result<Vec<INT>, _>>()
            .map_err(|t| format!("resolve_ptr offsets must be integers, got {}", t))?;
        resolve(&b, base, &offsets)
    });

    let b = bindings.clone();
    engine.register_fn("resolve_ptr", move |base: INT, o1: INT| resolve(&b, base, &[o1]));
    let b = bindings.clone();
    engine.register_fn("resolve_ptr", move |base: INT, o1: INT, o2: INT| {
        resolve(&b, base, &[o1, o2])
    });
    let b = bindings.clone();
    engine.register_fn("resolve_ptr", move |base: INT, o1: INT, o2: INT, o3: INT| {
        resolve(&b, base, &[o1, o2, o3])
    });
    let b = bindings.clone();
    engine.register_fn(
        "resolve_ptr",
        move |base: INT, o1: INT, o2: INT, o3: INT, o4: INT| {
            resolve(&b, base, &[o1, o2, o3, o4])
        },
    );
}

fn resolve(bindings: &Weak<ScriptBindings>, base: INT, offsets: &[INT]) -> RhaiResult<INT> {
    live(bindings)?
        .resolve_ptr(address(base), offsets)
        .map(|resolved| resolved as INT)
        .map_err(|e| e.to_string().into())
}

fn hotkey_callback(
    compiled: Arc<ModSlot>,
    callback: FnPtr,
    key: &str,
    script: &Arc<str>,
) -> HotkeyCallback {
    let key = key.to_string();
    let script = Arc::clone(script);
    Arc::new(move || -> anyhow::Result<()> {
        let Some(module) = compiled.get() else {
            return Ok(());
        };
        module.call(&callback).map(drop).map_err(|e| {
            ScriptError::Callback {
                key: key.clone(),
                script: script.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{CallbackRegistry, VirtualKey};
    use crate::process::ProcessAccessor;
    use crate::runtime::ShutdownSignal;
    use crate::testing::{MockMemory, MockProcessBackend};

    fn host(memory: &MockMemory) -> ScriptHost {
        let backend = MockProcessBackend::new(memory.clone());
        backend.add_process(9, "game.exe");
        let bindings = ScriptBindings::new(
            Arc::new(ProcessAccessor::new(Arc::new(backend))),
            Arc::new(CallbackRegistry::new()),
            Arc::new(ShutdownSignal::new()),
        );
        ScriptHost::new(Arc::new(bindings))
    }

    fn run(host: &ScriptHost, source: &str) -> Result<(), ScriptError> {
        host.run_source(Path::new("mods/test.rhai"), source)
    }

    #[test]
    fn test_script_reads_and_writes() {
        let memory = MockMemory::new();
        memory.map(0x100, 16);
        memory.put_bytes(0x100, &41i32.to_ne_bytes());
        let host = host(&memory);

        run(
            &host,
            r#"
                if !attach("game.exe") { throw "attach failed"; }
                write_int32(0x100, read_int32(0x100) + 1);
                write_float32(0x104, 3);
                write_byte(0x108, 0x1FF);
            "#,
        )
        .unwrap();

        assert_eq!(memory.get_bytes(0x100, 4), Some(42i32.to_ne_bytes().to_vec()));
        assert_eq!(memory.get_bytes(0x104, 4), Some(3.0f32.to_ne_bytes().to_vec()));
        assert_eq!(memory.get_bytes(0x108, 1), Some(vec![0xFF]));
    }

    #[test]
    fn test_resolve_ptr_forms() {
        let memory = MockMemory::new();
        memory.put_u32(0x1000, 0x2000);
        memory.put_u32(0x2010, 0x3000);
        memory.map(0x3020, 4);
        let host = host(&memory);

        run(
            &host,
            r#"
                attach("game");
                let a = resolve_ptr(0x1000, [0x10, 0x20]);
                let b = resolve_ptr(0x1000, 0x10, 0x20);
                if a != b || a != 0x3020 { throw `bad chain ${a} ${b}`; }
                write_int32(a, 7);
            "#,
        )
        .unwrap();

        assert_eq!(memory.get_bytes(0x3020, 4), Some(7i32.to_ne_bytes().to_vec()));
    }

    #[test]
    fn test_resolve_ptr_array_takes_long_chains() {
        // [0x1000] -> 0x2000, then [0x2000 + 8] -> 0x2100 and so on to 0x2500
        let memory = MockMemory::new();
        memory.put_u32(0x1000, 0x2000);
        for level in 0..5u32 {
            let at = 0x2000 + level * 0x100;
            memory.put_u32(u64::from(at) + 8, at + 0x100);
        }
        let host = host(&memory);

        run(
            &host,
            r#"
                attach("game");
                let p = resolve_ptr(0x1000, [8, 8, 8, 8, 8, 8]);
                if p != 0x2508 { throw `bad chain ${p}`; }
            "#,
        )
        .unwrap();
    }

    #[test]
    fn test_dropped_host_releases_bindings_and_registry() {
        let registry = Arc::new(CallbackRegistry::new());
        let bindings = Arc::new(ScriptBindings::new(
            Arc::new(ProcessAccessor::new(Arc::new(MockProcessBackend::new(
                MockMemory::new(),
            )))),
            Arc::clone(&registry),
            Arc::new(ShutdownSignal::new()),
        ));
        let host = ScriptHost::new(bindings);
        run(&host, r#"on_key_down("F1", || write_int32(0x10, 1));"#).unwrap();
        assert_eq!(registry.len(), 1);

        let weak_bindings = Arc::downgrade(host.bindings());
        drop(host);
        assert!(weak_bindings.upgrade().is_none());

        // the callback outlives the host but can no longer reach it
        let snapshot = registry.snapshot();
        let err = (snapshot[0].callbacks[0].callback)().unwrap_err();
        assert!(err.to_string().contains("shut down"));

        let weak_registry = Arc::downgrade(&registry);
        drop(snapshot);
        drop(registry);
        assert!(weak_registry.upgrade().is_none());
    }

    #[test]
    fn test_resolve_ptr_empty_offsets_is_runtime_error() {
        let host = host(&MockMemory::new());
        let err = run(&host, "attach(\"game\"); resolve_ptr(0x1000, []);").unwrap_err();
        assert!(matches!(err, ScriptError::Runtime { .. }));
    }

    #[test]
    fn test_syntax_error_is_load_error() {
        let host = host(&MockMemory::new());
        let err = run(&host, "let x = ;").unwrap_err();
        assert!(matches!(err, ScriptError::Load { .. }));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let host = host(&MockMemory::new());
        let err = host.run_file(Path::new("does/not/exist.rhai")).unwrap_err();
        assert!(matches!(err, ScriptError::Load { .. }));
    }

    #[test]
    fn test_on_key_down_callback_runs_later() {
        let memory = MockMemory::new();
        memory.map(0x200, 4);
        let host = host(&memory);

        run(
            &host,
            r#"
                attach("game");
                fn bump() { write_int32(0x200, read_int32(0x200) + 1); }
                on_key_down("F1", Fn("bump"));
                on_key_down("NoSuchKey", Fn("bump"));
            "#,
        )
        .unwrap();

        let registry = host.bindings().registry();
        let f1 = VirtualKey::function_key(1).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.callback_count(f1), 1);

        let snapshot = registry.snapshot();
        let callback = &snapshot[0].callbacks[0];
        assert_eq!(&*callback.owner, "test.rhai");
        (callback.callback)().unwrap();
        (callback.callback)().unwrap();
        assert_eq!(memory.get_bytes(0x200, 4), Some(2i32.to_ne_bytes().to_vec()));
    }

    #[test]
    fn test_closure_callback_error_is_reported() {
        let host = host(&MockMemory::new());
        run(&host, r#"on_key_down("F2", || { throw "nope"; });"#).unwrap();

        let snapshot = host.bindings().registry().snapshot();
        let err = (snapshot[0].callbacks[0].callback)().unwrap_err();
        assert!(err.to_string().contains("F2"));
        assert!(err.to_string().contains("test.rhai"));
    }
}
