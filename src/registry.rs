//! The process-wide engine registry (§4.7): an append-only list of live
//! engines guarded by its own mutex, used only for bulk shutdown. The
//! mutex is never held across a generator `pull` — registration and
//! `kill_all`/`clear_all_engines` are the only operations that touch it.

use std::sync::{Arc, Mutex, OnceLock};

/// The control surface an engine exposes to the registry. Implemented by
/// the engine's internal shared state so the registry never needs to know
/// about generators, events, or sinks.
pub trait Controllable: Send + Sync {
    fn clear(&self);
    fn stop(&self);
}

pub struct EngineRegistry {
    engines: Mutex<Vec<Arc<dyn Controllable>>>,
}

impl EngineRegistry {
    fn new() -> Self {
        Self {
            engines: Mutex::new(Vec::new()),
        }
    }

    pub fn register(&self, engine: Arc<dyn Controllable>) {
        self.engines.lock().unwrap().push(engine);
    }

    /// Clears then stops every registered engine, but keeps the handles
    /// registered.
    pub fn kill_all(&self) {
        for engine in self.engines.lock().unwrap().iter() {
            engine.clear();
            engine.stop();
        }
    }

    /// `kill_all`, and additionally forgets every handle. Callers must not
    /// reuse engine handles obtained before this call.
    pub fn clear_all_engines(&self) {
        let mut engines = self.engines.lock().unwrap();
        for engine in engines.iter() {
            engine.clear();
            engine.stop();
        }
        engines.clear();
    }

    pub fn len(&self) -> usize {
        self.engines.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static REGISTRY: OnceLock<EngineRegistry> = OnceLock::new();

pub fn global_registry() -> &'static EngineRegistry {
    REGISTRY.get_or_init(EngineRegistry::new)
}
