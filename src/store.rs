use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

// ── Store contract ────────────────────────────────────────────────────────────

/// Durable key-value store for preference fields.
///
/// `get` distinguishes an absent key from a present one, which is what lets
/// the engine keep compiled-in defaults for keys that were never written.
/// `set` is infallible from the caller's side; a backend that cannot persist
/// swallows the failure and stays authoritative in memory. `flush` is the
/// best-effort end-of-save write, a no-op for in-memory backends.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn flush(&mut self) {}
}

// ── JSON helpers ──────────────────────────────────────────────────────────────

fn load_document(path: &Path) -> Map<String, Value> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str::<Value>(&s).ok())
        .and_then(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default()
}

fn save_document(path: &Path, map: &Map<String, Value>) -> Result<()> {
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let json = serde_json::to_string_pretty(map)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

// ── File-backed store ─────────────────────────────────────────────────────────

/// All keys in one JSON object document on disk. Missing or corrupt files
/// load as an empty map; write failures are swallowed and the in-memory map
/// stays authoritative until the next flush attempt.
pub struct FileStore {
    path: PathBuf,
    map: Map<String, Value>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> FileStore {
        let path = path.into();
        let map = load_document(&path);
        FileStore { path, map }
    }

    /// The per-user settings file: `<config_dir>/flipclock/settings.json`.
    pub fn open_default() -> FileStore {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        FileStore::open(base.join("flipclock").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.map.insert(key.to_string(), value);
    }

    fn flush(&mut self) {
        let _ = save_document(&self.path, &self.map);
    }
}

// ── In-memory store ───────────────────────────────────────────────────────────

/// Map-backed store for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    map: Map<String, Value>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Snapshot of the whole document, for round-trip assertions.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.map.clone()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.map.insert(key.to_string(), value);
    }
}

// ── Shared handle ─────────────────────────────────────────────────────────────

/// Lets a host keep a handle to the same backing store the engine owns,
/// e.g. to inspect persisted state or hand the store to a second engine.
impl<S: SettingsStore> SettingsStore for std::rc::Rc<std::cell::RefCell<S>> {
    fn get(&self, key: &str) -> Option<Value> {
        self.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.borrow_mut().set(key, value);
    }

    fn contains(&self, key: &str) -> bool {
        self.borrow().contains(key)
    }

    fn flush(&mut self) {
        self.borrow_mut().flush();
    }
}
