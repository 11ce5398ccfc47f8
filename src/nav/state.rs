//! Persisted expand/collapse state.
//!
//! Two fixed keys are written to a [`KeyValueStore`]: the panel collapse flag
//! as `"true"`/`"false"` and a JSON object mapping folder keys to booleans.
//! Any storage failure switches the store to in-memory operation for the rest
//! of the session; it is logged once and never surfaced.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::NavConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError {
    pub message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "storage unavailable: {}", self.message)
    }
}

impl std::error::Error for StorageError {}

/// Durable string key/value capability. Either call may fail.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local store. Clones share the same map, so a test can keep a
/// handle and read back what the panel persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    unavailable: Arc<std::sync::atomic::AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (quota exceeded, storage disabled).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable
            .store(unavailable, std::sync::atomic::Ordering::Relaxed);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable.load(std::sync::atomic::Ordering::Relaxed) {
            Err(StorageError::new("memory store disabled"))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::new("memory store poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::new("memory store poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by one JSON object file (`{"key": "value", ...}`).
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<platform data dir>/navtree/state.json`.
    pub fn default_location() -> Option<Self> {
        let dirs = directories::ProjectDirs::from("", "", "navtree")?;
        Some(Self::new(dirs.data_dir().join("state.json")))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| StorageError::new(format!("{}: {}", self.path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StorageError::new(format!("{}: {}", self.path.display(), e))),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        let text = serde_json::to_string_pretty(&entries)
            .map_err(|e| StorageError::new(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::new(format!("{}: {}", parent.display(), e)))?;
        }
        std::fs::write(&self.path, text)
            .map_err(|e| StorageError::new(format!("{}: {}", self.path.display(), e)))
    }
}

/// Serializable projection of every folder's expand flag plus the panel flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeState {
    pub sidebar_collapsed: bool,
    /// Folder key → expanded. Keys absent here use the folder's declared default.
    pub node_expanded: BTreeMap<String, bool>,
}

/// Tree state with write-through persistence and fail-soft degradation.
pub struct TreeStateStore {
    backend: Option<Box<dyn KeyValueStore>>,
    collapsed_key: String,
    folders_key: String,
    state: TreeState,
}

impl TreeStateStore {
    /// Restore from `backend`. Unreadable storage degrades to defaults.
    pub fn open(backend: Box<dyn KeyValueStore>, config: &NavConfig) -> Self {
        let mut store = Self {
            backend: Some(backend),
            collapsed_key: config.collapsed_key.clone(),
            folders_key: config.folders_key.clone(),
            state: TreeState::default(),
        };
        store.restore();
        store
    }

    /// Store that never persists.
    pub fn in_memory(config: &NavConfig) -> Self {
        Self {
            backend: None,
            collapsed_key: config.collapsed_key.clone(),
            folders_key: config.folders_key.clone(),
            state: TreeState::default(),
        }
    }

    fn restore(&mut self) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        let loaded = backend
            .get(&self.collapsed_key)
            .and_then(|collapsed| Ok((collapsed, backend.get(&self.folders_key)?)));

        match loaded {
            Ok((collapsed, folders)) => {
                self.state.sidebar_collapsed = collapsed.as_deref() == Some("true");
                if let Some(raw) = folders {
                    match serde_json::from_str::<BTreeMap<String, bool>>(&raw) {
                        Ok(map) => self.state.node_expanded = map,
                        Err(e) => log::debug!("ignoring malformed folder state: {}", e),
                    }
                }
            }
            Err(e) => self.degrade(e),
        }
    }

    fn degrade(&mut self, e: StorageError) {
        log::warn!("{}; tree state will not persist this session", e);
        self.backend = None;
    }

    /// Whether writes still reach durable storage.
    pub fn is_persistent(&self) -> bool {
        self.backend.is_some()
    }

    pub fn state(&self) -> &TreeState {
        &self.state
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.state.sidebar_collapsed
    }

    /// Stored flag for `key`, else `default` (the folder's start-open flag).
    pub fn is_expanded(&self, key: &str, default: bool) -> bool {
        self.state.node_expanded.get(key).copied().unwrap_or(default)
    }

    pub fn set_expanded(&mut self, key: &str, expanded: bool) {
        self.state.node_expanded.insert(key.to_string(), expanded);
        self.persist_folders();
    }

    /// Set every listed folder at once; one write.
    pub fn set_all<'k, I>(&mut self, keys: I, expanded: bool)
    where
        I: IntoIterator<Item = &'k str>,
    {
        for key in keys {
            self.state.node_expanded.insert(key.to_string(), expanded);
        }
        self.persist_folders();
    }

    pub fn set_sidebar_collapsed(&mut self, collapsed: bool) {
        self.state.sidebar_collapsed = collapsed;
        let key = self.collapsed_key.clone();
        self.write(&key, if collapsed { "true" } else { "false" });
    }

    fn persist_folders(&mut self) {
        match serde_json::to_string(&self.state.node_expanded) {
            Ok(json) => {
                let key = self.folders_key.clone();
                self.write(&key, &json);
            }
            Err(e) => log::debug!("folder state not serializable: {}", e),
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        if let Err(e) = backend.set(key, value) {
            self.degrade(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> NavConfig {
        NavConfig::default()
    }

    #[test]
    fn restores_persisted_values() {
        let mem = MemoryStore::new();
        mem.set("sb-collapsed", "true").unwrap();
        mem.set("sb-folders", r#"{"/writeups/":true,"/blog/":false}"#).unwrap();

        let store = TreeStateStore::open(Box::new(mem), &config());
        assert!(store.sidebar_collapsed());
        assert!(store.is_expanded("/writeups/", false));
        assert!(!store.is_expanded("/blog/", true));
        assert!(store.is_expanded("/unknown/", true));
        assert!(store.is_persistent());
    }

    #[test]
    fn writes_through_on_every_mutation() {
        let mem = MemoryStore::new();
        let mut store = TreeStateStore::open(Box::new(mem.clone()), &config());

        store.set_expanded("/a/", true);
        assert_eq!(mem.get("sb-folders").unwrap().as_deref(), Some(r#"{"/a/":true}"#));

        store.set_all(["/a/", "/b/"], false);
        assert_eq!(
            mem.get("sb-folders").unwrap().as_deref(),
            Some(r#"{"/a/":false,"/b/":false}"#)
        );

        store.set_sidebar_collapsed(true);
        assert_eq!(mem.get("sb-collapsed").unwrap().as_deref(), Some("true"));
        store.set_sidebar_collapsed(false);
        assert_eq!(mem.get("sb-collapsed").unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn unavailable_storage_degrades_to_defaults() {
        let mem = MemoryStore::new();
        mem.set("sb-collapsed", "true").unwrap();
        mem.set_unavailable(true);

        let mut store = TreeStateStore::open(Box::new(mem.clone()), &config());
        assert!(!store.sidebar_collapsed());
        assert!(!store.is_persistent());

        store.set_expanded("/a/", true);
        assert!(store.is_expanded("/a/", false));
        mem.set_unavailable(false);
        assert_eq!(mem.get("sb-folders").unwrap(), None);
    }

    #[test]
    fn failing_write_keeps_state_in_memory() {
        let mem = MemoryStore::new();
        let mut store = TreeStateStore::open(Box::new(mem.clone()), &config());
        mem.set_unavailable(true);
        store.set_expanded("/a/", false);
        assert!(!store.is_persistent());
        assert!(!store.is_expanded("/a/", true));
    }

    #[test]
    fn malformed_folder_map_is_ignored() {
        let mem = MemoryStore::new();
        mem.set("sb-folders", "[1,2").unwrap();
        let store = TreeStateStore::open(Box::new(mem), &config());
        assert!(store.state().node_expanded.is_empty());
        assert!(store.is_persistent());
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileStore::new(dir.path().join("nested/state.json"));
        assert_eq!(file.get("sb-collapsed").unwrap(), None);

        let mut store = TreeStateStore::open(Box::new(file.clone()), &config());
        store.set_expanded("/writeups/", true);
        store.set_sidebar_collapsed(true);

        let reopened = TreeStateStore::open(Box::new(file), &config());
        assert!(reopened.sidebar_collapsed());
        assert!(reopened.is_expanded("/writeups/", false));
    }

    #[test]
    fn corrupt_state_file_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        let store = TreeStateStore::open(Box::new(FileStore::new(path)), &config());
        assert!(!store.is_persistent());
        assert_eq!(store.state(), &TreeState::default());
    }
}
