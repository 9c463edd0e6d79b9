//! Key-value storage capability
//!
//! The engine persists auto-save snapshots and the clipboard through this
//! minimal interface so its logic is unit-testable without a browser-like
//! environment. [`MemoryStore`] backs tests and embeddings without durable
//! state; [`DirStore`] keeps one file per key under a directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The medium is out of capacity. Auto-save reacts by evicting old
    /// snapshots and retrying once.
    #[error("storage quota exceeded while writing '{key}'")]
    QuotaExceeded { key: String },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Minimal key-value capability: get/set/remove/list.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str);
    fn list_keys(&self) -> Vec<String>;

    /// Probe that the medium is writable. Default implementation writes and
    /// removes a throwaway key.
    fn is_writable(&mut self) -> bool {
        const PROBE_KEY: &str = "__storage_probe__";
        match self.set(PROBE_KEY, "probe") {
            Ok(()) => {
                self.remove(PROBE_KEY);
                true
            }
            Err(_) => false,
        }
    }
}

/// In-memory store with an optional byte capacity so quota handling can be
/// exercised in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    capacity_bytes: Option<usize>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once total stored bytes would exceed
    /// `capacity_bytes`.
    pub fn with_capacity(capacity_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity_bytes: Some(capacity_bytes),
            read_only: false,
        }
    }

    /// Store that refuses all writes, for exercising the writability probe.
    pub fn read_only() -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity_bytes: None,
            read_only: true,
        }
    }

    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable("read-only store".to_string()));
        }
        if let Some(capacity) = self.capacity_bytes {
            let used = self.used_bytes_excluding(key);
            if used + key.len() + value.len() > capacity {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn list_keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Directory-backed store: one file per key. Keys are restricted to
/// `[A-Za-z0-9_-]` to keep file names safe.
#[derive(Debug)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            log::warn!("rejecting unsafe storage key '{}'", key);
            return None;
        }
        Some(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for DirStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key)?;
        fs::read_to_string(path).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self
            .path_for(key)
            .ok_or_else(|| StorageError::Unavailable(format!("unsafe key '{key}'")))?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        if let Some(path) = self.path_for(key) {
            let _ = fs::remove_file(path);
        }
    }

    fn list_keys(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut keys: Vec<String> = entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? != "json" {
                    return None;
                }
                Some(path.file_stem()?.to_string_lossy().into_owned())
            })
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.get("a").is_none());
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        store.remove("a");
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_memory_store_quota() {
        let mut store = MemoryStore::with_capacity(10);
        store.set("a", "12345").unwrap();
        let err = store.set("b", "123456789").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        // Overwriting an existing key only counts the new value.
        store.set("a", "1234").unwrap();
    }

    #[test]
    fn test_read_only_store_fails_probe() {
        let mut store = MemoryStore::read_only();
        assert!(!store.is_writable());
        let mut writable = MemoryStore::new();
        assert!(writable.is_writable());
        assert!(writable.list_keys().is_empty());
    }

    #[test]
    fn test_dir_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirStore::new(dir.path()).unwrap();
        store.set("autosave_1", "{}").unwrap();
        store.set("clipboard", "[]").unwrap();
        assert_eq!(store.get("autosave_1").as_deref(), Some("{}"));
        assert_eq!(store.list_keys(), vec!["autosave_1", "clipboard"]);
        store.remove("autosave_1");
        assert!(store.get("autosave_1").is_none());
    }

    #[test]
    fn test_dir_store_rejects_unsafe_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirStore::new(dir.path()).unwrap();
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("../escape").is_none());
    }
}
