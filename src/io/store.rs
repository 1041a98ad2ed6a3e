use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::io::atomic_write_string;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("store parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// String key-value storage for view-state slices. Reads never fail from
/// the caller's point of view; writes report errors so the caller can
/// decide to drop them.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// All keys live in one pretty-printed JSON object on disk. Every write
/// rewrites the file atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(entries)?;
        atomic_write_string(&self.path, &content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(entries) => entries.get(key).cloned(),
            Err(err) => {
                debug!(path = %self.path.display(), %err, "view store unreadable");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking every future write.
        let mut entries = self.read_all().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all().unwrap_or_default();
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Reads and decodes one slice. Missing or corrupt data yields `None`.
pub fn load_slice<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(key, %err, "ignoring corrupt view-state slice");
            None
        }
    }
}

/// Encodes and writes one slice. Failures are logged and dropped.
pub fn save_slice<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(StoreError::from)
        .and_then(|raw| store.set(key, &raw));
    if let Err(err) = result {
        debug!(key, %err, "view-state slice not persisted");
    }
}

pub fn clear_slice(store: &dyn KeyValueStore, key: &str) {
    if let Err(err) = store.remove(key) {
        debug!(key, %err, "view-state slice not cleared");
    }
}
