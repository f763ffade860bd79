//! File-backed key-value store.
//!
//! The desktop stand-in for browser local storage: a single JSON map file,
//! cached in memory and rewritten atomically on every change.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;

use murmur_core::error::{MurmurError, Result};
use murmur_core::storage::KeyValueStore;

use crate::paths::MurmurPaths;
use crate::storage::AtomicJsonFile;

type KvMap = BTreeMap<String, String>;

/// Key-value store persisting to one JSON map file.
pub struct FileKeyValueStore {
    file: AtomicJsonFile<KvMap>,
    cache: RwLock<KvMap>,
}

impl FileKeyValueStore {
    /// Opens (or creates) the store at the given path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = AtomicJsonFile::new(path.as_ref().to_path_buf());
        let cache = file.load()?.unwrap_or_default();
        Ok(Self {
            file,
            cache: RwLock::new(cache),
        })
    }

    /// Opens the store at the default platform location.
    pub fn default_location() -> Result<Self> {
        Self::new(MurmurPaths::key_value_file()?)
    }

    fn with_entries<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut KvMap),
    {
        let mut entries = self
            .cache
            .write()
            .map_err(|_| MurmurError::io("key-value store lock poisoned"))?;
        f(&mut entries);
        self.file.save(&entries)
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.cache
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }
}
