//! File-backed durable store.
//!
//! The desktop host's implementation of the durable capability: one JSON
//! document per record kind under the Murmur data directory, written
//! atomically.

use std::path::{Path, PathBuf};

use serde_json::Value;

use murmur_core::error::Result;
use murmur_core::storage::DurableStore;

use crate::paths::MurmurPaths;
use crate::storage::AtomicJsonFile;

/// Durable store persisting each kind to `<base_dir>/{kind}.json`.
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at the given directory, creating it if
    /// needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Creates a store at the default platform location.
    pub fn default_location() -> Result<Self> {
        Self::new(MurmurPaths::store_dir()?)
    }

    /// Opens the store directory in the platform file manager.
    pub fn open_storage_directory(&self) -> Result<()> {
        MurmurPaths::open_directory(&self.base_dir)
    }

    fn document(&self, kind: &str) -> AtomicJsonFile<Value> {
        AtomicJsonFile::new(self.base_dir.join(format!("{}.json", kind)))
    }
}

#[async_trait::async_trait]
impl DurableStore for JsonFileStore {
    fn is_available(&self) -> bool {
        true
    }

    async fn load(&self, kind: &str) -> Result<Option<Value>> {
        self.document(kind).load()
    }

    async fn save(&self, kind: &str, records: &Value) -> Result<()> {
        self.document(kind).save(records)
    }

    fn storage_path(&self) -> Option<PathBuf> {
        Some(self.base_dir.clone())
    }
}
