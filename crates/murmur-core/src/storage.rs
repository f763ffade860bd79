//! Backing store capability traits.
//!
//! Each record store synchronizes its in-memory collection with two backing
//! stores of different durability and availability:
//!
//! - a **durable store**: a filesystem-backed path provided by the desktop
//!   host, which may be absent in a restricted runtime;
//! - a **key-value store**: a lightweight string store guaranteed available
//!   in any host (the desktop analog of browser local storage).
//!
//! Hosts that have no durable capability select [`NullDurableStore`] at
//! startup instead of probing for the capability at every call site.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde_json::Value;

use crate::error::{MurmurError, Result};

/// An abstract durable, file-backed persistence capability.
///
/// Implementations store one JSON document per record kind. Callers check
/// [`is_available`](DurableStore::is_available) before issuing I/O; an
/// unavailable capability is a normal state, not an error.
#[async_trait::async_trait]
pub trait DurableStore: Send + Sync {
    /// Whether this capability can serve load/save calls at all.
    fn is_available(&self) -> bool;

    /// Loads the persisted document for `kind`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))`: a document exists for this kind
    /// - `Ok(None)`: nothing has been persisted for this kind yet
    /// - `Err(MurmurError)`: the document could not be read or parsed
    async fn load(&self, kind: &str) -> Result<Option<Value>>;

    /// Persists the document for `kind`, replacing any previous one.
    async fn save(&self, kind: &str, records: &Value) -> Result<()>;

    /// The directory this capability persists into, if it has one.
    fn storage_path(&self) -> Option<PathBuf>;
}

/// An abstract lightweight key-value persistence capability.
///
/// Keys are namespaced per record kind by the caller. All operations are
/// synchronous; implementations are expected to be cheap.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value for `key`, or `None` if absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key` if present.
    fn remove(&self, key: &str) -> Result<()>;
}

/// The null durable capability: always unavailable.
///
/// Selected at startup when the application runs without a desktop host,
/// so stores transparently fall through to key-value-only behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDurableStore;

#[async_trait::async_trait]
impl DurableStore for NullDurableStore {
    fn is_available(&self) -> bool {
        false
    }

    async fn load(&self, _kind: &str) -> Result<Option<Value>> {
        Err(MurmurError::unavailable("no durable store in this host"))
    }

    async fn save(&self, _kind: &str, _records: &Value) -> Result<()> {
        Err(MurmurError::unavailable("no durable store in this host"))
    }

    fn storage_path(&self) -> Option<PathBuf> {
        None
    }
}

/// An in-memory key-value store.
///
/// Backs the stores in hosts without any filesystem access and keeps unit
/// tests free of I/O.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| MurmurError::io("key-value store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| MurmurError::io("key-value store lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_kv_roundtrip() {
        let store = MemoryKeyValueStore::new();
        assert!(store.get("missing").is_none());

        store.set("murmur-client-sessions", "[]").unwrap();
        assert_eq!(
            store.get("murmur-client-sessions").as_deref(),
            Some("[]")
        );

        store.remove("murmur-client-sessions").unwrap();
        assert!(store.get("murmur-client-sessions").is_none());
    }

    #[tokio::test]
    async fn test_null_durable_store_reports_unavailable() {
        let store = NullDurableStore;
        assert!(!store.is_available());
        assert!(store.load("sessions").await.is_err());
        assert!(store.storage_path().is_none());
    }
}
