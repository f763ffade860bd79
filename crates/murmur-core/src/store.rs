//! Generic persistent record store.
//!
//! `RecordStore` owns one in-memory ordered collection of records of a
//! single kind and keeps it synchronized with two backing stores: a durable
//! file-backed store (may be absent) and a lightweight key-value store
//! (always available). The per-kind stores (sessions, prompts, model
//! configs) are thin wrappers around this type.
//!
//! # Synchronization contract
//!
//! - `load()` adopts exactly one source: a non-empty durable read wins and
//!   is mirrored into the key-value store as a backup; otherwise the
//!   key-value store is read; otherwise a default collection is used. The
//!   two sources are never merged.
//! - `save()` serializes the current collection synchronously, writes the
//!   key-value store first (store-of-record for availability), then mirrors
//!   to the durable store best-effort. Failures are logged, reported on the
//!   event channel, and never surfaced to the mutating caller.
//!
//! Every mutation triggers a full-collection save. Collections are expected
//! to stay in the low hundreds of records; there is no batching.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::Result;
use crate::event::{PersistenceEvent, StoreTarget};
use crate::record::{Record, now_millis};
use crate::storage::{DurableStore, KeyValueStore};

/// Capacity of the persistence event channel. Events are best-effort;
/// slow subscribers simply lag.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Where a newly created record lands in the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Newest-first collections (sessions, prompts).
    Head,
    /// Append-order collections (model configs).
    Tail,
}

/// An in-memory ordered collection of records, synchronized with two
/// backing stores of different durability.
pub struct RecordStore<R: Record> {
    records: Vec<R>,
    durable: Arc<dyn DurableStore>,
    kv: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<PersistenceEvent>,
}

impl<R: Record> RecordStore<R> {
    /// Creates an empty store with injected backing capabilities.
    ///
    /// The collection is empty until [`load`](Self::load) is called.
    pub fn new(durable: Arc<dyn DurableStore>, kv: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            records: Vec::new(),
            durable,
            kv,
            events,
        }
    }

    /// The key this kind's collection is stored under in the key-value store.
    pub fn kv_key() -> String {
        format!("murmur-client-{}", R::KIND)
    }

    /// Subscribes to persistence outcome events.
    pub fn subscribe(&self) -> broadcast::Receiver<PersistenceEvent> {
        self.events.subscribe()
    }

    /// The current in-memory collection, in storage order.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Finds a record by identifier.
    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// The directory the durable capability persists into, if any.
    pub fn storage_path(&self) -> Option<std::path::PathBuf> {
        self.durable.storage_path()
    }

    /// Populates the collection from the backing stores.
    ///
    /// Equivalent to [`load_with_default`](Self::load_with_default) with an
    /// empty default.
    pub async fn load(&mut self) {
        self.load_with_default(Vec::new).await;
    }

    /// Populates the collection, falling back to `default` when neither
    /// backing store yields data.
    ///
    /// Source policy, in strict order:
    ///
    /// 1. If the durable store is available and returns a **non-empty**
    ///    collection, adopt it and mirror it into the key-value store.
    ///    An empty durable result does not win over the fallback.
    /// 2. Otherwise adopt the key-value store's collection if present.
    /// 3. Otherwise use `default()`; a non-empty default is immediately
    ///    persisted.
    ///
    /// Whichever source wins becomes the sole truth for this load; the
    /// other store is overwritten to match on the next save. Read failures
    /// are logged and treated as absent data.
    pub async fn load_with_default<F>(&mut self, default: F)
    where
        F: FnOnce() -> Vec<R>,
    {
        if self.durable.is_available() {
            match self.durable.load(R::KIND).await {
                Ok(Some(value)) => match serde_json::from_value::<Vec<R>>(value) {
                    Ok(records) if !records.is_empty() => {
                        debug!(
                            kind = R::KIND,
                            count = records.len(),
                            "loaded collection from durable store"
                        );
                        self.records = records;
                        self.mirror_to_kv();
                        return;
                    }
                    Ok(_) => {
                        debug!(kind = R::KIND, "durable store empty, trying key-value store");
                    }
                    Err(e) => {
                        warn!(kind = R::KIND, error = %e, "malformed durable data, trying key-value store");
                    }
                },
                Ok(None) => {
                    debug!(kind = R::KIND, "no durable data, trying key-value store");
                }
                Err(e) => {
                    warn!(kind = R::KIND, error = %e, "durable load failed, trying key-value store");
                }
            }
        }

        if let Some(saved) = self.kv.get(&Self::kv_key()) {
            match serde_json::from_str::<Vec<R>>(&saved) {
                Ok(records) => {
                    debug!(
                        kind = R::KIND,
                        count = records.len(),
                        "loaded collection from key-value store"
                    );
                    self.records = records;
                    return;
                }
                Err(e) => {
                    warn!(kind = R::KIND, error = %e, "malformed key-value data, using default");
                }
            }
        }

        self.records = default();
        if !self.records.is_empty() {
            debug!(
                kind = R::KIND,
                count = self.records.len(),
                "initialized collection with built-in defaults"
            );
            self.save().await;
        }
    }

    /// Persists the current collection to both backing stores.
    ///
    /// The key-value store is written first and is the store-of-record for
    /// availability; the durable store is a best-effort mirror. Neither
    /// failure is surfaced to the caller; both outcomes are emitted on the
    /// event channel.
    pub async fn save(&self) {
        // Snapshot the collection synchronously so sequential saves observe
        // mutation order regardless of when the async mirror completes.
        let value = match serde_json::to_value(&self.records) {
            Ok(value) => value,
            Err(e) => {
                warn!(kind = R::KIND, error = %e, "failed to serialize collection, nothing persisted");
                self.emit(StoreTarget::KeyValue, Some(e.to_string()));
                return;
            }
        };

        match self.kv.set(&Self::kv_key(), &value.to_string()) {
            Ok(()) => self.emit(StoreTarget::KeyValue, None),
            Err(e) => {
                warn!(kind = R::KIND, error = %e, "key-value save failed");
                self.emit(StoreTarget::KeyValue, Some(e.to_string()));
            }
        }

        if self.durable.is_available() {
            match self.durable.save(R::KIND, &value).await {
                Ok(()) => self.emit(StoreTarget::Durable, None),
                Err(e) => {
                    warn!(kind = R::KIND, error = %e, "durable save failed, key-value copy is current");
                    self.emit(StoreTarget::Durable, Some(e.to_string()));
                }
            }
        }
    }

    /// Inserts a record at the given position and persists.
    pub async fn insert(&mut self, record: R, position: InsertPosition) {
        match position {
            InsertPosition::Head => self.records.insert(0, record),
            InsertPosition::Tail => self.records.push(record),
        }
        self.save().await;
    }

    /// Applies `f` to the record with the given identifier, restamps its
    /// `updatedAt`, and persists.
    ///
    /// A silent no-op when the identifier is unknown; the `bool` return
    /// exists so wrappers and tests can observe that, but it is not an
    /// error.
    pub async fn update_with<F>(&mut self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut R),
    {
        let Some(record) = self.records.iter_mut().find(|r| r.id() == id) else {
            return false;
        };
        f(record);
        record.touch(now_millis());
        self.save().await;
        true
    }

    /// Applies `f` to every record and persists once.
    ///
    /// Used for collection-wide flag updates (e.g. exclusive default model).
    /// `f` is responsible for calling [`Record::touch`] on records it
    /// actually changes.
    pub async fn mutate_all<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut R),
    {
        for record in &mut self.records {
            f(record);
        }
        self.save().await;
    }

    /// Removes the record with the given identifier and persists.
    ///
    /// A silent no-op when the identifier is unknown.
    pub async fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.records.iter().position(|r| r.id() == id) else {
            return false;
        };
        self.records.remove(index);
        self.save().await;
        true
    }

    /// Replaces the whole collection and persists.
    pub async fn replace_all(&mut self, records: Vec<R>) {
        self.records = records;
        self.save().await;
    }

    /// Appends records to the collection and persists.
    pub async fn append_all(&mut self, records: Vec<R>) {
        self.records.extend(records);
        self.save().await;
    }

    /// Serializes the collection (or the subset named by `ids`) to the
    /// portable export format: a pretty-printed JSON array.
    pub fn export_json(&self, ids: Option<&[String]>) -> Result<String> {
        let subset: Vec<&R> = match ids {
            Some(ids) => self
                .records
                .iter()
                .filter(|r| ids.iter().any(|id| id == r.id()))
                .collect(),
            None => self.records.iter().collect(),
        };
        Ok(serde_json::to_string_pretty(&subset)?)
    }

    /// Parses a portable JSON array into records, without touching the
    /// collection. Kind stores apply their documented import policy
    /// (append or replace) to the result.
    pub fn parse_import(json: &str) -> Result<Vec<R>> {
        Ok(serde_json::from_str(json)?)
    }

    fn mirror_to_kv(&self) {
        match serde_json::to_string(&self.records) {
            Ok(json) => {
                if let Err(e) = self.kv.set(&Self::kv_key(), &json) {
                    warn!(kind = R::KIND, error = %e, "failed to mirror durable data into key-value store");
                }
            }
            Err(e) => {
                warn!(kind = R::KIND, error = %e, "failed to serialize collection for key-value mirror");
            }
        }
    }

    fn emit(&self, target: StoreTarget, error: Option<String>) {
        let event = match error {
            None => PersistenceEvent::success(R::KIND, target),
            Some(message) => PersistenceEvent::failure(R::KIND, target, message),
        };
        // No subscribers is the normal case; drop the event.
        let _ = self.events.send(event);
    }
}
