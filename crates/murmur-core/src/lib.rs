//! Core store layer for Murmur, a desktop chat client for LLM providers.
//!
//! Each record kind (sessions, prompt templates, model configurations) is
//! held in an in-memory ordered collection synchronized with two backing
//! stores: a durable file-backed store provided by the desktop host and a
//! lightweight key-value store that is always available. Settings are a
//! singleton following the same pattern over the key-value store only.
//!
//! Backing stores are injected as capability trait objects
//! ([`storage::DurableStore`], [`storage::KeyValueStore`]); hosts without a
//! durable capability inject [`storage::NullDurableStore`]. Concrete
//! filesystem implementations live in the `murmur-infrastructure` crate.

pub mod error;
pub mod event;
pub mod model_config;
pub mod prompt;
pub mod record;
pub mod session;
pub mod settings;
pub mod storage;
pub mod store;

// Re-export common error type
pub use error::{MurmurError, Result};
pub use event::{PersistenceEvent, StoreTarget};
pub use record::Record;
pub use storage::{DurableStore, KeyValueStore, MemoryKeyValueStore, NullDurableStore};
pub use store::{InsertPosition, RecordStore};
