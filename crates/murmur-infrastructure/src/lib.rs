//! Infrastructure layer for the Murmur store stack.
//!
//! Concrete implementations of the backing-store capabilities defined in
//! `murmur-core`:
//!
//! - [`JsonFileStore`]: the durable capability, one atomically-written
//!   JSON document per record kind under the platform data directory.
//! - [`FileKeyValueStore`]: the lightweight capability, a single JSON map
//!   file standing in for browser local storage.
//! - [`transfer`]: portable JSON export/import with date-stamped filenames.
//!
//! Hosts wire these into the core stores at startup; restricted runtimes
//! inject `murmur_core::NullDurableStore` instead of [`JsonFileStore`].

pub mod file_store;
pub mod kv_store;
pub mod paths;
pub mod storage;
pub mod transfer;

pub use file_store::JsonFileStore;
pub use kv_store::FileKeyValueStore;
pub use paths::MurmurPaths;
