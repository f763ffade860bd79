//! Record identity and timestamp helpers shared by all store kinds.

use rand::{Rng, distributions::Alphanumeric};
use serde::{Serialize, de::DeserializeOwned};

/// A record that can live in a [`RecordStore`](crate::store::RecordStore).
///
/// Implemented by the persisted collection kinds (sessions, prompts, model
/// configs). Messages are embedded inside a session and are not records in
/// their own right.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable kind name, used for key-value namespacing, durable store
    /// addressing, and export file names (e.g. "sessions").
    const KIND: &'static str;

    /// The record's unique identifier within its collection.
    fn id(&self) -> &str;

    /// Restamps the record's last-updated timestamp.
    ///
    /// Implementations should use [`advance`] so that consecutive mutations
    /// within the same millisecond still produce strictly increasing
    /// timestamps.
    fn touch(&mut self, now_ms: i64);
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generates a fresh record identifier: `{prefix}-{epoch_ms}-{suffix}`.
///
/// Time-based so identifiers sort roughly by creation time; the random
/// six-character suffix avoids collisions within the same millisecond.
pub fn fresh_id(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("{}-{}-{}", prefix, now_millis(), suffix.to_lowercase())
}

/// Returns an updated-at timestamp that is strictly greater than `previous`.
///
/// The wall clock only has millisecond resolution, so two mutations in the
/// same instant would otherwise produce equal timestamps.
pub fn advance(previous: i64, now: i64) -> i64 {
    now.max(previous + 1)
}
