//! Persistence outcome events.
//!
//! Stores persist on every mutation with fire-and-forget semantics: a failed
//! write never fails the mutation that triggered it. The events in this
//! module are the observable side channel for those outcomes, so callers
//! (and tests) can detect write failures without changing the non-blocking
//! default.

use serde::{Deserialize, Serialize};

/// Which of the two backing stores an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreTarget {
    /// The durable file-backed store provided by the desktop host.
    Durable,
    /// The lightweight key-value store (always available).
    KeyValue,
}

/// Outcome of a single persistence write.
///
/// One event is emitted per backing store per `save()`. Subscribing is
/// opt-in; events sent with no subscribers are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceEvent {
    /// Record kind the write was for (e.g. "sessions").
    pub kind: String,
    /// Backing store that was written.
    pub target: StoreTarget,
    /// Failure message, `None` when the write succeeded.
    pub error: Option<String>,
}

impl PersistenceEvent {
    pub fn success(kind: impl Into<String>, target: StoreTarget) -> Self {
        Self {
            kind: kind.into(),
            target,
            error: None,
        }
    }

    pub fn failure(
        kind: impl Into<String>,
        target: StoreTarget,
        error: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            target,
            error: Some(error.into()),
        }
    }

    /// Returns `true` if the write succeeded.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}
