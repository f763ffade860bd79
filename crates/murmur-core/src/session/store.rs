//! Persistent session store.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::Result;
use crate::event::PersistenceEvent;
use crate::record::{fresh_id, now_millis};
use crate::storage::{DurableStore, KeyValueStore};
use crate::store::{InsertPosition, RecordStore};

use super::filter::SessionFilter;
use super::model::{ChatMessage, MessageDraft, Role, Session, SessionPatch};

/// Aggregate counters over the whole session collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub active_sessions: usize,
    pub archived_sessions: usize,
    pub starred_sessions: usize,
    pub total_tokens: u64,
    pub total_messages: usize,
    pub average_messages_per_session: usize,
}

/// Owns the session collection and the "current session" pointer.
///
/// All mutations persist through the underlying [`RecordStore`]; persistence
/// failures never surface here (see the store's event channel).
pub struct SessionStore {
    inner: RecordStore<Session>,
    current_id: Option<String>,
}

impl SessionStore {
    pub fn new(durable: Arc<dyn DurableStore>, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: RecordStore::new(durable, kv),
            current_id: None,
        }
    }

    /// Populates the collection from the backing stores.
    pub async fn load(&mut self) {
        self.inner.load().await;
    }

    /// Subscribes to persistence outcome events.
    pub fn subscribe(&self) -> broadcast::Receiver<PersistenceEvent> {
        self.inner.subscribe()
    }

    pub fn sessions(&self) -> &[Session] {
        self.inner.records()
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.inner.get(id)
    }

    /// The currently active session, if any.
    pub fn current(&self) -> Option<&Session> {
        self.current_id.as_deref().and_then(|id| self.inner.get(id))
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    /// Makes the session with the given identifier current. Ignored when
    /// the identifier is unknown.
    pub fn set_current(&mut self, id: &str) {
        if self.inner.get(id).is_some() {
            self.current_id = Some(id.to_string());
        }
    }

    /// Creates a session, makes it current, and persists.
    ///
    /// New sessions are prepended: the collection is newest-first.
    pub async fn create(
        &mut self,
        title: impl Into<String>,
        model: impl Into<String>,
        description: Option<String>,
    ) -> Session {
        let now = now_millis();
        let session = Session {
            id: fresh_id("session"),
            title: title.into(),
            description,
            model: model.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
            is_starred: false,
            is_archived: false,
            total_tokens: 0,
            message_count: 0,
        };
        self.current_id = Some(session.id.clone());
        self.inner.insert(session.clone(), InsertPosition::Head).await;
        session
    }

    /// Shallow-merges `patch` over the session and restamps `updatedAt`.
    /// Silent no-op when the identifier is unknown.
    pub async fn update(&mut self, id: &str, patch: SessionPatch) {
        self.inner.update_with(id, |session| patch.apply(session)).await;
    }

    /// Deletes the session. When it was current, the pointer is reassigned
    /// to the head of the remaining collection, or cleared when the
    /// collection becomes empty. Silent no-op when the identifier is
    /// unknown.
    pub async fn delete(&mut self, id: &str) {
        if self.inner.remove(id).await && self.current_id.as_deref() == Some(id) {
            self.current_id = self.inner.records().first().map(|s| s.id.clone());
        }
    }

    /// Appends a message to the session and persists.
    ///
    /// Updates the message count and the running token total. When this is
    /// the session's first message and it comes from the user, the session
    /// title is derived from the message content.
    ///
    /// Returns the stored message, or `None` when the session is unknown.
    pub async fn add_message(&mut self, session_id: &str, draft: MessageDraft) -> Option<ChatMessage> {
        let message = ChatMessage {
            id: fresh_id("msg"),
            role: draft.role,
            content: draft.content,
            timestamp: now_millis(),
            model: draft.model,
            tokens: draft.tokens,
        };
        let stored = message.clone();
        let updated = self
            .inner
            .update_with(session_id, |session| {
                session.messages.push(message);
                session.message_count = session.messages.len();
                if let Some(tokens) = stored.tokens {
                    session.total_tokens += tokens;
                }
                if session.messages.len() == 1 && stored.role == Role::User {
                    session.title = Session::title_from_content(&stored.content);
                }
            })
            .await;
        updated.then_some(stored)
    }

    /// Removes a message from the session, reversing its contribution to
    /// the counters. Silent no-op when either identifier is unknown; an
    /// unknown message leaves the session untouched and unpersisted.
    pub async fn delete_message(&mut self, session_id: &str, message_id: &str) {
        if !self
            .inner
            .get(session_id)
            .is_some_and(|s| s.messages.iter().any(|m| m.id == message_id))
        {
            return;
        }
        self.inner
            .update_with(session_id, |session| {
                let Some(index) = session.messages.iter().position(|m| m.id == message_id) else {
                    return;
                };
                let removed = session.messages.remove(index);
                session.message_count = session.messages.len();
                if let Some(tokens) = removed.tokens {
                    session.total_tokens = session.total_tokens.saturating_sub(tokens);
                }
            })
            .await;
    }

    pub async fn toggle_star(&mut self, id: &str) {
        self.inner
            .update_with(id, |session| session.is_starred = !session.is_starred)
            .await;
    }

    pub async fn toggle_archive(&mut self, id: &str) {
        self.inner
            .update_with(id, |session| session.is_archived = !session.is_archived)
            .await;
    }

    /// Adds a tag unless the session already carries it.
    pub async fn add_tag(&mut self, id: &str, tag: &str) {
        if self.inner.get(id).is_some_and(|s| s.tags.iter().any(|t| t == tag)) {
            return;
        }
        self.inner
            .update_with(id, |session| session.tags.push(tag.to_string()))
            .await;
    }

    pub async fn remove_tag(&mut self, id: &str, tag: &str) {
        if !self.inner.get(id).is_some_and(|s| s.tags.iter().any(|t| t == tag)) {
            return;
        }
        self.inner
            .update_with(id, |session| session.tags.retain(|t| t != tag))
            .await;
    }

    /// Removes every session and clears the current pointer.
    pub async fn clear_all(&mut self) {
        self.current_id = None;
        self.inner.replace_all(Vec::new()).await;
    }

    // ------------------------------------------------------------------
    // Derived views (pure, recomputed on demand)
    // ------------------------------------------------------------------

    /// Sessions matching `filter`, most recently updated first.
    pub fn filtered(&self, filter: &SessionFilter) -> Vec<&Session> {
        filter.apply(self.inner.records())
    }

    pub fn active(&self) -> Vec<&Session> {
        self.sessions().iter().filter(|s| !s.is_archived).collect()
    }

    pub fn archived(&self) -> Vec<&Session> {
        self.sessions().iter().filter(|s| s.is_archived).collect()
    }

    pub fn starred(&self) -> Vec<&Session> {
        self.sessions().iter().filter(|s| s.is_starred).collect()
    }

    /// Every tag in use, sorted and deduplicated.
    pub fn all_tags(&self) -> Vec<String> {
        let tags: BTreeSet<&str> = self
            .sessions()
            .iter()
            .flat_map(|s| s.tags.iter().map(String::as_str))
            .collect();
        tags.into_iter().map(String::from).collect()
    }

    /// Every model referenced by a session, sorted and deduplicated.
    pub fn all_models(&self) -> Vec<String> {
        let models: BTreeSet<&str> =
            self.sessions().iter().map(|s| s.model.as_str()).collect();
        models.into_iter().map(String::from).collect()
    }

    pub fn total_tokens(&self) -> u64 {
        self.sessions().iter().map(|s| s.total_tokens).sum()
    }

    pub fn total_messages(&self) -> usize {
        self.sessions().iter().map(|s| s.message_count).sum()
    }

    pub fn stats(&self) -> SessionStats {
        let total_sessions = self.sessions().len();
        let total_messages = self.total_messages();
        SessionStats {
            total_sessions,
            active_sessions: self.active().len(),
            archived_sessions: self.archived().len(),
            starred_sessions: self.starred().len(),
            total_tokens: self.total_tokens(),
            total_messages,
            average_messages_per_session: if total_sessions > 0 {
                (total_messages as f64 / total_sessions as f64).round() as usize
            } else {
                0
            },
        }
    }

    // ------------------------------------------------------------------
    // Portable export/import
    // ------------------------------------------------------------------

    /// Serializes the collection (or the subset named by `ids`) to the
    /// portable JSON format.
    pub fn export_json(&self, ids: Option<&[String]>) -> Result<String> {
        self.inner.export_json(ids)
    }

    /// Imports sessions from a portable JSON array. Sessions are APPENDED
    /// to the existing collection. Returns the number imported.
    pub async fn import_json(&mut self, json: &str) -> Result<usize> {
        let imported = RecordStore::<Session>::parse_import(json)?;
        let count = imported.len();
        self.inner.append_all(imported).await;
        Ok(count)
    }

    /// The directory the durable capability persists into, if any.
    pub fn storage_path(&self) -> Option<std::path::PathBuf> {
        self.inner.storage_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryKeyValueStore, NullDurableStore};

    fn store() -> SessionStore {
        SessionStore::new(
            Arc::new(NullDurableStore),
            Arc::new(MemoryKeyValueStore::new()),
        )
    }

    #[tokio::test]
    async fn test_create_prepends_and_becomes_current() {
        let mut sessions = store();
        let first = sessions.create("First", "gpt-4", None).await;
        let second = sessions.create("Second", "gpt-4", None).await;

        assert_eq!(sessions.sessions()[0].id, second.id);
        assert_eq!(sessions.sessions()[1].id, first.id);
        assert_eq!(sessions.current_id(), Some(second.id.as_str()));
        assert!(second.updated_at >= second.created_at);
    }

    #[tokio::test]
    async fn test_first_user_message_sets_title() {
        let mut sessions = store();
        let session = sessions.create("A", "gpt-4", None).await;

        let message = sessions
            .add_message(&session.id, MessageDraft::user("hello"))
            .await
            .unwrap();

        let session = sessions.get(&session.id).unwrap();
        assert_eq!(session.title, "hello");
        assert_eq!(session.message_count, 1);
        assert_eq!(session.messages[0].id, message.id);
    }

    #[tokio::test]
    async fn test_long_first_message_title_is_truncated() {
        let mut sessions = store();
        let session = sessions.create("A", "gpt-4", None).await;
        let content = "a".repeat(60);

        sessions
            .add_message(&session.id, MessageDraft::user(content))
            .await
            .unwrap();

        let title = &sessions.get(&session.id).unwrap().title;
        assert_eq!(title.len(), 53);
        assert!(title.ends_with("..."));
    }

    #[tokio::test]
    async fn test_first_assistant_message_does_not_retitle() {
        let mut sessions = store();
        let session = sessions.create("Kept", "gpt-4", None).await;

        sessions
            .add_message(&session.id, MessageDraft::assistant("hi there", "gpt-4"))
            .await
            .unwrap();

        assert_eq!(sessions.get(&session.id).unwrap().title, "Kept");
    }

    #[tokio::test]
    async fn test_message_tokens_feed_running_totals() {
        let mut sessions = store();
        let session = sessions.create("A", "gpt-4", None).await;

        sessions
            .add_message(&session.id, MessageDraft::user("q").with_tokens(3))
            .await
            .unwrap();
        let answer = sessions
            .add_message(
                &session.id,
                MessageDraft::assistant("a", "gpt-4").with_tokens(7),
            )
            .await
            .unwrap();
        assert_eq!(sessions.get(&session.id).unwrap().total_tokens, 10);

        sessions.delete_message(&session.id, &answer.id).await;
        let session = sessions.get(&session.id).unwrap();
        assert_eq!(session.total_tokens, 3);
        assert_eq!(session.message_count, 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_message_leaves_session_untouched() {
        let mut sessions = store();
        let session = sessions.create("A", "gpt-4", None).await;
        sessions
            .add_message(&session.id, MessageDraft::user("hi").with_tokens(2))
            .await
            .unwrap();
        let before = sessions.get(&session.id).unwrap().clone();

        sessions.delete_message(&session.id, "msg-missing").await;

        let after = sessions.get(&session.id).unwrap();
        assert_eq!(*after, before);
    }

    #[tokio::test]
    async fn test_add_message_to_unknown_session_is_noop() {
        let mut sessions = store();
        let result = sessions
            .add_message("session-missing", MessageDraft::user("hi"))
            .await;
        assert!(result.is_none());
        assert!(sessions.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_delete_current_reassigns_to_head_then_none() {
        let mut sessions = store();
        sessions.create("Oldest", "gpt-4", None).await;
        let current = sessions.create("Current", "gpt-4", None).await;

        sessions.delete(&current.id).await;
        // Head of the remaining collection becomes current.
        assert_eq!(sessions.current_id(), sessions.sessions().first().map(|s| s.id.as_str()));
        let last = sessions.current_id().unwrap().to_string();

        sessions.delete(&last).await;
        assert!(sessions.current_id().is_none());
        assert!(sessions.current().is_none());
    }

    #[tokio::test]
    async fn test_delete_non_current_keeps_pointer() {
        let mut sessions = store();
        let other = sessions.create("Other", "gpt-4", None).await;
        let current = sessions.create("Current", "gpt-4", None).await;

        sessions.delete(&other.id).await;

        assert_eq!(sessions.current_id(), Some(current.id.as_str()));
    }

    #[tokio::test]
    async fn test_filtered_view_reflects_memory_exactly() {
        let mut sessions = store();
        let a = sessions.create("alpha", "gpt-4", None).await;
        let b = sessions.create("beta", "claude-3-sonnet", None).await;
        sessions.toggle_star(&a.id).await;
        sessions.toggle_archive(&b.id).await;

        let starred = SessionFilter {
            starred: Some(true),
            ..Default::default()
        };
        let view = sessions.filtered(&starred);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, a.id);

        sessions.delete(&a.id).await;
        assert!(sessions.filtered(&starred).is_empty());

        // Tri-state: None does not filter.
        let unfiltered = SessionFilter::default();
        assert_eq!(sessions.filtered(&unfiltered).len(), 1);
    }

    #[tokio::test]
    async fn test_filtered_view_searches_message_content() {
        let mut sessions = store();
        let a = sessions.create("A", "gpt-4", None).await;
        sessions.create("B", "gpt-4", None).await;
        sessions
            .add_message(&a.id, MessageDraft::assistant("The Rust borrow checker", "gpt-4"))
            .await
            .unwrap();

        let filter = SessionFilter {
            search: "BORROW".to_string(),
            ..Default::default()
        };
        let view = sessions.filtered(&filter);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, a.id);
    }

    #[tokio::test]
    async fn test_filtered_view_sorts_by_updated_at_descending() {
        let mut sessions = store();
        let older = sessions.create("older", "gpt-4", None).await;
        sessions.create("newer", "gpt-4", None).await;
        // Touching the older session moves it to the front of the view.
        sessions.toggle_star(&older.id).await;

        let view = sessions.filtered(&SessionFilter::default());
        assert_eq!(view[0].id, older.id);
    }

    #[tokio::test]
    async fn test_tags_dedup_and_views() {
        let mut sessions = store();
        let session = sessions.create("A", "gpt-4", None).await;

        sessions.add_tag(&session.id, "work").await;
        sessions.add_tag(&session.id, "work").await;
        sessions.add_tag(&session.id, "ideas").await;

        assert_eq!(sessions.get(&session.id).unwrap().tags, vec!["work", "ideas"]);
        assert_eq!(sessions.all_tags(), vec!["ideas", "work"]);

        sessions.remove_tag(&session.id, "work").await;
        assert_eq!(sessions.all_tags(), vec!["ideas"]);
    }

    #[tokio::test]
    async fn test_empty_patch_bumps_updated_at_only() {
        let mut sessions = store();
        let session = sessions.create("A", "gpt-4", None).await;
        let before = sessions.get(&session.id).unwrap().clone();

        sessions.update(&session.id, SessionPatch::default()).await;

        let after = sessions.get(&session.id).unwrap();
        assert!(after.updated_at > before.updated_at);
        assert_eq!(after.title, before.title);
        assert_eq!(after.model, before.model);
        assert_eq!(after.created_at, before.created_at);
    }

    #[tokio::test]
    async fn test_import_appends_to_existing_sessions() {
        let mut sessions = store();
        sessions.create("Existing", "gpt-4", None).await;

        let mut donor = store();
        donor.create("Imported 1", "gpt-4", None).await;
        donor.create("Imported 2", "gpt-4", None).await;
        let json = donor.export_json(None).unwrap();

        let count = sessions.import_json(&json).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(sessions.sessions().len(), 3);
        assert_eq!(sessions.sessions()[0].title, "Existing");
    }

    #[tokio::test]
    async fn test_import_malformed_json_is_surfaced() {
        let mut sessions = store();
        assert!(sessions.import_json("not json").await.is_err());
    }

    #[tokio::test]
    async fn test_stats() {
        let mut sessions = store();
        let a = sessions.create("A", "gpt-4", None).await;
        let b = sessions.create("B", "gpt-4", None).await;
        sessions.toggle_star(&a.id).await;
        sessions.toggle_archive(&b.id).await;
        sessions
            .add_message(&a.id, MessageDraft::user("hi").with_tokens(2))
            .await
            .unwrap();

        let stats = sessions.stats();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.active_sessions, 1);
        assert_eq!(stats.archived_sessions, 1);
        assert_eq!(stats.starred_sessions, 1);
        assert_eq!(stats.total_tokens, 2);
        assert_eq!(stats.total_messages, 1);
        assert_eq!(stats.average_messages_per_session, 1);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let mut sessions = store();
        sessions.create("A", "gpt-4", None).await;
        sessions.clear_all().await;
        assert!(sessions.sessions().is_empty());
        assert!(sessions.current_id().is_none());
    }
}
