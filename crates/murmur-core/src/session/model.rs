//! Session domain model.
//!
//! A session owns its messages: `ChatMessage` is embedded in the session's
//! `messages` attribute and is not a separately persisted collection.

use serde::{Deserialize, Serialize};

use crate::record::{Record, advance};

/// Maximum title length derived from a message before truncation.
pub const AUTO_TITLE_MAX_CHARS: usize = 50;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A single message within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Model that produced the message, for assistant messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Token count reported by the provider, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
}

/// Caller-supplied fields for a new message; id and timestamp are assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub role: Role,
    pub content: String,
    pub model: Option<String>,
    pub tokens: Option<u64>,
}

impl MessageDraft {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            model: None,
            tokens: None,
        }
    }

    pub fn assistant(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            model: Some(model.into()),
            tokens: None,
        }
    }

    pub fn with_tokens(mut self, tokens: u64) -> Self {
        self.tokens = Some(tokens);
        self
    }
}

/// A chat session and its embedded message history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Identifier of the model configuration this session talks to.
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    /// Milliseconds since the Unix epoch; restamped on every mutation.
    pub updated_at: i64,
    pub tags: Vec<String>,
    pub is_starred: bool,
    pub is_archived: bool,
    /// Running sum of the token counts of all messages.
    pub total_tokens: u64,
    pub message_count: usize,
}

impl Session {
    /// Derives a session title from message content: the first
    /// [`AUTO_TITLE_MAX_CHARS`] characters, with `...` appended when
    /// the content is longer.
    pub fn title_from_content(content: &str) -> String {
        let truncated: String = content.chars().take(AUTO_TITLE_MAX_CHARS).collect();
        if content.chars().count() > AUTO_TITLE_MAX_CHARS {
            format!("{}...", truncated)
        } else {
            truncated
        }
    }
}

impl Record for Session {
    const KIND: &'static str = "sessions";

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now_ms: i64) {
        self.updated_at = advance(self.updated_at, now_ms);
    }
}

/// Partial update for a session; `None` fields are left untouched.
///
/// Flags, tags, and messages have dedicated store operations and are not
/// patchable here.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub model: Option<String>,
}

impl SessionPatch {
    pub(crate) fn apply(self, session: &mut Session) {
        if let Some(title) = self.title {
            session.title = title;
        }
        if let Some(description) = self.description {
            session.description = description;
        }
        if let Some(model) = self.model {
            session.model = model;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_short_content_is_verbatim() {
        assert_eq!(Session::title_from_content("hello"), "hello");
    }

    #[test]
    fn test_title_from_long_content_is_truncated_with_ellipsis() {
        let content = "x".repeat(80);
        let title = Session::title_from_content(&content);
        assert_eq!(title.chars().count(), AUTO_TITLE_MAX_CHARS + 3);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_title_truncation_counts_chars_not_bytes() {
        let content = "é".repeat(60);
        let title = Session::title_from_content(&content);
        assert!(title.starts_with(&"é".repeat(AUTO_TITLE_MAX_CHARS)));
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_session_wire_format_is_camel_case() {
        let message = ChatMessage {
            id: "msg-1".to_string(),
            role: Role::User,
            content: "hi".to_string(),
            timestamp: 42,
            model: None,
            tokens: None,
        };
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"timestamp\":42"));
        assert!(!json.contains("model"));
    }
}
