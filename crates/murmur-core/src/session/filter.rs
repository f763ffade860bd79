//! Derived-view filtering for sessions.

use serde::{Deserialize, Serialize};

use super::model::Session;

/// Inclusive creation-time range, milliseconds since the Unix epoch.
/// `None` bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

/// Predicate set for the filtered session view.
///
/// An empty/default filter matches every session. Boolean filters are
/// tri-state: `None` means "don't filter on this flag".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFilter {
    /// Case-insensitive substring search across title, description, and
    /// message content. Empty string matches everything.
    pub search: String,
    /// Set-membership: a session matches when it carries any of these tags.
    pub tags: Vec<String>,
    pub date_range: DateRange,
    pub starred: Option<bool>,
    pub archived: Option<bool>,
    /// Exact model identifier match.
    pub model: Option<String>,
}

impl SessionFilter {
    /// Whether `session` satisfies every active predicate.
    pub fn matches(&self, session: &Session) -> bool {
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let in_title = session.title.to_lowercase().contains(&needle);
            let in_description = session
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            let in_messages = session
                .messages
                .iter()
                .any(|m| m.content.to_lowercase().contains(&needle));
            if !in_title && !in_description && !in_messages {
                return false;
            }
        }

        if !self.tags.is_empty() && !self.tags.iter().any(|tag| session.tags.contains(tag)) {
            return false;
        }

        if let Some(start) = self.date_range.start
            && session.created_at < start
        {
            return false;
        }
        if let Some(end) = self.date_range.end
            && session.created_at > end
        {
            return false;
        }

        if let Some(starred) = self.starred
            && session.is_starred != starred
        {
            return false;
        }
        if let Some(archived) = self.archived
            && session.is_archived != archived
        {
            return false;
        }

        if let Some(model) = &self.model
            && &session.model != model
        {
            return false;
        }

        true
    }

    /// Applies the filter and the fixed sort order (most recently updated
    /// first). Pure: returns a new sequence of references, never mutating
    /// the source.
    pub fn apply<'a>(&self, sessions: &'a [Session]) -> Vec<&'a Session> {
        let mut matched: Vec<&Session> = sessions.iter().filter(|s| self.matches(s)).collect();
        matched.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        matched
    }
}
