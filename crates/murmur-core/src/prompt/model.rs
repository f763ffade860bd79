//! Prompt template domain model.

use serde::{Deserialize, Serialize};

use crate::record::{Record, advance};

/// Input widget kind for a template variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Text,
    Number,
    Select,
}

/// A placeholder within a prompt template's content, filled in by the user
/// before the prompt is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptVariable {
    /// Placeholder name as it appears in the content (e.g. `{language}`).
    pub name: String,
    /// Human-readable label shown in the fill-in form.
    pub label: String,
    #[serde(rename = "type")]
    pub kind: VariableKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Choices for [`VariableKind::Select`] variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl PromptVariable {
    pub fn text(name: impl Into<String>, label: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: VariableKind::Text,
            required,
            default_value: None,
            options: None,
        }
    }

    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: VariableKind::Select,
            required: true,
            default_value: None,
            options: Some(options),
        }
    }
}

/// A reusable prompt template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Template body; variables appear as `{name}` placeholders.
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub variables: Vec<PromptVariable>,
    #[serde(default)]
    pub is_favorite: bool,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub updated_at: i64,
}

impl Record for Prompt {
    const KIND: &'static str = "prompts";

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now_ms: i64) {
        self.updated_at = advance(self.updated_at, now_ms);
    }
}

/// Caller-supplied fields for a new prompt; identity and timestamps are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct PromptDraft {
    pub name: String,
    pub description: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub variables: Vec<PromptVariable>,
}

/// Partial update for a prompt; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PromptPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub variables: Option<Vec<PromptVariable>>,
}

impl PromptPatch {
    pub(crate) fn apply(self, prompt: &mut Prompt) {
        if let Some(name) = self.name {
            prompt.name = name;
        }
        if let Some(description) = self.description {
            prompt.description = description;
        }
        if let Some(content) = self.content {
            prompt.content = content;
        }
        if let Some(category) = self.category {
            prompt.category = category;
        }
        if let Some(tags) = self.tags {
            prompt.tags = tags;
        }
        if let Some(variables) = self.variables {
            prompt.variables = variables;
        }
    }
}

/// Predicate set for the filtered prompt view.
///
/// An empty/default filter matches every prompt. `favorite` is tri-state:
/// `None` means "don't filter on the flag".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFilter {
    /// Case-insensitive substring search across name, description, content,
    /// and tags.
    pub search: String,
    /// Exact category match; `None` means all categories.
    pub category: Option<String>,
    pub favorite: Option<bool>,
}

impl PromptFilter {
    /// Whether `prompt` satisfies every active predicate.
    pub fn matches(&self, prompt: &Prompt) -> bool {
        if let Some(category) = &self.category
            && &prompt.category != category
        {
            return false;
        }

        if let Some(favorite) = self.favorite
            && prompt.is_favorite != favorite
        {
            return false;
        }

        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let hit = prompt.name.to_lowercase().contains(&needle)
                || prompt.description.to_lowercase().contains(&needle)
                || prompt.content.to_lowercase().contains(&needle)
                || prompt
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        true
    }
}

/// A category derived from the prompt collection: its name and how many
/// prompts it holds. Categories are not persisted separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptCategory {
    pub name: String,
    pub count: usize,
}
