//! Persistent prompt template store.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::Result;
use crate::event::PersistenceEvent;
use crate::record::{fresh_id, now_millis};
use crate::storage::{DurableStore, KeyValueStore};
use crate::store::{InsertPosition, RecordStore};

use super::model::{
    Prompt, PromptCategory, PromptDraft, PromptFilter, PromptPatch, PromptVariable,
};

/// Owns the prompt template collection.
pub struct PromptStore {
    inner: RecordStore<Prompt>,
}

impl PromptStore {
    pub fn new(durable: Arc<dyn DurableStore>, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: RecordStore::new(durable, kv),
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

    pub fn prompts(&self) -> &[Prompt] {
        self.inner.records()
    }

    pub fn get(&self, id: &str) -> Option<&Prompt> {
        self.inner.get(id)
    }

    /// Creates a prompt and persists. New prompts are prepended: the
    /// collection is newest-first.
    pub async fn create(&mut self, draft: PromptDraft) -> Prompt {
        let now = now_millis();
        let prompt = Prompt {
            id: fresh_id("prompt"),
            name: draft.name,
            description: draft.description,
            content: draft.content,
            category: draft.category,
            tags: draft.tags,
            variables: draft.variables,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        };
        self.inner.insert(prompt.clone(), InsertPosition::Head).await;
        prompt
    }

    /// Shallow-merges `patch` over the prompt and restamps `updatedAt`.
    /// Silent no-op when the identifier is unknown.
    pub async fn update(&mut self, id: &str, patch: PromptPatch) {
        self.inner.update_with(id, |prompt| patch.apply(prompt)).await;
    }

    /// Deletes the prompt. Silent no-op when the identifier is unknown.
    pub async fn delete(&mut self, id: &str) {
        self.inner.remove(id).await;
    }

    pub async fn toggle_favorite(&mut self, id: &str) {
        self.inner
            .update_with(id, |prompt| prompt.is_favorite = !prompt.is_favorite)
            .await;
    }

    /// Prompts matching `filter`, in collection order (newest first).
    pub fn filtered(&self, filter: &PromptFilter) -> Vec<&Prompt> {
        self.prompts().iter().filter(|p| filter.matches(p)).collect()
    }

    pub fn favorites(&self) -> Vec<&Prompt> {
        self.prompts().iter().filter(|p| p.is_favorite).collect()
    }

    /// Categories in use, with per-category prompt counts, sorted by name.
    pub fn categories(&self) -> Vec<PromptCategory> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for prompt in self.prompts() {
            *counts.entry(prompt.category.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(name, count)| PromptCategory {
                name: name.to_string(),
                count,
            })
            .collect()
    }

    /// Serializes the collection (or the subset named by `ids`) to the
    /// portable JSON format.
    pub fn export_json(&self, ids: Option<&[String]>) -> Result<String> {
        self.inner.export_json(ids)
    }

    /// Imports prompts from a portable JSON array. Prompts are APPENDED to
    /// the existing collection. Returns the number imported.
    pub async fn import_json(&mut self, json: &str) -> Result<usize> {
        let imported = RecordStore::<Prompt>::parse_import(json)?;
        let count = imported.len();
        self.inner.append_all(imported).await;
        Ok(count)
    }

    /// Seeds the collection with the built-in sample templates when it is
    /// empty. No-op otherwise.
    pub async fn seed_samples(&mut self) {
        if !self.prompts().is_empty() {
            return;
        }
        for draft in sample_prompts() {
            self.create(draft).await;
        }
    }
}

/// Built-in sample templates shown on first run.
fn sample_prompts() -> Vec<PromptDraft> {
    vec![
        PromptDraft {
            name: "Code Review Assistant".to_string(),
            description: "Template for professional code review".to_string(),
            content: "You are an expert code reviewer. Review the following code and provide:\n\n\
                      1. A code quality assessment\n2. Potential problems\n3. Suggested improvements\n\
                      4. Best-practice recommendations\n\nCode:\n```{language}\n{code}\n```"
                .to_string(),
            category: "Programming".to_string(),
            tags: vec!["code".to_string(), "review".to_string(), "quality".to_string()],
            variables: vec![
                PromptVariable::text("language", "Programming language", true),
                PromptVariable::text("code", "Code", true),
            ],
        },
        PromptDraft {
            name: "Product Requirements Analysis".to_string(),
            description: "Analyzes a product requirement and suggests improvements".to_string(),
            content: "As a product manager, analyze the following requirement:\n\n\
                      **Requirement:**\n{requirement}\n\n**Target users:**\n{targetUsers}\n\n\
                      Cover feasibility, user experience, business value, and risks, and \
                      provide a detailed report with recommendations."
                .to_string(),
            category: "Product".to_string(),
            tags: vec!["product".to_string(), "requirements".to_string(), "analysis".to_string()],
            variables: vec![
                PromptVariable::text("requirement", "Requirement", true),
                PromptVariable::text("targetUsers", "Target users", true),
            ],
        },
        PromptDraft {
            name: "Creative Writing Assistant".to_string(),
            description: "Inspiration template for creative writing".to_string(),
            content: "You are a creative writing expert. Write a {style} piece about {topic} \
                      for {audience}, roughly {length} long. Open with a hook, keep the \
                      structure clear, and end with a takeaway."
                .to_string(),
            category: "Writing".to_string(),
            tags: vec!["writing".to_string(), "creative".to_string(), "content".to_string()],
            variables: vec![
                PromptVariable::text("topic", "Topic", true),
                PromptVariable::select(
                    "style",
                    "Style",
                    vec![
                        "formal".to_string(),
                        "casual".to_string(),
                        "humorous".to_string(),
                        "serious".to_string(),
                    ],
                ),
                PromptVariable::select(
                    "length",
                    "Length",
                    vec![
                        "500 words".to_string(),
                        "1000 words".to_string(),
                        "2000 words".to_string(),
                    ],
                ),
                PromptVariable::text("audience", "Audience", true),
            ],
        },
    ]
}
