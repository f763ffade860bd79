//! Persistent model configuration store.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::Result;
use crate::event::PersistenceEvent;
use crate::record::{Record, fresh_id, now_millis};
use crate::storage::{DurableStore, KeyValueStore};
use crate::store::{InsertPosition, RecordStore};

use super::model::{ModelConfig, ModelDraft, ModelPatch, ModelProvider, Provider, default_models, providers};

/// Where the model collection is persisted, for display in the settings UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageInfo {
    /// `None` when only the key-value store is in use.
    pub file_path: Option<PathBuf>,
    pub key_value_key: String,
    pub model_count: usize,
}

/// Owns the model configuration collection.
///
/// Unlike sessions and prompts, an empty store is not useful: when neither
/// backing store holds configurations, [`load`](Self::load) falls back to
/// the built-in default set and persists it immediately.
pub struct ModelStore {
    inner: RecordStore<ModelConfig>,
}

impl ModelStore {
    pub fn new(durable: Arc<dyn DurableStore>, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: RecordStore::new(durable, kv),
        }
    }

    /// Populates the collection from the backing stores, falling back to
    /// the built-in defaults.
    pub async fn load(&mut self) {
        self.inner.load_with_default(default_models).await;
    }

    /// Subscribes to persistence outcome events.
    pub fn subscribe(&self) -> broadcast::Receiver<PersistenceEvent> {
        self.inner.subscribe()
    }

    pub fn models(&self) -> &[ModelConfig] {
        self.inner.records()
    }

    pub fn get(&self, id: &str) -> Option<&ModelConfig> {
        self.inner.get(id)
    }

    /// Creates a model configuration and persists. Configurations are
    /// appended: the collection keeps creation order.
    pub async fn create(&mut self, draft: ModelDraft) -> ModelConfig {
        let now = now_millis();
        let model = ModelConfig {
            id: fresh_id("model"),
            name: draft.name,
            provider: draft.provider,
            api_endpoint: draft.api_endpoint,
            api_key: draft.api_key,
            model_id: draft.model_id,
            max_tokens: draft.max_tokens,
            temperature: draft.temperature,
            system_prompt: draft.system_prompt,
            is_default: false,
            is_enabled: true,
            description: draft.description,
            capabilities: draft.capabilities,
            created_at: now,
            updated_at: now,
        };
        self.inner.insert(model.clone(), InsertPosition::Tail).await;
        model
    }

    /// Shallow-merges `patch` over the configuration and restamps
    /// `updatedAt`. Silent no-op when the identifier is unknown.
    pub async fn update(&mut self, id: &str, patch: ModelPatch) {
        self.inner.update_with(id, |model| patch.apply(model)).await;
    }

    /// Deletes the configuration. Silent no-op when the identifier is
    /// unknown.
    pub async fn delete(&mut self, id: &str) {
        self.inner.remove(id).await;
    }

    /// Makes the given configuration the default, clearing the flag on
    /// every other one. Records whose flag actually changes are restamped.
    pub async fn set_default(&mut self, id: &str) {
        let now = now_millis();
        self.inner
            .mutate_all(|model| {
                let should_be_default = model.id() == id;
                if model.is_default != should_be_default {
                    model.is_default = should_be_default;
                    model.touch(now);
                }
            })
            .await;
    }

    pub async fn toggle_enabled(&mut self, id: &str) {
        self.inner
            .update_with(id, |model| model.is_enabled = !model.is_enabled)
            .await;
    }

    /// Configurations available for selection in the chat UI.
    pub fn enabled(&self) -> Vec<&ModelConfig> {
        self.models().iter().filter(|m| m.is_enabled).collect()
    }

    /// The configuration flagged as default, if any.
    pub fn default_model(&self) -> Option<&ModelConfig> {
        self.models().iter().find(|m| m.is_default)
    }

    /// The built-in provider catalog.
    pub fn providers(&self) -> Vec<ModelProvider> {
        providers()
    }

    /// Catalog entry for one provider.
    pub fn provider(&self, id: Provider) -> Option<ModelProvider> {
        providers().into_iter().find(|p| p.id == id)
    }

    /// Where this collection is persisted.
    pub fn storage_info(&self) -> StorageInfo {
        StorageInfo {
            file_path: self.inner.storage_path(),
            key_value_key: RecordStore::<ModelConfig>::kv_key(),
            model_count: self.models().len(),
        }
    }

    /// Serializes the collection to the portable JSON format.
    pub fn export_json(&self) -> Result<String> {
        self.inner.export_json(None)
    }

    /// Imports configurations from a portable JSON array. The imported set
    /// REPLACES the whole collection. Returns the number imported.
    pub async fn import_json(&mut self, json: &str) -> Result<usize> {
        let imported = RecordStore::<ModelConfig>::parse_import(json)?;
        let count = imported.len();
        self.inner.replace_all(imported).await;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryKeyValueStore, NullDurableStore};

    fn store() -> ModelStore {
        ModelStore::new(
            Arc::new(NullDurableStore),
            Arc::new(MemoryKeyValueStore::new()),
        )
    }

    fn draft(name: &str) -> ModelDraft {
        ModelDraft {
            name: name.to_string(),
            provider: Provider::Custom,
            api_endpoint: "http://localhost:8080/v1".to_string(),
            api_key: String::new(),
            model_id: name.to_string(),
            max_tokens: 2048,
            temperature: 0.7,
            system_prompt: None,
            description: None,
            capabilities: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_load_seeds_defaults_and_persists_them() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let mut models = ModelStore::new(Arc::new(NullDurableStore), kv.clone());

        models.load().await;

        assert_eq!(models.models().len(), 3);
        assert_eq!(models.default_model().unwrap().id, "gpt-3.5-turbo");
        // Immediately persisted, so a fresh load adopts the saved copy.
        let mut reloaded = ModelStore::new(Arc::new(NullDurableStore), kv);
        reloaded.load().await;
        assert_eq!(reloaded.models().len(), 3);
    }

    #[tokio::test]
    async fn test_saved_models_win_over_defaults() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let mut models = ModelStore::new(Arc::new(NullDurableStore), kv.clone());
        models.create(draft("mine")).await;

        let mut reloaded = ModelStore::new(Arc::new(NullDurableStore), kv);
        reloaded.load().await;

        assert_eq!(reloaded.models().len(), 1);
        assert_eq!(reloaded.models()[0].name, "mine");
    }

    #[tokio::test]
    async fn test_set_default_is_exclusive() {
        let mut models = store();
        models.load().await;
        let before: Vec<i64> = models.models().iter().map(|m| m.updated_at).collect();

        models.set_default("claude-3-sonnet").await;

        assert_eq!(models.default_model().unwrap().id, "claude-3-sonnet");
        assert_eq!(models.models().iter().filter(|m| m.is_default).count(), 1);
        // Both the demoted and the promoted record were restamped.
        let after: Vec<i64> = models.models().iter().map(|m| m.updated_at).collect();
        assert!(after[0] > before[0]);
        assert!(after[2] > before[2]);
        assert_eq!(after[1], before[1]);
    }

    #[tokio::test]
    async fn test_toggle_enabled_updates_enabled_view() {
        let mut models = store();
        models.load().await;

        models.toggle_enabled("gpt-4").await;

        assert_eq!(models.enabled().len(), 2);
        assert!(!models.get("gpt-4").unwrap().is_enabled);
    }

    #[tokio::test]
    async fn test_import_replaces_whole_collection() {
        let mut models = store();
        models.create(draft("existing")).await;

        let mut donor = store();
        donor.create(draft("imported-1")).await;
        donor.create(draft("imported-2")).await;
        let json = donor.export_json().unwrap();

        let count = models.import_json(&json).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(models.models().len(), 2);
        assert!(models.models().iter().all(|m| m.name.starts_with("imported")));
    }

    #[tokio::test]
    async fn test_provider_catalog_lookup() {
        let models = store();
        let anthropic = models.provider(Provider::Anthropic).unwrap();
        assert_eq!(anthropic.default_endpoint, "https://api.anthropic.com");
        assert_eq!(anthropic.icon, "🧠");
        assert_eq!(models.providers().len(), 3);
    }

    #[tokio::test]
    async fn test_storage_info_without_durable_store() {
        let mut models = store();
        models.load().await;
        let info = models.storage_info();
        assert!(info.file_path.is_none());
        assert_eq!(info.key_value_key, "murmur-client-models");
        assert_eq!(info.model_count, 3);
    }
}
