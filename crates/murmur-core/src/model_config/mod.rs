//! Model configurations: domain model, built-in defaults, provider catalog,
//! and the persistent store.

pub mod model;
pub mod store;

pub use model::{ModelConfig, ModelDraft, ModelPatch, ModelProvider, Provider, default_models, providers};
pub use store::{ModelStore, StorageInfo};
