//! Prompt templates: domain model and persistent store.

pub mod model;
pub mod store;

pub use model::{
    Prompt, PromptCategory, PromptDraft, PromptFilter, PromptPatch, PromptVariable, VariableKind,
};
pub use store::PromptStore;
