//! Model configuration domain model and built-in defaults.

use serde::{Deserialize, Serialize};

use crate::record::{Record, advance, now_millis};

/// LLM provider a model configuration talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Custom,
}

/// Connection and sampling configuration for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub id: String,
    /// Display name (e.g. "GPT-4").
    pub name: String,
    pub provider: Provider,
    pub api_endpoint: String,
    pub api_key: String,
    /// Provider-side model identifier sent on requests.
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    pub is_default: bool,
    pub is_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub capabilities: Vec<String>,
    /// Milliseconds since the Unix epoch. Defaults to zero when importing
    /// configurations written before timestamps existed.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Record for ModelConfig {
    const KIND: &'static str = "models";

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now_ms: i64) {
        self.updated_at = advance(self.updated_at, now_ms);
    }
}

/// Caller-supplied fields for a new model configuration; identity, flags
/// default, and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct ModelDraft {
    pub name: String,
    pub provider: Provider,
    pub api_endpoint: String,
    pub api_key: String,
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub system_prompt: Option<String>,
    pub description: Option<String>,
    pub capabilities: Vec<String>,
}

/// Partial update for a model configuration; `None` fields are left
/// untouched. The default/enabled flags have dedicated store operations.
#[derive(Debug, Clone, Default)]
pub struct ModelPatch {
    pub name: Option<String>,
    pub api_endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model_id: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub system_prompt: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub capabilities: Option<Vec<String>>,
}

impl ModelPatch {
    pub(crate) fn apply(self, model: &mut ModelConfig) {
        if let Some(name) = self.name {
            model.name = name;
        }
        if let Some(api_endpoint) = self.api_endpoint {
            model.api_endpoint = api_endpoint;
        }
        if let Some(api_key) = self.api_key {
            model.api_key = api_key;
        }
        if let Some(model_id) = self.model_id {
            model.model_id = model_id;
        }
        if let Some(max_tokens) = self.max_tokens {
            model.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            model.temperature = temperature;
        }
        if let Some(system_prompt) = self.system_prompt {
            model.system_prompt = system_prompt;
        }
        if let Some(description) = self.description {
            model.description = description;
        }
        if let Some(capabilities) = self.capabilities {
            model.capabilities = capabilities;
        }
    }
}

/// A known provider and its catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelProvider {
    pub id: Provider,
    pub name: String,
    /// Emoji shown next to the provider in the picker.
    pub icon: String,
    pub description: String,
    pub supported_models: Vec<String>,
    pub default_endpoint: String,
}

/// The built-in provider catalog.
pub fn providers() -> Vec<ModelProvider> {
    vec![
        ModelProvider {
            id: Provider::OpenAi,
            name: "OpenAI".to_string(),
            icon: "🤖".to_string(),
            description: "OpenAI GPT family".to_string(),
            supported_models: vec![
                "gpt-3.5-turbo".to_string(),
                "gpt-4".to_string(),
                "gpt-4-turbo".to_string(),
            ],
            default_endpoint: "https://api.openai.com/v1".to_string(),
        },
        ModelProvider {
            id: Provider::Anthropic,
            name: "Anthropic".to_string(),
            icon: "🧠".to_string(),
            description: "Anthropic Claude family".to_string(),
            supported_models: vec![
                "claude-3-sonnet".to_string(),
                "claude-3-opus".to_string(),
                "claude-3-haiku".to_string(),
            ],
            default_endpoint: "https://api.anthropic.com".to_string(),
        },
        ModelProvider {
            id: Provider::Custom,
            name: "Custom".to_string(),
            icon: "⚙️".to_string(),
            description: "Custom API endpoint".to_string(),
            supported_models: Vec::new(),
            default_endpoint: String::new(),
        },
    ]
}

/// The built-in default model set, used when neither backing store holds
/// any configuration.
pub fn default_models() -> Vec<ModelConfig> {
    let now = now_millis();
    let base = |id: &str, name: &str, provider: Provider, endpoint: &str, model_id: &str| {
        ModelConfig {
            id: id.to_string(),
            name: name.to_string(),
            provider,
            api_endpoint: endpoint.to_string(),
            api_key: String::new(),
            model_id: model_id.to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            system_prompt: None,
            is_default: false,
            is_enabled: true,
            description: None,
            capabilities: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    };

    let mut gpt35 = base(
        "gpt-3.5-turbo",
        "GPT-3.5 Turbo",
        Provider::OpenAi,
        "https://api.openai.com/v1",
        "gpt-3.5-turbo",
    );
    gpt35.temperature = 0.8;
    gpt35.system_prompt = Some("You are a helpful AI assistant.".to_string());
    gpt35.is_default = true;
    gpt35.description = Some("Fast, efficient conversational model for everyday use".to_string());
    gpt35.capabilities = vec!["chat".to_string(), "completion".to_string(), "code".to_string()];

    let mut gpt4 = base(
        "gpt-4",
        "GPT-4",
        Provider::OpenAi,
        "https://api.openai.com/v1",
        "gpt-4",
    );
    gpt4.max_tokens = 8192;
    gpt4.system_prompt =
        Some("You are a helpful AI assistant with advanced reasoning capabilities.".to_string());
    gpt4.description = Some("Advanced language model with strong reasoning".to_string());
    gpt4.capabilities = vec![
        "chat".to_string(),
        "completion".to_string(),
        "code".to_string(),
        "reasoning".to_string(),
        "analysis".to_string(),
    ];

    let mut claude = base(
        "claude-3-sonnet",
        "Claude 3 Sonnet",
        Provider::Anthropic,
        "https://api.anthropic.com",
        "claude-3-sonnet-20240229",
    );
    claude.system_prompt =
        Some("You are Claude, an AI assistant created by Anthropic.".to_string());
    claude.description =
        Some("Balanced performance and efficiency for complex tasks".to_string());
    claude.capabilities = vec![
        "chat".to_string(),
        "completion".to_string(),
        "analysis".to_string(),
        "writing".to_string(),
    ];

    vec![gpt35, gpt4, claude]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_wire_names() {
        assert_eq!(serde_json::to_string(&Provider::OpenAi).unwrap(), "\"openai\"");
        assert_eq!(
            serde_json::to_string(&Provider::Anthropic).unwrap(),
            "\"anthropic\""
        );
    }

    #[test]
    fn test_default_models_have_exactly_one_default() {
        let models = default_models();
        assert_eq!(models.len(), 3);
        assert_eq!(models.iter().filter(|m| m.is_default).count(), 1);
        assert!(models.iter().all(|m| m.is_enabled));
        assert!(models.iter().all(|m| m.api_key.is_empty()));
    }

    #[test]
    fn test_config_deserializes_without_timestamps() {
        // Configurations exported before timestamps existed still load.
        let json = r#"{
            "id": "m-1", "name": "M", "provider": "custom",
            "apiEndpoint": "", "apiKey": "", "modelId": "m",
            "maxTokens": 2048, "temperature": 0.5,
            "isDefault": false, "isEnabled": true, "capabilities": []
        }"#;
        let config: ModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.created_at, 0);
        assert_eq!(config.updated_at, 0);
    }
}
