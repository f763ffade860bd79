//! Application settings: singleton record and its store.
//!
//! Settings follow the same persistence pattern as the collections but are
//! a single object, not a collection, and use only the lightweight
//! key-value store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::Result;
use crate::event::{PersistenceEvent, StoreTarget};
use crate::storage::KeyValueStore;

const SETTINGS_KV_KEY: &str = "murmur-client-settings";
const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    Default,
    Yellow,
    Red,
    Blue,
    Pink,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "en-US")]
    EnUs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    Medium,
    Large,
}

/// A user-supplied font face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFont {
    pub name: String,
    pub url: String,
    /// Font file format: "woff", "woff2", "ttf", or "otf".
    #[serde(rename = "type")]
    pub format: String,
}

/// The application settings singleton.
///
/// Container-level `#[serde(default)]` merges persisted partial documents
/// over the built-in defaults, so settings written by older versions load
/// cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub color_theme: ColorTheme,
    pub language: Language,
    pub font_size: FontSize,
    pub font_family: String,
    pub custom_fonts: Vec<CustomFont>,
    pub auto_save: bool,
    pub notifications: bool,
    /// Identifier of the model configuration used for new sessions.
    pub default_model: String,
    pub api_endpoint: String,
    pub api_key: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            color_theme: ColorTheme::Default,
            language: Language::EnUs,
            font_size: FontSize::Medium,
            font_family: "system-ui, -apple-system, \"Segoe UI\", \"Helvetica Neue\", \
                          Helvetica, Arial, sans-serif"
                .to_string(),
            custom_fonts: Vec::new(),
            auto_save: true,
            notifications: true,
            default_model: "gpt-3.5-turbo".to_string(),
            api_endpoint: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            max_tokens: 4096,
            temperature: 0.8,
        }
    }
}

/// Partial update for settings; `None` fields are left untouched.
/// Custom fonts have dedicated store operations.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub color_theme: Option<ColorTheme>,
    pub language: Option<Language>,
    pub font_size: Option<FontSize>,
    pub font_family: Option<String>,
    pub auto_save: Option<bool>,
    pub notifications: Option<bool>,
    pub default_model: Option<String>,
    pub api_endpoint: Option<String>,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl SettingsPatch {
    fn apply(self, settings: &mut Settings) {
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(color_theme) = self.color_theme {
            settings.color_theme = color_theme;
        }
        if let Some(language) = self.language {
            settings.language = language;
        }
        if let Some(font_size) = self.font_size {
            settings.font_size = font_size;
        }
        if let Some(font_family) = self.font_family {
            settings.font_family = font_family;
        }
        if let Some(auto_save) = self.auto_save {
            settings.auto_save = auto_save;
        }
        if let Some(notifications) = self.notifications {
            settings.notifications = notifications;
        }
        if let Some(default_model) = self.default_model {
            settings.default_model = default_model;
        }
        if let Some(api_endpoint) = self.api_endpoint {
            settings.api_endpoint = api_endpoint;
        }
        if let Some(api_key) = self.api_key {
            settings.api_key = api_key;
        }
        if let Some(max_tokens) = self.max_tokens {
            settings.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            settings.temperature = temperature;
        }
    }
}

/// Owns the settings singleton and persists it to the key-value store.
///
/// Persistence failures are logged, reported on the event channel, and
/// never surfaced to the mutating caller.
pub struct SettingsStore {
    settings: Settings,
    kv: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<PersistenceEvent>,
}

impl SettingsStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            settings: Settings::default(),
            kv,
            events,
        }
    }

    /// Loads settings from the key-value store, merging the persisted
    /// document over the built-in defaults. Read failures are logged and
    /// leave the defaults in place.
    pub fn load(&mut self) {
        let Some(saved) = self.kv.get(SETTINGS_KV_KEY) else {
            debug!("no persisted settings, using defaults");
            return;
        };
        match serde_json::from_str(&saved) {
            Ok(settings) => self.settings = settings,
            Err(e) => {
                warn!(error = %e, "malformed persisted settings, using defaults");
            }
        }
    }

    /// Subscribes to persistence outcome events.
    pub fn subscribe(&self) -> broadcast::Receiver<PersistenceEvent> {
        self.events.subscribe()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Shallow-merges `patch` over the current settings and persists.
    pub fn update(&mut self, patch: SettingsPatch) {
        patch.apply(&mut self.settings);
        self.save();
    }

    /// Restores the built-in defaults and persists them.
    pub fn reset(&mut self) {
        self.settings = Settings::default();
        self.save();
    }

    pub fn toggle_theme(&mut self) {
        self.settings.theme = match self.settings.theme {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
        self.save();
    }

    pub fn set_language(&mut self, language: Language) {
        self.settings.language = language;
        self.save();
    }

    pub fn set_font_size(&mut self, font_size: FontSize) {
        self.settings.font_size = font_size;
        self.save();
    }

    pub fn set_color_theme(&mut self, color_theme: ColorTheme) {
        self.settings.color_theme = color_theme;
        self.save();
    }

    pub fn add_custom_font(&mut self, font: CustomFont) {
        self.settings.custom_fonts.push(font);
        self.save();
    }

    pub fn remove_custom_font(&mut self, index: usize) {
        if index < self.settings.custom_fonts.len() {
            self.settings.custom_fonts.remove(index);
            self.save();
        }
    }

    pub fn is_dark(&self) -> bool {
        self.settings.theme == Theme::Dark
    }

    /// Removes the persisted document and restores defaults in memory.
    pub fn clear_persisted(&mut self) {
        if let Err(e) = self.kv.remove(SETTINGS_KV_KEY) {
            warn!(error = %e, "failed to clear persisted settings");
        }
        self.settings = Settings::default();
    }

    /// Serializes the settings to the portable JSON format.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.settings)?)
    }

    /// Imports a portable settings document, REPLACING the current
    /// settings (missing fields fall back to defaults), then persists.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        self.settings = serde_json::from_str(json)?;
        self.save();
        Ok(())
    }

    fn save(&self) {
        let event = match serde_json::to_string(&self.settings) {
            Ok(json) => match self.kv.set(SETTINGS_KV_KEY, &json) {
                Ok(()) => PersistenceEvent::success("settings", StoreTarget::KeyValue),
                Err(e) => {
                    warn!(error = %e, "failed to persist settings");
                    PersistenceEvent::failure("settings", StoreTarget::KeyValue, e.to_string())
                }
            },
            Err(e) => {
                warn!(error = %e, "failed to serialize settings");
                PersistenceEvent::failure("settings", StoreTarget::KeyValue, e.to_string())
            }
        };
        let _ = self.events.send(event);
    }
}
