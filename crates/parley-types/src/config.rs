//! Configuration types for Parley.
//!
//! `AppConfig` represents the top-level `config.toml`. Every field is
//! optional; per-provider settings are sparse overrides merged onto the
//! built-in defaults by [`AppConfig::provider_config`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::llm::{ProviderId, ProviderKind};

/// Top-level configuration for the Parley bot.
///
/// Loaded from `~/.parley/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path of the chat-modes JSON file, relative to the data directory.
    #[serde(default = "default_modes_file")]
    pub modes_file: String,

    /// Sparse per-provider overrides.
    #[serde(default)]
    pub providers: ProvidersSection,

    /// Pricing overrides consulted before the built-in rate table.
    #[serde(default)]
    pub pricing: Vec<ProviderPricing>,
}

fn default_modes_file() -> String {
    "chat-modes.json".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            modes_file: default_modes_file(),
            providers: ProvidersSection::default(),
            pricing: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Effective configuration for a provider: defaults with overrides applied.
    pub fn provider_config(&self, id: ProviderId) -> ProviderConfig {
        let mut config = ProviderConfig::defaults_for(id);
        if let Some(overrides) = self.providers.get(id) {
            overrides.apply(&mut config);
        }
        config
    }

    /// Reject settings that would make a provider unusable.
    pub fn validate(&self) -> Result<(), String> {
        for id in ProviderId::ALL {
            if let Some(overrides) = self.providers.get(id) {
                overrides.validate(id)?;
            }
        }
        Ok(())
    }
}

/// The `[providers.*]` tables of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersSection {
    pub openai: Option<ProviderOverrides>,
    pub anthropic: Option<ProviderOverrides>,
    pub image: Option<ProviderOverrides>,
}

impl ProvidersSection {
    pub fn get(&self, id: ProviderId) -> Option<&ProviderOverrides> {
        match id {
            ProviderId::OpenAi => self.openai.as_ref(),
            ProviderId::Anthropic => self.anthropic.as_ref(),
            ProviderId::ImageGen => self.image.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.openai.is_none() && self.anthropic.is_none() && self.image.is_none()
    }
}

/// Optional settings for one provider in `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderOverrides {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
}

impl ProviderOverrides {
    fn validate(&self, id: ProviderId) -> Result<(), String> {
        if self.timeout_secs == Some(0) {
            return Err(format!("providers.{id}.timeout_secs must be greater than 0"));
        }
        // Image generation has no token ceiling.
        if self.max_tokens == Some(0) && id.kind() == ProviderKind::Chat {
            return Err(format!("providers.{id}.max_tokens must be greater than 0"));
        }
        Ok(())
    }

    fn apply(&self, config: &mut ProviderConfig) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        if let Some(env) = &self.api_key_env {
            config.api_key_env = env.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }
    }
}

/// Resolved, immutable configuration of one provider.
///
/// Credentials are not stored here; `api_key_env` names where to find them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub model: String,
    /// Token ceiling for a single completion.
    pub max_tokens: u32,
    /// Per-call latency ceiling.
    pub timeout_secs: u64,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Override the provider's default base URL.
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// Built-in defaults for each provider.
    pub fn defaults_for(id: ProviderId) -> Self {
        match id {
            ProviderId::OpenAi => Self {
                id,
                model: "gpt-4o".to_string(),
                max_tokens: 300,
                timeout_secs: 60,
                api_key_env: "OPENAI_API_KEY".to_string(),
                base_url: None,
            },
            ProviderId::Anthropic => Self {
                id,
                model: "claude-3-5-sonnet-latest".to_string(),
                max_tokens: 300,
                timeout_secs: 60,
                api_key_env: "ANTHROPIC_API_KEY".to_string(),
                base_url: None,
            },
            ProviderId::ImageGen => Self {
                id,
                model: "dall-e-3".to_string(),
                max_tokens: 0,
                timeout_secs: 120,
                api_key_env: "OPENAI_API_KEY".to_string(),
                base_url: None,
            },
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Cost information for a provider/model pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPricing {
    pub provider: ProviderId,
    /// Model name prefix (e.g., "gpt-4o" matches "gpt-4o-2024-08-06").
    pub model_pattern: String,
    #[serde(default)]
    pub input_cost_per_million: f64,
    #[serde(default)]
    pub output_cost_per_million: f64,
    /// Flat cost per generated image.
    #[serde(default)]
    pub per_image_cost: f64,
}
