use crate::constants::{endpoints, models};
use crate::error::{ChainPromptError, Result};
use crate::llm::claude::ClaudeClient;
use crate::llm::openai::OpenAiCompatClient;
use crate::llm::traits::Provider;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifies a specific model provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Claude,
    OpenAI,
    Gemini,
    Custom(String),
}

impl ProviderId {
    pub fn name(&self) -> &str {
        match self {
            Self::Claude => "Claude (Anthropic)",
            Self::OpenAI => "OpenAI",
            Self::Gemini => "Gemini (Google)",
            Self::Custom(name) => name,
        }
    }

    pub fn default_base_url(&self) -> &str {
        match self {
            Self::Claude => endpoints::CLAUDE_BASE_URL,
            Self::OpenAI => endpoints::OPENAI_BASE_URL,
            Self::Gemini => endpoints::GEMINI_BASE_URL,
            Self::Custom(_) => "",
        }
    }

    pub fn default_model(&self) -> &str {
        match self {
            Self::Claude => models::DEFAULT_CLAUDE_MODEL,
            Self::OpenAI => models::DEFAULT_OPENAI_MODEL,
            Self::Gemini => models::DEFAULT_GEMINI_MODEL,
            Self::Custom(_) => "",
        }
    }

    pub fn default_api_key_env(&self) -> &str {
        match self {
            Self::Claude => "ANTHROPIC_API_KEY",
            Self::OpenAI => "OPENAI_TOKEN",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Custom(_) => "",
        }
    }

    pub fn all_builtin() -> Vec<ProviderId> {
        vec![Self::Claude, Self::OpenAI, Self::Gemini]
    }

    /// Parse a user-facing provider name ("claude", "openai", "gemini");
    /// anything else is a custom provider.
    pub fn from_name(name: &str) -> ProviderId {
        match name.to_lowercase().as_str() {
            "claude" | "anthropic" => Self::Claude,
            "openai" => Self::OpenAI,
            "gemini" | "google" => Self::Gemini,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Connection and generation settings for one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub enabled: bool,
    pub api_key_env: String,
    pub base_url: String,
    pub default_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_instructions: String,
}

impl ProviderConfig {
    pub fn for_id(id: ProviderId) -> Self {
        Self {
            enabled: true,
            api_key_env: id.default_api_key_env().to_string(),
            base_url: id.default_base_url().to_string(),
            default_model: id.default_model().to_string(),
            max_tokens: crate::constants::generation::DEFAULT_MAX_TOKENS,
            temperature: crate::constants::generation::DEFAULT_TEMPERATURE,
            system_instructions: crate::constants::generation::DEFAULT_SYSTEM_INSTRUCTIONS
                .to_string(),
            id,
        }
    }
}

/// Knows how to build the active provider client from configuration.
pub struct ProviderRegistry {
    configs: HashMap<ProviderId, ProviderConfig>,
    active: ProviderId,
    active_model: String,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        let mut configs = HashMap::new();
        for id in ProviderId::all_builtin() {
            configs.insert(id.clone(), ProviderConfig::for_id(id));
        }
        Self {
            configs,
            active: ProviderId::Claude,
            active_model: models::DEFAULT_CLAUDE_MODEL.to_string(),
        }
    }

    /// Register or override a provider entry.
    pub fn add_provider(&mut self, config: ProviderConfig) {
        self.configs.insert(config.id.clone(), config);
    }

    pub fn set_active(&mut self, id: ProviderId, model: impl Into<String>) {
        let model = model.into();
        self.active_model = if model.is_empty() {
            id.default_model().to_string()
        } else {
            model
        };
        self.active = id;
    }

    pub fn active_provider(&self) -> &ProviderId {
        &self.active
    }

    pub fn active_model(&self) -> &str {
        &self.active_model
    }

    pub fn config(&self, id: &ProviderId) -> Option<&ProviderConfig> {
        self.configs.get(id)
    }

    /// Build a boxed client for the active provider. A missing API key is a
    /// fatal configuration error, surfaced here at construction.
    pub fn build_active_client(&self) -> Result<Box<dyn Provider>> {
        let config = self.configs.get(&self.active).ok_or_else(|| {
            ChainPromptError::Config(format!("provider {} is not configured", self.active))
        })?;
        if !config.enabled {
            return Err(ChainPromptError::Config(format!(
                "provider {} is disabled",
                self.active
            )));
        }

        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ChainPromptError::Config(format!(
                "API key not found: environment variable {} is not set",
                config.api_key_env
            ))
        })?;

        let client: Box<dyn Provider> = match &self.active {
            ProviderId::Claude => Box::new(
                ClaudeClient::new(api_key)
                    .with_base_url(config.base_url.clone())
                    .with_model(self.active_model.clone())
                    .with_max_tokens(config.max_tokens)
                    .with_temperature(config.temperature)
                    .with_system_instructions(config.system_instructions.clone()),
            ),
            ProviderId::OpenAI | ProviderId::Gemini | ProviderId::Custom(_) => Box::new(
                OpenAiCompatClient::new(api_key)
                    .with_base_url(config.base_url.clone())
                    .with_model(self.active_model.clone())
                    .with_max_tokens(config.max_tokens)
                    .with_temperature(config.temperature)
                    .with_system_instructions(config.system_instructions.clone()),
            ),
        };
        Ok(client)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
