use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::client::ConversationClient;
use crate::constants::generation;
use crate::llm::provider::{ProviderConfig, ProviderId, ProviderRegistry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub provider: ProviderId,
    pub model: String,
    /// Environment variable holding the API key; empty means "use the
    /// provider's default env var".
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_instructions: String,
}

impl Default for Settings {
    fn default() -> Self {
        let provider = ProviderId::Claude;
        Self {
            llm: LlmSettings {
                model: provider.default_model().to_string(),
                api_key_env: String::new(),
                base_url: None,
                max_tokens: generation::DEFAULT_MAX_TOKENS,
                temperature: generation::DEFAULT_TEMPERATURE,
                system_instructions: generation::DEFAULT_SYSTEM_INSTRUCTIONS.to_string(),
                provider,
            },
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chainprompt")
            .join("config.toml")
    }

    /// Load settings from the config file, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        if config_path.exists() {
            if let Ok(content) = std::fs::read_to_string(&config_path) {
                if let Ok(config) = toml::from_str(&content) {
                    return config;
                }
            }
        }
        Self::default()
    }

    pub fn save(&self) -> crate::error::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ChainPromptError::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// The env var the API key is read from.
    pub fn api_key_env(&self) -> &str {
        if self.llm.api_key_env.is_empty() {
            self.llm.provider.default_api_key_env()
        } else {
            &self.llm.api_key_env
        }
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(self.api_key_env()).ok()
    }

    /// Build a ProviderRegistry with these settings applied to the active
    /// provider.
    pub fn build_provider_registry(&self) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();

        let mut config = ProviderConfig::for_id(self.llm.provider.clone());
        config.api_key_env = self.api_key_env().to_string();
        if let Some(ref base_url) = self.llm.base_url {
            config.base_url = base_url.clone();
        }
        config.max_tokens = self.llm.max_tokens;
        config.temperature = self.llm.temperature;
        config.system_instructions = self.llm.system_instructions.clone();
        registry.add_provider(config);

        registry.set_active(self.llm.provider.clone(), self.llm.model.clone());
        registry
    }

    /// Build a ready ConversationClient. Missing credentials surface as a
    /// configuration error here, before any call is made.
    pub fn build_client(&self) -> crate::error::Result<ConversationClient> {
        let registry = self.build_provider_registry();
        let provider = registry.build_active_client()?;
        Ok(ConversationClient::new(provider))
    }
}
