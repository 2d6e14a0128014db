use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One turn of a provider-side conversation buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// The model-provider boundary. One capability: send a prompt, get text back.
///
/// Any transport, auth, or rate-limit failure surfaces uniformly as
/// `ChainPromptError::Provider`; callers never see provider-specific subtypes.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Send `prompt` to `model` and return the response text.
    async fn send(&self, prompt: &str, model: &str) -> Result<String>;

    /// Reset the provider's own short-term turn buffer. Recorded interaction
    /// history lives elsewhere and is not affected.
    fn clear_conversation(&self);

    fn default_model(&self) -> &str;
}
