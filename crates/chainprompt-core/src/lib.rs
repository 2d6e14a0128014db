pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod llm;

// Re-export key types
pub use client::{ConversationClient, GenerateOptions};
pub use config::Settings;
pub use error::{ChainPromptError, Result};
pub use history::{ChainEntry, ChainResolver, Interaction, InteractionStore, PromptComposer};
pub use llm::{Message, Provider, ProviderConfig, ProviderId, ProviderRegistry, Role};
