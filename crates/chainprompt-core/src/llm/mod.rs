pub mod claude;
pub mod openai;
pub mod provider;
pub mod traits;

pub use claude::ClaudeClient;
pub use openai::OpenAiCompatClient;
pub use provider::{ProviderConfig, ProviderId, ProviderRegistry};
pub use traits::{Message, Provider, Role};
