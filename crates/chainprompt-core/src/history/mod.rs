pub mod composer;
pub mod resolver;
pub mod store;

pub use composer::PromptComposer;
pub use resolver::{ChainEntry, ChainResolver};
pub use store::{Interaction, InteractionStore};
