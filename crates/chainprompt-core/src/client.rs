use crate::error::Result;
use crate::history::{ChainResolver, Interaction, InteractionStore, PromptComposer};
use crate::llm::Provider;
use serde_json::Value;
use std::collections::HashMap;

/// Per-call knobs for [`ConversationClient::generate_response`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Overrides the provider's default model for this call.
    pub model: Option<String>,
    /// Key the interaction is recorded under; defaults to the caller's
    /// original prompt text.
    pub prompt_name: Option<String>,
    /// Prompt names whose transitive history is injected as context.
    pub history_refs: Vec<String>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_prompt_name(mut self, name: impl Into<String>) -> Self {
        self.prompt_name = Some(name.into());
        self
    }

    pub fn with_history_refs(mut self, refs: Vec<String>) -> Self {
        self.history_refs = refs;
        self
    }
}

/// Ties provider, history store, chain resolution, and prompt composition
/// together. Owns its store: one client, one independent history, no globals.
pub struct ConversationClient {
    provider: Box<dyn Provider>,
    store: InteractionStore,
}

impl std::fmt::Debug for ConversationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationClient")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl ConversationClient {
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self {
            provider,
            store: InteractionStore::new(),
        }
    }

    /// Compose, send, record.
    ///
    /// Referenced history is resolved and rendered ahead of the prompt, the
    /// provider is awaited (the only suspension point), and on success the
    /// exchange is recorded under `prompt_name` (or the original prompt text).
    /// On provider failure nothing is recorded and the error propagates.
    pub async fn generate_response(
        &mut self,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<String> {
        let model = options
            .model
            .unwrap_or_else(|| self.provider.default_model().to_string());

        let chain = ChainResolver::resolve(&self.store, &options.history_refs);
        let final_prompt = PromptComposer::compose(&chain, prompt);
        tracing::debug!(
            model = %model,
            chain_len = chain.len(),
            "generating response"
        );

        let response = self.provider.send(&final_prompt, &model).await?;

        // Recorded under the caller's name, or the original unexpanded
        // prompt when no name was given (never the composed prompt).
        let name = options.prompt_name.unwrap_or_else(|| prompt.to_string());
        self.store.add(
            model,
            final_prompt,
            response.clone(),
            Some(name),
            options.history_refs,
        );
        tracing::info!("response generated and recorded");
        Ok(response)
    }

    /// Shorthand for a call with no name, model override, or history refs.
    pub async fn generate(&mut self, prompt: &str) -> Result<String> {
        self.generate_response(prompt, GenerateOptions::new()).await
    }

    /// Reset the provider's own turn buffer. The interaction store is
    /// durable for the life of this client and is never cleared.
    pub fn clear_conversation(&self) {
        tracing::info!("clearing provider turn buffer (interaction history retained)");
        self.provider.clear_conversation();
    }

    pub fn store(&self) -> &InteractionStore {
        &self.store
    }

    /// Absorb another client's history into this one.
    pub fn merge_history(&mut self, other: &InteractionStore) {
        self.store.merge(other);
    }

    // ── History queries, delegating to the store ──

    pub fn interaction_history(&self) -> Vec<Interaction> {
        self.store.all_interactions()
    }

    pub fn last_n_interactions(&self, n: usize) -> Vec<Interaction> {
        let all = self.store.all_interactions();
        let skip = all.len().saturating_sub(n);
        all.into_iter().skip(skip).collect()
    }

    pub fn interaction(&self, sequence_number: u64) -> Option<Interaction> {
        self.store
            .all_interactions()
            .into_iter()
            .find(|i| i.sequence_number == sequence_number)
    }

    pub fn model_interactions(&self, model: &str) -> Vec<Interaction> {
        self.store
            .all_interactions()
            .into_iter()
            .filter(|i| i.model == model)
            .collect()
    }

    pub fn interactions_by_prompt_name(&self, name: &str) -> Vec<Interaction> {
        self.store.interactions_for(name)
    }

    pub fn latest_interaction(&self) -> Option<Interaction> {
        self.store.all_interactions().into_iter().last()
    }

    pub fn prompt_history(&self) -> Vec<String> {
        self.store
            .all_interactions()
            .into_iter()
            .map(|i| i.prompt)
            .collect()
    }

    pub fn response_history(&self) -> Vec<String> {
        self.store
            .all_interactions()
            .into_iter()
            .map(|i| i.response)
            .collect()
    }

    pub fn model_usage_stats(&self) -> HashMap<String, usize> {
        let mut stats = HashMap::new();
        for interaction in self.store.all_interactions() {
            *stats.entry(interaction.model).or_insert(0) += 1;
        }
        stats
    }

    pub fn prompt_name_usage_stats(&self) -> HashMap<String, usize> {
        self.store.usage_stats()
    }

    /// Whole history as JSON for external inspection.
    pub fn history_json(&self) -> Value {
        self.store.to_json()
    }

    /// Tagged-block rendering of the latest interaction per name, for
    /// embedding in other prompts.
    pub fn formatted_responses(&self, names: &[String]) -> String {
        PromptComposer::formatted_responses(&self.store, names)
    }
}
