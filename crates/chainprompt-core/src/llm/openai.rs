use crate::constants::{endpoints, generation, models};
use crate::error::{ChainPromptError, Result};
use crate::llm::traits::*;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Mutex;

/// Client for the OpenAI `chat/completions` wire format.
///
/// Also serves any OpenAI-compatible endpoint (Gemini's compatibility
/// surface, self-hosted gateways) via `with_base_url`.
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
    system_instructions: String,
    turns: Mutex<Vec<Message>>,
}

impl OpenAiCompatClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: models::DEFAULT_OPENAI_MODEL.to_string(),
            base_url: endpoints::OPENAI_BASE_URL.to_string(),
            max_tokens: generation::DEFAULT_MAX_TOKENS,
            temperature: generation::DEFAULT_TEMPERATURE,
            system_instructions: generation::DEFAULT_SYSTEM_INSTRUCTIONS.to_string(),
            turns: Mutex::new(Vec::new()),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_system_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.system_instructions = instructions.into();
        self
    }

    fn build_request_body(&self, turns: &[Message], model: &str) -> Value {
        let mut messages = vec![json!({
            "role": "system",
            "content": self.system_instructions,
        })];
        messages.extend(
            turns
                .iter()
                .map(|m| json!({ "role": m.role, "content": m.content })),
        );

        json!({
            "model": model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": messages,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait::async_trait]
impl Provider for OpenAiCompatClient {
    async fn send(&self, prompt: &str, model: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let turns = {
            let mut snapshot = self.turns.lock().expect("turn buffer poisoned").clone();
            snapshot.push(Message::user(prompt));
            snapshot
        };
        let request_body = self.build_request_body(&turns, model);

        tracing::debug!(model = %model, url = %url, "sending chat completion request");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ChainPromptError::Provider(format!("chat request failed: {e}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ChainPromptError::Provider(format!("chat response read failed: {e}")))?;

        if !status.is_success() {
            return Err(ChainPromptError::Provider(format!(
                "chat API error ({status}): {response_text}"
            )));
        }

        let api_response: ChatCompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| ChainPromptError::Provider(format!("failed to parse chat response: {e}")))?;

        let text = api_response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| ChainPromptError::Provider("chat response had no content".into()))?;

        let mut turns = self.turns.lock().expect("turn buffer poisoned");
        turns.push(Message::user(prompt));
        turns.push(Message::assistant(&text));

        Ok(text)
    }

    fn clear_conversation(&self) {
        self.turns.lock().expect("turn buffer poisoned").clear();
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}
