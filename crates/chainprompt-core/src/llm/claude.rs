use crate::constants::{endpoints, generation, models};
use crate::error::{ChainPromptError, Result};
use crate::llm::traits::*;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Mutex;

/// Anthropic Messages API client.
///
/// Keeps a short-term turn buffer so the API sees the running conversation;
/// `clear_conversation` empties it. The buffer is behind a mutex because
/// `send` takes `&self` across an await.
pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
    system_instructions: String,
    turns: Mutex<Vec<Message>>,
}

impl ClaudeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: models::DEFAULT_CLAUDE_MODEL.to_string(),
            base_url: endpoints::CLAUDE_BASE_URL.to_string(),
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
        let messages: Vec<Value> = turns
            .iter()
            .map(|m| json!({ "role": m.role, "content": m.content }))
            .collect();

        json!({
            "model": model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "system": self.system_instructions,
            "messages": messages,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ClaudeApiResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[async_trait::async_trait]
impl Provider for ClaudeClient {
    async fn send(&self, prompt: &str, model: &str) -> Result<String> {
        let url = format!("{}/messages", self.base_url);

        let turns = {
            let mut snapshot = self.turns.lock().expect("turn buffer poisoned").clone();
            snapshot.push(Message::user(prompt));
            snapshot
        };
        let request_body = self.build_request_body(&turns, model);

        tracing::debug!(model = %model, "sending prompt to Claude");
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ChainPromptError::Provider(format!("Claude request failed: {e}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ChainPromptError::Provider(format!("Claude response read failed: {e}")))?;

        if !status.is_success() {
            return Err(ChainPromptError::Provider(format!(
                "Claude API error ({status}): {response_text}"
            )));
        }

        let api_response: ClaudeApiResponse = serde_json::from_str(&response_text)
            .map_err(|e| ChainPromptError::Provider(format!("failed to parse Claude response: {e}")))?;

        let text = api_response
            .content
            .iter()
            .find(|c| c.content_type == "text")
            .map(|c| c.text.clone())
            .ok_or_else(|| {
                ChainPromptError::Provider("Claude response had no text content".to_string())
            })?;

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
