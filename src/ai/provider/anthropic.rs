//! Anthropic Messages API Provider
//!
//! Authenticates with `x-api-key` and pins `anthropic-version`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::transport::{build_client, non_empty_text, send_json};
use super::{LlmProvider, ProviderConfig, ProviderResult};
use crate::constants::providers::ANTHROPIC_VERSION;
use crate::types::Result;

pub struct AnthropicProvider {
    name: String,
    api_key: SecretString,
    api_base: String,
    models: Vec<String>,
    temperature: f32,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("models", &self.models)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = build_client(&config)?;

        Ok(Self {
            name: config.kind.name().to_string(),
            api_key: config.api_key,
            api_base: config.api_base,
            models: config.models,
            temperature: config.temperature,
            client,
        })
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn models(&self) -> &[String] {
        &self.models
    }

    async fn complete(&self, model: &str, prompt: &str, max_tokens: u32) -> ProviderResult<String> {
        info!(
            "Generating with {} (model: {}, max_tokens: {})",
            self.name, model, max_tokens
        );

        let body = MessagesRequest {
            model,
            max_tokens,
            temperature: self.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let request = self
            .client
            .post(format!("{}/messages", self.api_base))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);

        let response: MessagesResponse = send_json(&self.name, request)
            .await
            .map_err(|e| e.with_model(model))?;

        // First text block; tool or thinking blocks carry no form output
        let text = response
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text);

        non_empty_text(&self.name, text).map_err(|e| e.with_model(model))
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}
