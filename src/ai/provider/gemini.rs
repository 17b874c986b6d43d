//! Google Gemini Provider
//!
//! `generateContent` endpoint; the API key travels in the query string.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use super::transport::{build_client, non_empty_text, send_json};
use super::{LlmProvider, ProviderConfig, ProviderResult};
use crate::types::{ProviderError, Result};

pub struct GeminiProvider {
    name: String,
    api_key: SecretString,
    api_base: String,
    models: Vec<String>,
    temperature: f32,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("models", &self.models)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl GeminiProvider {
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

    fn endpoint(&self, model: &str) -> ProviderResult<Url> {
        let mut url = Url::parse(&format!("{}/models/{}:generateContent", self.api_base, model))
            .map_err(|e| {
                ProviderError::transport(&self.name, format!("invalid endpoint URL: {}", e))
            })?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());
        Ok(url)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
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

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: max_tokens,
            },
        };

        let url = self.endpoint(model).map_err(|e| e.with_model(model))?;
        let request = self.client.post(url).json(&body);

        let response: GenerateContentResponse = send_json(&self.name, request)
            .await
            .map_err(|e| e.with_model(model))?;

        if response.candidates.is_empty()
            && let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason)
        {
            return Err(ProviderError::transport(
                &self.name,
                format!("prompt blocked: {}", reason),
            )
            .with_model(model));
        }

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            });

        non_empty_text(&self.name, text).map_err(|e| e.with_model(model))
    }
}

// Request types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

// Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
