//! OpenAI-Compatible Provider
//!
//! Chat Completions API with bearer authentication. Serves xAI Grok, whose
//! endpoint speaks the same protocol.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::transport::{build_client, non_empty_text, send_json};
use super::{LlmProvider, ProviderConfig, ProviderResult};
use crate::types::Result;

/// OpenAI-compatible provider with secure API key handling
pub struct OpenAiProvider {
    name: String,
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    models: Vec<String>,
    temperature: f32,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("name", &self.name)
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("models", &self.models)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenAiProvider {
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

    fn build_request(&self, model: &str, prompt: &str, max_tokens: u32) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
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

        let url = format!("{}/chat/completions", self.api_base);
        let request = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.build_request(model, prompt, max_tokens));

        let response: ChatCompletionResponse = send_json(&self.name, request)
            .await
            .map_err(|e| e.with_model(model))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);

        non_empty_text(&self.name, text).map_err(|e| e.with_model(model))
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::ProviderKind;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenAiProvider {
        let config = ProviderConfig::new(ProviderKind::Grok, "xai-test-key")
            .with_api_base(server.uri())
            .with_models(vec!["grok-beta".to_string(), "grok-2-latest".to_string()]);
        OpenAiProvider::new(config).unwrap()
    }

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
    }

    #[tokio::test]
    async fn test_request_shape_and_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer xai-test-key"))
            .and(body_partial_json(json!({
                "model": "grok-beta",
                "max_tokens": 1024,
                "messages": [{"role": "user", "content": "make a survey"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("[]")))
            .expect(1)
            .mount(&server)
            .await;

        let completion = provider(&server).generate("make a survey", 1024).await.unwrap();
        assert_eq!(completion.text, "[]");
        assert_eq!(completion.model, "grok-beta");
    }

    #[tokio::test]
    async fn test_cycles_to_next_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"model": "grok-beta"})))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "The model grok-beta does not exist or your team does not have access to it."
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"model": "grok-2-latest"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("[{}]")))
            .expect(1)
            .mount(&server)
            .await;

        let completion = provider(&server).generate("p", 100).await.unwrap();
        assert_eq!(completion.model, "grok-2-latest");
        assert_eq!(completion.text, "[{}]");
    }

    #[tokio::test]
    async fn test_auth_failure_not_cycled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "Incorrect API key provided"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server).generate("p", 100).await.unwrap_err();
        assert_eq!(err.status, Some(401));
        assert_eq!(err.message, "Incorrect API key provided");
        assert_eq!(err.provider, "grok");
    }

    #[tokio::test]
    async fn test_empty_content_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = provider(&server).generate("p", 100).await.unwrap_err();
        assert_eq!(err.status, None);
        assert!(err.message.contains("no text"));
    }

    #[tokio::test]
    async fn test_unparseable_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server).generate("p", 100).await.unwrap_err();
        assert_eq!(err.status, Some(502));
        assert_eq!(err.message, "<html>bad gateway</html>");
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider =
            OpenAiProvider::new(ProviderConfig::new(ProviderKind::Grok, "xai-very-secret")).unwrap();
        assert!(!format!("{:?}", provider).contains("xai-very-secret"));
    }
}
