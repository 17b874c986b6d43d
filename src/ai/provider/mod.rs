//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait: one prompt in, raw model text out.
//! Adapters own request shaping and response unwrapping for one HTTP API
//! each; extraction and normalisation of the text happen upstream.
//!
//! ## Modules
//!
//! - `openai`: OpenAI-compatible chat completions (xAI Grok)
//! - `anthropic`: Anthropic Messages API (Claude)
//! - `gemini`: Google Generative Language API (Gemini)
//! - `transport`: Shared HTTP send and error-body handling

mod anthropic;
mod gemini;
mod openai;
mod transport;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

// Re-export error types from centralized location
pub use crate::types::{ErrorClassifier, FailureKind, ProviderError};

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::constants::{generation, network, providers};
use crate::types::Result;

/// Result of a single provider call
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

// =============================================================================
// Provider Kind
// =============================================================================

/// Supported LLM services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// xAI Grok via the OpenAI-compatible API
    Grok,
    /// Anthropic Claude
    Claude,
    /// Google Gemini
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::Grok, ProviderKind::Claude, ProviderKind::Gemini];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Grok => "grok",
            ProviderKind::Claude => "claude",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Human-facing service name
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Grok => "xAI Grok",
            ProviderKind::Claude => "Anthropic Claude",
            ProviderKind::Gemini => "Google Gemini",
        }
    }

    /// Environment variables holding the API key, in lookup order
    pub fn env_vars(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Grok => &["XAI_API_KEY", "GROK_API_KEY"],
            ProviderKind::Claude => &["ANTHROPIC_API_KEY", "CLAUDE_API_KEY"],
            ProviderKind::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        }
    }

    /// Canonical environment variable, named in remediation messages
    pub fn primary_env_var(&self) -> &'static str {
        self.env_vars()[0]
    }

    pub fn default_api_base(&self) -> &'static str {
        match self {
            ProviderKind::Grok => providers::GROK_API_BASE,
            ProviderKind::Claude => providers::CLAUDE_API_BASE,
            ProviderKind::Gemini => providers::GEMINI_API_BASE,
        }
    }

    pub fn default_models(&self) -> Vec<String> {
        let models = match self {
            ProviderKind::Grok => providers::GROK_MODELS,
            ProviderKind::Claude => providers::CLAUDE_MODELS,
            ProviderKind::Gemini => providers::GEMINI_MODELS,
        };
        models.iter().map(|m| m.to_string()).collect()
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grok" | "xai" => Ok(ProviderKind::Grok),
            "claude" | "anthropic" => Ok(ProviderKind::Claude),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            _ => Err(format!(
                "Unknown provider: {}. Valid values: grok, claude, gemini",
                s
            )),
        }
    }
}

// =============================================================================
// Provider Configuration
// =============================================================================

/// Runtime settings for one adapter, with the credential already resolved
///
/// The API key is held as a `SecretString` and redacted in debug output.
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: SecretString,
    pub api_base: String,
    /// Model identifiers tried in order
    pub models: Vec<String>,
    pub temperature: f32,
    /// Transport-level timeout for a single HTTP request
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("models", &self.models)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// Defaults for `kind` with the given key
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: SecretString::from(api_key.into()),
            api_base: kind.default_api_base().to_string(),
            models: kind.default_models(),
            temperature: generation::DEFAULT_TEMPERATURE,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        if !models.is_empty() {
            self.models = models;
        }
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// Raw model text plus the model that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub model: String,
}

/// Shared LLM provider type for use behind the orchestrator
pub type SharedProvider = Arc<dyn LlmProvider>;

/// LLM provider: sends a prompt, returns the model's raw text
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging and attempt records
    fn name(&self) -> &str;

    /// Model identifiers tried in order by [`LlmProvider::generate`]
    fn models(&self) -> &[String];

    /// One HTTP call against a single model
    async fn complete(&self, model: &str, prompt: &str, max_tokens: u32) -> ProviderResult<String>;

    /// Generate text, cycling through `models()`
    ///
    /// Advances only when a model is reported unknown or unavailable. Every
    /// other failure, authentication included, is returned immediately.
    /// When the list is exhausted the last failure is returned.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> ProviderResult<Completion> {
        let mut last_error = None;

        for model in self.models() {
            debug!("Trying {} model {}", self.name(), model);

            match self.complete(model, prompt, max_tokens).await {
                Ok(text) => {
                    return Ok(Completion {
                        text,
                        model: model.clone(),
                    });
                }
                Err(err) => {
                    let err = if err.model.is_none() {
                        err.with_model(model.as_str())
                    } else {
                        err
                    };
                    if !ErrorClassifier::is_model_unavailable(&err) {
                        return Err(err);
                    }
                    warn!("{} model {} unavailable, trying next: {}", self.name(), model, err.message);
                    last_error = Some(err);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::transport(self.name(), "no models configured")))
    }
}

/// Create a shared provider from configuration
pub fn create_provider(config: ProviderConfig) -> Result<SharedProvider> {
    match config.kind {
        ProviderKind::Grok => Ok(Arc::new(OpenAiProvider::new(config)?)),
        ProviderKind::Claude => Ok(Arc::new(AnthropicProvider::new(config)?)),
        ProviderKind::Gemini => Ok(Arc::new(GeminiProvider::new(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Adapter that replays scripted per-model results
    struct ScriptedProvider {
        models: Vec<String>,
        script: Mutex<Vec<ProviderResult<String>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(models: &[&str], script: Vec<ProviderResult<String>>) -> Self {
            Self {
                models: models.iter().map(|m| m.to_string()).collect(),
                script: Mutex::new(script),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn models(&self) -> &[String] {
            &self.models
        }

        async fn complete(&self, model: &str, _prompt: &str, _max_tokens: u32) -> ProviderResult<String> {
            self.calls.lock().unwrap().push(model.to_string());
            self.script.lock().unwrap().remove(0)
        }
    }

    fn not_found() -> ProviderError {
        ProviderError::http("scripted", 404, "model not found", None)
    }

    #[tokio::test]
    async fn test_generate_first_model() {
        let provider = ScriptedProvider::new(&["a", "b"], vec![Ok("[]".to_string())]);
        let completion = provider.generate("p", 10).await.unwrap();

        assert_eq!(completion.model, "a");
        assert_eq!(provider.calls(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_generate_cycles_on_unavailable_model() {
        let provider = ScriptedProvider::new(
            &["a", "b", "c"],
            vec![Err(not_found()), Ok("[]".to_string())],
        );
        let completion = provider.generate("p", 10).await.unwrap();

        assert_eq!(completion.model, "b");
        assert_eq!(provider.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_generate_stops_on_auth() {
        let provider = ScriptedProvider::new(
            &["a", "b"],
            vec![Err(ProviderError::http("scripted", 401, "invalid x-api-key", None))],
        );
        let err = provider.generate("p", 10).await.unwrap_err();

        assert_eq!(err.status, Some(401));
        assert_eq!(err.model.as_deref(), Some("a"));
        assert_eq!(provider.calls(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_generate_stops_on_other_errors() {
        let provider = ScriptedProvider::new(
            &["a", "b"],
            vec![Err(ProviderError::http("scripted", 500, "internal error", None))],
        );
        provider.generate("p", 10).await.unwrap_err();

        assert_eq!(provider.calls(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_generate_returns_last_error_when_exhausted() {
        let provider = ScriptedProvider::new(&["a", "b"], vec![Err(not_found()), Err(not_found())]);
        let err = provider.generate("p", 10).await.unwrap_err();

        assert_eq!(err.model.as_deref(), Some("b"));
        assert_eq!(provider.calls(), vec!["a", "b"]);
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("Claude".parse::<ProviderKind>(), Ok(ProviderKind::Claude));
        assert_eq!("xai".parse::<ProviderKind>(), Ok(ProviderKind::Grok));
        assert!("openai".parse::<ProviderKind>().is_err());
        assert_eq!(
            serde_json::to_string(&ProviderKind::Gemini).unwrap(),
            "\"gemini\""
        );
    }

    #[test]
    fn test_provider_config_debug_redacts_key() {
        let config = ProviderConfig::new(ProviderKind::Claude, "sk-ant-secret")
            .with_api_base("http://localhost:1234/");
        let debug = format!("{:?}", config);

        assert!(!debug.contains("sk-ant-secret"));
        assert!(debug.contains("[REDACTED]"));
        assert_eq!(config.api_base, "http://localhost:1234");
    }
}
