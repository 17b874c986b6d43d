//! AI Integration Layer
//!
//! LLM providers, prompt construction, response parsing and the fallback
//! orchestrator that ties them together.

pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use orchestrator::{FallbackPolicy, GenerationOrchestrator};
pub use prompt::{PromptBuilder, PromptSection, build_prompt};
pub use provider::{
    AnthropicProvider, Completion, GeminiProvider, LlmProvider, OpenAiProvider, ProviderConfig,
    ProviderKind, ProviderResult, SharedProvider, create_provider,
};
pub use timeout::{TimeoutConfig, with_provider_timeout};
pub use validation::{FieldNormalizer, Normalized, extract_json, normalize, parse_fields};
