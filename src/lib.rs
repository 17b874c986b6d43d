//! formsmith - AI-Driven Form Generator
//!
//! Turns a free-form description or a structured topic into a validated list
//! of form fields by asking an LLM, with provider fallback when the first
//! choice is out of credit, throttled or returns unusable output.
//!
//! ## Core Features
//!
//! - **Three Providers**: xAI Grok, Anthropic Claude, Google Gemini
//! - **Classified Fallback**: one hop to a secondary provider, never on auth failure
//! - **Model Cycling**: each provider walks its model list when a model is unavailable
//! - **Tolerant Parsing**: JSON extracted from prose, fences and trailing commas
//! - **Normalisation**: every field leaves with a known type, label and options
//!
//! ## Quick Start
//!
//! ```ignore
//! use formsmith::{ConfigLoader, GenerationOrchestrator, GenerationRequest};
//!
//! let config = ConfigLoader::load()?;
//! let orchestrator = GenerationOrchestrator::from_config(&config)?;
//! let outcome = orchestrator
//!     .generate(&GenerationRequest::prompt("customer satisfaction survey"))
//!     .await;
//! for field in outcome.fields() {
//!     println!("{} ({})", field.label, field.field_type);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: providers, prompt, extraction, normalisation, orchestrator
//! - [`config`]: layered configuration
//! - [`types`]: fields, requests, outcomes, errors

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, GenerationConfig, ProviderSettings, ProvidersConfig};

// Error Types
pub use types::error::{ErrorClassifier, FailureKind, FormError, ProviderError, Result};

// Domain Types
pub use types::{
    Field, FieldType, GenerationIntent, GenerationOutcome, GenerationRequest, OutcomeKind,
    ProviderAttempt,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    FallbackPolicy, GenerationOrchestrator, LlmProvider, ProviderKind, SharedProvider,
    TimeoutConfig,
};
