//! Generation Request and Outcome Types
//!
//! Per-call values: created for one orchestrator call, never mutated after
//! construction, discarded once the caller has the outcome.

use serde::{Deserialize, Serialize};

use super::error::FailureKind;
use super::field::Field;
use crate::ai::provider::ProviderKind;
use crate::constants::generation as gen_constants;

// =============================================================================
// Request
// =============================================================================

/// What the caller wants generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerationIntent {
    /// Structured topic request
    Topic {
        topic: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(rename = "questionCount", default = "default_question_count")]
        question_count: u32,
    },
    /// Free-form description of the form
    Prompt { prompt: String },
}

fn default_question_count() -> u32 {
    gen_constants::DEFAULT_QUESTION_COUNT
}

/// Caller intent plus an optional provider choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(flatten)]
    pub intent: GenerationIntent,
    /// Provider to use as primary for this call only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
}

impl GenerationRequest {
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            intent: GenerationIntent::Prompt {
                prompt: prompt.into(),
            },
            provider: None,
        }
    }

    pub fn topic(
        topic: impl Into<String>,
        description: Option<String>,
        question_count: Option<u32>,
    ) -> Self {
        Self {
            intent: GenerationIntent::Topic {
                topic: topic.into(),
                description,
                question_count: question_count.unwrap_or(gen_constants::DEFAULT_QUESTION_COUNT),
            },
            provider: None,
        }
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Check caller input, returning a message fit for the end user
    pub fn validate(&self) -> std::result::Result<(), String> {
        match &self.intent {
            GenerationIntent::Prompt { prompt } if prompt.trim().is_empty() => {
                Err("A prompt describing the form is required".to_string())
            }
            GenerationIntent::Topic { topic, .. } if topic.trim().is_empty() => {
                Err("Topic is required".to_string())
            }
            GenerationIntent::Topic { question_count, .. }
                if *question_count == 0 || *question_count > gen_constants::MAX_QUESTION_COUNT =>
            {
                Err(format!(
                    "Question count must be between 1 and {}, got {}",
                    gen_constants::MAX_QUESTION_COUNT,
                    question_count
                ))
            }
            _ => Ok(()),
        }
    }

    pub fn is_topic(&self) -> bool {
        matches!(self.intent, GenerationIntent::Topic { .. })
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// User-facing failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// No API key configured for the provider that had to be used
    MissingCredential,
    AuthFailed,
    QuotaExceeded,
    RateLimited,
    /// Provider answered but the text held no usable field list
    UpstreamMalformedResponse,
    /// Provider failed for a reason with no more specific kind
    UpstreamFailed,
    BothProvidersFailed,
    /// Caller omitted or mangled required input
    InvalidRequest,
}

impl OutcomeKind {
    /// Map a classified provider failure onto the user-facing taxonomy
    pub fn from_failure(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Auth => OutcomeKind::AuthFailed,
            FailureKind::QuotaOrCredit => OutcomeKind::QuotaExceeded,
            FailureKind::RateLimited => OutcomeKind::RateLimited,
            FailureKind::BadRequestOther | FailureKind::Unknown => OutcomeKind::UpstreamFailed,
        }
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutcomeKind::MissingCredential => "missing credential",
            OutcomeKind::AuthFailed => "authentication failed",
            OutcomeKind::QuotaExceeded => "quota exceeded",
            OutcomeKind::RateLimited => "rate limited",
            OutcomeKind::UpstreamMalformedResponse => "malformed provider response",
            OutcomeKind::UpstreamFailed => "provider request failed",
            OutcomeKind::BothProvidersFailed => "both providers failed",
            OutcomeKind::InvalidRequest => "invalid request",
        };
        f.write_str(s)
    }
}

/// Result of one adapter invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptStatus {
    Succeeded,
    Failed {
        kind: OutcomeKind,
        /// Classifier verdict, absent when no provider call failed
        #[serde(skip_serializing_if = "Option::is_none")]
        failure: Option<FailureKind>,
        message: String,
    },
}

/// Diagnostic record of one provider call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderAttempt {
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub status: AttemptStatus,
}

impl ProviderAttempt {
    pub fn succeeded(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: Some(model.into()),
            status: AttemptStatus::Succeeded,
        }
    }

    pub fn failed(
        provider: impl Into<String>,
        model: Option<String>,
        kind: OutcomeKind,
        failure: Option<FailureKind>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            model,
            status: AttemptStatus::Failed {
                kind,
                failure,
                message: message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, AttemptStatus::Succeeded)
    }

    /// Outcome kind of a failed attempt
    pub fn failure_kind(&self) -> Option<OutcomeKind> {
        match &self.status {
            AttemptStatus::Succeeded => None,
            AttemptStatus::Failed { kind, .. } => Some(*kind),
        }
    }

    /// Classifier verdict of a failed attempt
    pub fn classification(&self) -> Option<FailureKind> {
        match &self.status {
            AttemptStatus::Succeeded => None,
            AttemptStatus::Failed { failure, .. } => *failure,
        }
    }
}

/// Final answer of one orchestrator call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Success {
        fields: Vec<Field>,
        provider_used: String,
        model_used: String,
        was_fallback: bool,
        /// Coercions the normaliser applied
        notes: Vec<String>,
        attempts: Vec<ProviderAttempt>,
    },
    Failure {
        kind: OutcomeKind,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        remediation: Option<String>,
        attempts: Vec<ProviderAttempt>,
    },
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success { .. })
    }

    pub fn fields(&self) -> &[Field] {
        match self {
            GenerationOutcome::Success { fields, .. } => fields,
            GenerationOutcome::Failure { .. } => &[],
        }
    }

    pub fn attempts(&self) -> &[ProviderAttempt] {
        match self {
            GenerationOutcome::Success { attempts, .. } => attempts,
            GenerationOutcome::Failure { attempts, .. } => attempts,
        }
    }

    /// Failure kind, `None` on success
    pub fn kind(&self) -> Option<OutcomeKind> {
        match self {
            GenerationOutcome::Success { .. } => None,
            GenerationOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn was_fallback(&self) -> bool {
        matches!(
            self,
            GenerationOutcome::Success {
                was_fallback: true,
                ..
            }
        )
    }
}
