//! Unified Error Type System
//!
//! Centralized error types for the entire crate.
//! Provides failure classification for provider fallback decisions.
//!
//! ## Failure Kinds
//!
//! - **Auth**: Credential rejected (never retried, never falls back)
//! - **QuotaOrCredit**: Account out of credit or quota (fallback)
//! - **RateLimited**: Provider throttling (fallback)
//! - **BadRequestOther**: Any other HTTP 400 (fallback)
//! - **Unknown**: Network failure, timeout, 5xx, empty or odd responses (fallback)
//!
//! ## Design Principles
//!
//! - Provider failures are values (`ProviderError`), never panics
//! - Classification is pure and reads both the structured message and raw body
//! - One crate error (`FormError`) for everything outside the generation path

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Failure Kinds
// =============================================================================

/// Classified failure of a single provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Credential missing, invalid or unauthorized
    Auth,
    /// Credit balance or quota exhausted
    QuotaOrCredit,
    /// HTTP 400 not caused by credit exhaustion
    BadRequestOther,
    /// Provider is throttling requests
    RateLimited,
    /// Anything else: transport failure, timeout, 5xx, unusable response
    Unknown,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth => write!(f, "AUTH"),
            Self::QuotaOrCredit => write!(f, "QUOTA_OR_CREDIT"),
            Self::BadRequestOther => write!(f, "BAD_REQUEST"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// Provider Error
// =============================================================================

/// Failure of one provider call, as seen at the adapter boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// Provider that produced the error
    pub provider: String,
    /// Model identifier that was being tried, if a request was built
    pub model: Option<String>,
    /// HTTP status, absent for transport failures and timeouts
    pub status: Option<u16>,
    /// Best-effort human-readable message
    pub message: String,
    /// Raw response body, when one was received
    pub body: Option<String>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}", self.provider)?;
        if let Some(model) = &self.model {
            write!(f, "/{}", model)?;
        }
        if let Some(status) = self.status {
            write!(f, " HTTP {}", status)?;
        }
        write!(f, "] {}", self.message)
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    /// Non-2xx response from the provider
    pub fn http(
        provider: impl Into<String>,
        status: u16,
        message: impl Into<String>,
        body: Option<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            model: None,
            status: Some(status),
            message: message.into(),
            body,
        }
    }

    /// Failure before any HTTP status was received
    pub fn transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: None,
            status: None,
            message: message.into(),
            body: None,
        }
    }

    /// Call did not finish within its time bound
    pub fn timeout(provider: impl Into<String>, duration: Duration) -> Self {
        Self::transport(
            provider,
            format!("request timed out after {}s", duration.as_secs()),
        )
    }

    /// Attach the model that was being tried
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Lowercased message and body, the text classification runs against
    fn haystack(&self) -> String {
        let mut text = self.message.to_lowercase();
        if let Some(body) = &self.body {
            text.push('\n');
            text.push_str(&body.to_lowercase());
        }
        text
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

const AUTH_PATTERNS: &[&str] = &[
    "unauthorized",
    "authorization",
    "authentication",
    "api key",
    "api-key",
    "api_key",
    "apikey",
];

const CREDIT_PATTERNS: &[&str] = &["credit", "balance", "quota"];

const RATE_LIMIT_PATTERNS: &[&str] = &["rate limit", "rate-limit", "rate_limit", "too many requests"];

fn contains_any(haystack: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| haystack.contains(p))
}

/// Error classifier for fallback routing
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify a provider failure
    ///
    /// Status codes take precedence, message wording decides the rest.
    pub fn classify(err: &ProviderError) -> FailureKind {
        let haystack = err.haystack();

        match err.status {
            Some(401) => return FailureKind::Auth,
            Some(400) if contains_any(&haystack, CREDIT_PATTERNS) => {
                return FailureKind::QuotaOrCredit;
            }
            Some(429) => return FailureKind::RateLimited,
            _ => {}
        }

        if contains_any(&haystack, AUTH_PATTERNS) {
            return FailureKind::Auth;
        }

        if contains_any(&haystack, RATE_LIMIT_PATTERNS) {
            return FailureKind::RateLimited;
        }

        if err.status == Some(400) {
            return FailureKind::BadRequestOther;
        }

        FailureKind::Unknown
    }

    /// Whether the failure means the requested model is unknown or unavailable
    ///
    /// Only these failures advance an adapter to its next model.
    pub fn is_model_unavailable(err: &ProviderError) -> bool {
        if !matches!(err.status, Some(400) | Some(404)) {
            return false;
        }
        let haystack = err.haystack();
        haystack.contains("model")
            && !contains_any(&haystack, AUTH_PATTERNS)
            && !contains_any(&haystack, CREDIT_PATTERNS)
    }
}

// =============================================================================
// Extraction / Normalization Errors
// =============================================================================

/// Failure to pull a JSON array out of model text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no JSON array found in model output")]
    NoJsonFound,

    #[error("malformed JSON in model output: {message}")]
    MalformedJson { message: String, preview: String },
}

/// Failure to turn parsed JSON into fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("field {index} is not a JSON object")]
    NotObject { index: usize },
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum FormError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

pub type Result<T> = std::result::Result<T, FormError>;

impl FormError {
    /// Whether the failure happened while reading model output
    pub fn is_malformed_output(&self) -> bool {
        matches!(self, Self::Extract(_) | Self::Normalize(_))
    }
}

// =============================================================================
// Tests
// =============================================================================
