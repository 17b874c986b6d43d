//! Generation Orchestrator
//!
//! Top-level policy for one form generation:
//!
//! ```text
//! Validate ─▶ Primary ─ok─▶ Extract ─▶ Normalize ─▶ Success
//!                │ fail                    │ fail
//!                ▼                         ▼
//!            classify ──allowed by policy──▶ Secondary ─ok─▶ Success (fallback)
//!                │ not allowed                  │ fail
//!                ▼                              ▼
//!             Failure                   BothProvidersFailed
//! ```
//!
//! At most one fallback hop and two provider invocations per call. Every
//! internal failure becomes a [`GenerationOutcome`]; nothing escapes as an
//! error.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::ai::prompt::build_prompt;
use crate::ai::provider::{ProviderConfig, ProviderKind, SharedProvider, create_provider};
use crate::ai::timeout::{TimeoutConfig, with_provider_timeout};
use crate::ai::validation::{FieldNormalizer, Normalized, parse_fields};
use crate::config::{Config, GenerationConfig};
use crate::constants::generation::RAW_PREVIEW_CHARS;
use crate::types::{
    AttemptStatus, ErrorClassifier, FailureKind, GenerationOutcome, GenerationRequest,
    OutcomeKind, ProviderAttempt, ProviderError, Result,
};

// =============================================================================
// Fallback Policy
// =============================================================================

/// Which primary failures hand the request to the secondary provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackPolicy {
    /// Master switch; when off the secondary is never used
    pub enabled: bool,
    /// Failure kinds that trigger fallback. `auth` is ignored if listed.
    pub kinds: BTreeSet<FailureKind>,
    /// Fall back when the primary answered but its text held no usable fields
    pub on_malformed_response: bool,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            kinds: BTreeSet::from([
                FailureKind::QuotaOrCredit,
                FailureKind::BadRequestOther,
                FailureKind::RateLimited,
                FailureKind::Unknown,
            ]),
            on_malformed_response: true,
        }
    }
}

impl FallbackPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Whether a classified provider failure may fall back
    ///
    /// Auth failures are specific to the primary's own key and never do.
    pub fn allows(&self, kind: FailureKind) -> bool {
        self.enabled && kind != FailureKind::Auth && self.kinds.contains(&kind)
    }

    /// Whether an unusable primary response may fall back
    pub fn allows_malformed(&self) -> bool {
        self.enabled && self.on_malformed_response
    }
}

// =============================================================================
// Attempt Results
// =============================================================================

struct AttemptSuccess {
    model: String,
    normalized: Normalized,
}

enum AttemptFailure {
    /// Adapter call failed
    Provider {
        error: ProviderError,
        failure: FailureKind,
    },
    /// Adapter succeeded but its text yielded no usable fields
    Malformed {
        model: String,
        reason: String,
        preview: String,
    },
}

impl AttemptFailure {
    fn outcome_kind(&self) -> OutcomeKind {
        match self {
            AttemptFailure::Provider { failure, .. } => OutcomeKind::from_failure(*failure),
            AttemptFailure::Malformed { .. } => OutcomeKind::UpstreamMalformedResponse,
        }
    }

    fn allows_fallback(&self, policy: &FallbackPolicy) -> bool {
        match self {
            AttemptFailure::Provider { failure, .. } => policy.allows(*failure),
            AttemptFailure::Malformed { .. } => policy.allows_malformed(),
        }
    }

    fn describe(&self, provider: ProviderKind) -> String {
        let name = provider.display_name();
        match self {
            AttemptFailure::Provider { error, failure } => match failure {
                FailureKind::Auth => format!("{} rejected the API key: {}", name, error.message),
                FailureKind::QuotaOrCredit => {
                    format!("{} account is out of credit or quota: {}", name, error.message)
                }
                FailureKind::RateLimited => {
                    format!("{} is rate limiting requests: {}", name, error.message)
                }
                FailureKind::BadRequestOther | FailureKind::Unknown => {
                    format!("{} request failed: {}", name, error.message)
                }
            },
            AttemptFailure::Malformed {
                reason, preview, ..
            } => format!(
                "{} returned a response without a usable field list ({}). Response began: {}",
                name, reason, preview
            ),
        }
    }

    fn record(&self, provider: ProviderKind) -> ProviderAttempt {
        let (model, failure) = match self {
            AttemptFailure::Provider { error, failure } => (error.model.clone(), Some(*failure)),
            AttemptFailure::Malformed { model, .. } => (Some(model.clone()), None),
        };
        ProviderAttempt::failed(
            provider.name(),
            model,
            self.outcome_kind(),
            failure,
            self.describe(provider),
        )
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Selects providers, applies the fallback policy and assembles outcomes
///
/// Holds only read-only configuration; one instance serves any number of
/// concurrent `generate` calls.
pub struct GenerationOrchestrator {
    /// Providers with a credential; absent kinds are treated as unconfigured
    providers: HashMap<ProviderKind, SharedProvider>,
    primary: ProviderKind,
    secondary: Option<ProviderKind>,
    policy: FallbackPolicy,
    timeouts: TimeoutConfig,
    prompt_max_tokens: u32,
    topic_max_tokens: u32,
}

impl std::fmt::Debug for GenerationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ready: Vec<_> = self.providers.keys().map(|k| k.name()).collect();
        ready.sort_unstable();
        f.debug_struct("GenerationOrchestrator")
            .field("ready", &ready)
            .field("primary", &self.primary)
            .field("secondary", &self.secondary)
            .field("policy", &self.policy)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl GenerationOrchestrator {
    /// Orchestrator with no providers registered yet
    pub fn new(generation: &GenerationConfig) -> Self {
        Self {
            providers: HashMap::new(),
            primary: generation.primary,
            secondary: generation.secondary,
            policy: generation.fallback.clone(),
            timeouts: TimeoutConfig::from_secs(generation.timeout_secs),
            prompt_max_tokens: generation.prompt_max_tokens,
            topic_max_tokens: generation.topic_max_tokens,
        }
    }

    /// Register the adapter serving `kind`
    pub fn with_provider(mut self, kind: ProviderKind, provider: SharedProvider) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    /// Build adapters for every provider that has a credential
    pub fn from_config(config: &Config) -> Result<Self> {
        let generation = &config.generation;
        let mut orchestrator = Self::new(generation);

        for kind in ProviderKind::ALL {
            let settings = config.providers.get(kind);
            let Some(api_key) = settings
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
            else {
                debug!("No credential for {}, provider unavailable", kind);
                continue;
            };

            let mut provider_config = ProviderConfig::new(kind, api_key)
                .with_models(settings.models.clone())
                .with_temperature(generation.temperature)
                .with_timeout_secs(generation.timeout_secs);
            if let Some(api_base) = &settings.api_base {
                provider_config = provider_config.with_api_base(api_base.as_str());
            }

            orchestrator = orchestrator.with_provider(kind, create_provider(provider_config)?);
        }

        Ok(orchestrator)
    }

    /// Whether `kind` has a credential and an adapter
    pub fn is_ready(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Generate form fields for one request
    #[instrument(
        name = "generate",
        skip_all,
        fields(generation_id = %Uuid::new_v4(), requested_provider = ?request.provider)
    )]
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        if let Err(message) = request.validate() {
            warn!("Rejected generation request: {}", message);
            return GenerationOutcome::Failure {
                kind: OutcomeKind::InvalidRequest,
                message,
                remediation: None,
                attempts: Vec::new(),
            };
        }

        let prompt = build_prompt(request);
        let max_tokens = if request.is_topic() {
            self.topic_max_tokens
        } else {
            self.prompt_max_tokens
        };
        let normalizer = FieldNormalizer::new();
        let (primary, secondary) = self.route(request.provider);
        let mut attempts = Vec::with_capacity(2);

        info!(
            "Generating form fields (primary: {}, secondary: {})",
            primary,
            secondary.map(|s| s.name()).unwrap_or("none")
        );

        let Some(provider) = self.providers.get(&primary) else {
            attempts.push(ProviderAttempt::failed(
                primary.name(),
                None,
                OutcomeKind::MissingCredential,
                None,
                missing_credential_message(primary),
            ));

            // A provider the caller named explicitly is never substituted
            if request.provider.is_none()
                && let Some(secondary) = secondary
            {
                warn!(
                    "No credential for primary {}, using secondary {}",
                    primary, secondary
                );
                return self
                    .secondary_attempt(secondary, &prompt, max_tokens, &normalizer, attempts)
                    .await;
            }

            warn!("No credential for {}", primary);
            return GenerationOutcome::Failure {
                kind: OutcomeKind::MissingCredential,
                message: missing_credential_message(primary),
                remediation: remediation(OutcomeKind::MissingCredential, primary),
                attempts,
            };
        };

        let failure = match self
            .attempt(primary, provider, &prompt, max_tokens, &normalizer)
            .await
        {
            Ok(success) => return success_outcome(primary, success, false, attempts),
            Err(failure) => failure,
        };
        attempts.push(failure.record(primary));

        match secondary {
            Some(secondary) if failure.allows_fallback(&self.policy) => {
                warn!(
                    "Primary {} failed ({}), falling back to {}",
                    primary,
                    failure.outcome_kind(),
                    secondary
                );
                self.secondary_attempt(secondary, &prompt, max_tokens, &normalizer, attempts)
                    .await
            }
            _ => {
                let kind = failure.outcome_kind();
                warn!("Generation failed without fallback: {}", kind);
                GenerationOutcome::Failure {
                    kind,
                    message: failure.describe(primary),
                    remediation: remediation(kind, primary),
                    attempts,
                }
            }
        }
    }

    /// Primary and usable secondary for a call
    ///
    /// A named provider becomes primary; the configured primary, if
    /// different, becomes its secondary, otherwise the configured secondary.
    fn route(&self, requested: Option<ProviderKind>) -> (ProviderKind, Option<ProviderKind>) {
        let (primary, secondary) = match requested {
            Some(kind) if kind != self.primary => (kind, Some(self.primary)),
            Some(kind) => (kind, self.secondary),
            None => (self.primary, self.secondary),
        };

        let secondary = secondary
            .filter(|s| *s != primary && self.policy.enabled)
            .filter(|s| {
                let ready = self.is_ready(*s);
                if !ready {
                    warn!("Secondary provider {} has no credential, fallback unavailable", s);
                }
                ready
            });

        (primary, secondary)
    }

    async fn secondary_attempt(
        &self,
        secondary: ProviderKind,
        prompt: &str,
        max_tokens: u32,
        normalizer: &FieldNormalizer,
        mut attempts: Vec<ProviderAttempt>,
    ) -> GenerationOutcome {
        let Some(provider) = self.providers.get(&secondary) else {
            return GenerationOutcome::Failure {
                kind: OutcomeKind::MissingCredential,
                message: missing_credential_message(secondary),
                remediation: remediation(OutcomeKind::MissingCredential, secondary),
                attempts,
            };
        };

        match self
            .attempt(secondary, provider, prompt, max_tokens, normalizer)
            .await
        {
            Ok(success) => success_outcome(secondary, success, true, attempts),
            Err(failure) => {
                attempts.push(failure.record(secondary));
                let details = attempts
                    .iter()
                    .filter_map(|a| match &a.status {
                        AttemptStatus::Failed { message, .. } => Some(message.as_str()),
                        AttemptStatus::Succeeded => None,
                    })
                    .collect::<Vec<_>>()
                    .join(" / ");
                warn!("Both providers failed");
                GenerationOutcome::Failure {
                    kind: OutcomeKind::BothProvidersFailed,
                    message: format!("Both providers failed. {}", details),
                    remediation: remediation(OutcomeKind::BothProvidersFailed, secondary),
                    attempts,
                }
            }
        }
    }

    /// One bounded adapter invocation plus extraction and normalisation
    async fn attempt(
        &self,
        kind: ProviderKind,
        provider: &SharedProvider,
        prompt: &str,
        max_tokens: u32,
        normalizer: &FieldNormalizer,
    ) -> std::result::Result<AttemptSuccess, AttemptFailure> {
        let completion = with_provider_timeout(
            kind.name(),
            self.timeouts.provider_attempt,
            provider.generate(prompt, max_tokens),
        )
        .await
        .map_err(|error| {
            let failure = ErrorClassifier::classify(&error);
            warn!("{} failed ({}): {}", kind, failure, error);
            AttemptFailure::Provider { error, failure }
        })?;

        debug!(
            "{} ({}) returned {} chars",
            kind,
            completion.model,
            completion.text.len()
        );

        let malformed = |reason: String| {
            warn!("{} response unusable: {}", kind, reason);
            AttemptFailure::Malformed {
                model: completion.model.clone(),
                reason,
                preview: completion.text.chars().take(RAW_PREVIEW_CHARS).collect(),
            }
        };

        let normalized = parse_fields(&completion.text, normalizer)
            .map_err(|e| malformed(e.to_string()))?;
        if normalized.fields.is_empty() {
            return Err(malformed("empty field list".to_string()));
        }

        Ok(AttemptSuccess {
            model: completion.model,
            normalized,
        })
    }
}

fn success_outcome(
    provider: ProviderKind,
    success: AttemptSuccess,
    was_fallback: bool,
    mut attempts: Vec<ProviderAttempt>,
) -> GenerationOutcome {
    info!(
        "Generated {} fields with {} ({}){}",
        success.normalized.fields.len(),
        provider,
        success.model,
        if was_fallback { " after fallback" } else { "" }
    );
    attempts.push(ProviderAttempt::succeeded(provider.name(), success.model.as_str()));

    GenerationOutcome::Success {
        fields: success.normalized.fields,
        provider_used: provider.name().to_string(),
        model_used: success.model,
        was_fallback,
        notes: success.normalized.notes,
        attempts,
    }
}

fn missing_credential_message(provider: ProviderKind) -> String {
    format!("No API key configured for {}", provider.display_name())
}

/// Guidance shown with a failure
fn remediation(kind: OutcomeKind, provider: ProviderKind) -> Option<String> {
    let text = match kind {
        OutcomeKind::MissingCredential => format!(
            "Set {} or providers.{}.api_key in the config file",
            provider.primary_env_var(),
            provider.name()
        ),
        OutcomeKind::AuthFailed => format!(
            "Check the API key in {} for {}",
            provider.primary_env_var(),
            provider.display_name()
        ),
        OutcomeKind::QuotaExceeded => format!(
            "Add credits to the {} account, or configure a secondary provider",
            provider.display_name()
        ),
        OutcomeKind::RateLimited => "Wait a moment and try again".to_string(),
        OutcomeKind::UpstreamMalformedResponse => {
            "Try again, or rephrase the request more specifically".to_string()
        }
        OutcomeKind::UpstreamFailed => "Try again later".to_string(),
        OutcomeKind::BothProvidersFailed => {
            "Create the form manually, or try again later".to_string()
        }
        OutcomeKind::InvalidRequest => return None,
    };
    Some(text)
}
