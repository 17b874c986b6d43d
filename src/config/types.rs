//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/formsmith/) and project (.formsmith/) level configuration.

use serde::{Deserialize, Serialize};

use crate::ai::orchestrator::FallbackPolicy;
use crate::ai::provider::ProviderKind;
use crate::constants::{generation as gen_constants, network as net_constants};
use crate::types::{FailureKind, FormError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Provider selection and generation parameters
    pub generation: GenerationConfig,

    /// Per-provider credentials, endpoints and models
    pub providers: ProvidersConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            generation: GenerationConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `FormError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        let generation = &self.generation;

        if !(0.0..=2.0).contains(&generation.temperature) {
            return Err(FormError::Config(format!(
                "generation.temperature must be between 0.0 and 2.0, got {}",
                generation.temperature
            )));
        }

        if !(1..=net_constants::MAX_TIMEOUT_SECS).contains(&generation.timeout_secs) {
            return Err(FormError::Config(format!(
                "generation.timeout_secs must be between 1 and {}, got {}",
                net_constants::MAX_TIMEOUT_SECS,
                generation.timeout_secs
            )));
        }

        if generation.prompt_max_tokens == 0 || generation.topic_max_tokens == 0 {
            return Err(FormError::Config(
                "generation token limits must be greater than 0".to_string(),
            ));
        }

        if generation.secondary == Some(generation.primary) {
            return Err(FormError::Config(format!(
                "generation.secondary must differ from primary ({})",
                generation.primary
            )));
        }

        if generation.fallback.kinds.contains(&FailureKind::Auth) {
            return Err(FormError::Config(
                "generation.fallback.kinds cannot include auth; a rejected key never falls back"
                    .to_string(),
            ));
        }

        for kind in ProviderKind::ALL {
            if self.providers.get(kind).models.is_empty() {
                return Err(FormError::Config(format!(
                    "providers.{}.models must list at least one model",
                    kind
                )));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Provider tried first
    pub primary: ProviderKind,

    /// Provider tried after an eligible primary failure
    pub secondary: Option<ProviderKind>,

    /// Bound on one provider attempt, model cycling included
    pub timeout_secs: u64,

    /// Sampling temperature sent to every provider
    pub temperature: f32,

    /// Token ceiling for free-form prompt requests
    pub prompt_max_tokens: u32,

    /// Token ceiling for topic requests
    pub topic_max_tokens: u32,

    /// Which primary failures hand over to the secondary
    pub fallback: FallbackPolicy,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            primary: ProviderKind::Claude,
            secondary: Some(ProviderKind::Gemini),
            timeout_secs: net_constants::DEFAULT_TIMEOUT_SECS,
            temperature: gen_constants::DEFAULT_TEMPERATURE,
            prompt_max_tokens: gen_constants::PROMPT_MAX_TOKENS,
            topic_max_tokens: gen_constants::TOPIC_MAX_TOKENS,
            fallback: FallbackPolicy::default(),
        }
    }
}

// =============================================================================
// Provider Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub grok: ProviderSettings,
    pub claude: ProviderSettings,
    pub gemini: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            grok: ProviderSettings::for_kind(ProviderKind::Grok),
            claude: ProviderSettings::for_kind(ProviderKind::Claude),
            gemini: ProviderSettings::for_kind(ProviderKind::Gemini),
        }
    }
}

impl ProvidersConfig {
    pub fn get(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::Grok => &self.grok,
            ProviderKind::Claude => &self.claude,
            ProviderKind::Gemini => &self.gemini,
        }
    }

    pub fn get_mut(&mut self, kind: ProviderKind) -> &mut ProviderSettings {
        match kind {
            ProviderKind::Grok => &mut self.grok,
            ProviderKind::Claude => &mut self.claude,
            ProviderKind::Gemini => &mut self.gemini,
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// API key; usually filled from the provider's environment variable
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Endpoint base override (proxies, regional endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Models tried in order until one is available
    pub models: Vec<String>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("models", &self.models)
            .finish()
    }
}

impl ProviderSettings {
    pub fn for_kind(kind: ProviderKind) -> Self {
        Self {
            api_key: None,
            api_base: None,
            models: kind.default_models(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.generation.primary, ProviderKind::Claude);
        assert_eq!(config.generation.secondary, Some(ProviderKind::Gemini));
        assert_eq!(config.generation.prompt_max_tokens, 1024);
        assert_eq!(config.generation.topic_max_tokens, 4000);
        assert!(!config.providers.get(ProviderKind::Grok).models.is_empty());
    }

    #[test]
    fn test_validate_ranges() {
        let mut config = Config::default();
        config.generation.temperature = 2.5;
        assert!(matches!(config.validate(), Err(FormError::Config(_))));

        let mut config = Config::default();
        config.generation.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.generation.timeout_secs = net_constants::MAX_TIMEOUT_SECS + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.generation.topic_max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_provider_choice() {
        let mut config = Config::default();
        config.generation.secondary = Some(ProviderKind::Claude);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must differ from primary"));

        let mut config = Config::default();
        config.generation.fallback.kinds.insert(FailureKind::Auth);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.providers.get_mut(ProviderKind::Gemini).models.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("providers.gemini.models"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = Config::default();
        config.providers.claude.api_key = Some("sk-ant-secret".to_string());

        let toml = toml::to_string(&config).unwrap();
        assert!(!toml.contains("sk-ant-secret"));
        assert!(!format!("{:?}", config).contains("sk-ant-secret"));
        assert!(config.providers.claude.has_api_key());
    }
}
