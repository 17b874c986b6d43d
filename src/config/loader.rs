//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/formsmith/config.toml)
//! 3. Project config (.formsmith/config.toml)
//! 4. Environment variables (FORMSMITH_* prefix, `__` between keys)
//! 5. Provider credentials from their conventional variables

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::ai::provider::ProviderKind;
use crate::types::{FormError, Result};

const ENV_PREFIX: &str = "FORMSMITH_";

/// Output format for `config show`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Json,
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars → provider key variables
    pub fn load() -> Result<Config> {
        let mut files = Vec::new();
        if let Some(global_path) = Self::global_config_path() {
            files.push(global_path);
        }
        files.push(Self::project_config_path());

        let config = Self::layered(&files, Env::prefixed(ENV_PREFIX))?;
        let config = Self::apply_env_keys(config, |name| env::var(name).ok());

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise the full resolution chain
    ///
    /// An explicit file replaces the global and project files; provider key
    /// variables still fill keys the file leaves unset.
    pub fn load_with(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Self::load_file_with(path, |name| env::var(name).ok()),
            None => Self::load(),
        }
    }

    fn load_file_with<F>(path: &Path, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !path.exists() {
            return Err(FormError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = Self::apply_env_keys(Self::load_from_file(path)?, lookup);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| FormError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Merge defaults, existing files in order, then `env`
    fn layered(files: &[PathBuf], env: Env) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        for path in files.iter().filter(|p| p.exists()) {
            debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        // e.g. FORMSMITH_GENERATION__PRIMARY -> generation.primary
        figment = figment.merge(env.split("__").lowercase(true));

        figment
            .extract()
            .map_err(|e| FormError::Config(format!("Configuration error: {}", e)))
    }

    /// Fill missing provider keys from their conventional variables
    ///
    /// A key already set by a file or `FORMSMITH_*` variable wins. The first
    /// non-empty variable in `ProviderKind::env_vars` order is used.
    pub fn apply_env_keys<F>(mut config: Config, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        for kind in ProviderKind::ALL {
            let settings = config.providers.get_mut(kind);
            if settings.has_api_key() {
                continue;
            }

            let found = kind.env_vars().iter().find_map(|var| {
                lookup(var)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .map(|v| (*var, v))
            });

            if let Some((var, key)) = found {
                debug!("Using {} for {}", var, kind);
                settings.api_key = Some(key);
            }
        }
        config
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/formsmith/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("formsmith"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".formsmith")
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Render the effective configuration (API keys are never included)
    pub fn render(config: &Config, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Json => Ok(serde_json::to_string_pretty(config)?),
            ConfigFormat::Toml => Ok(toml::to_string_pretty(config)?),
        }
    }

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<(PathBuf, bool)> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            FormError::Config("Cannot determine global config directory".to_string())
        })?;
        let path = global_dir.join("config.toml");
        let written = Self::write_default(&path, force)?;
        Ok((path, written))
    }

    /// Initialize project configuration
    pub fn init_project(force: bool) -> Result<(PathBuf, bool)> {
        let path = Self::project_config_path();
        let written = Self::write_default(&path, force)?;
        Ok((path, written))
    }

    /// Write the default config to `path`; returns whether a file was written
    pub fn write_default(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, Self::default_config())?;
        info!("Created config: {}", path.display());
        Ok(true)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Generate default config content (TOML)
    fn default_config() -> String {
        let key_vars = ProviderKind::ALL
            .iter()
            .map(|k| k.primary_env_var())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"# formsmith configuration
# Project settings in .formsmith/config.toml override the global file;
# FORMSMITH_* variables override both (e.g. FORMSMITH_GENERATION__PRIMARY=gemini).
# API keys are read from {key_vars}.

version = "1.0"

[generation]
primary = "claude"
secondary = "gemini"
timeout_secs = 30
temperature = 0.7
prompt_max_tokens = 1024
topic_max_tokens = 4000

[generation.fallback]
enabled = true
kinds = ["quota_or_credit", "bad_request_other", "rate_limited", "unknown"]
on_malformed_response = true

# Per-provider overrides
# [providers.gemini]
# api_base = "https://generativelanguage.googleapis.com/v1beta"
# models = ["gemini-1.5-flash", "gemini-pro"]
"#
        )
    }
}
