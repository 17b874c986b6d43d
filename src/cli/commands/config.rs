//! Config Command
//!
//! Manage formsmith configuration.
//!
//! Usage:
//!   formsmith config show [-f json] [--config PATH]
//!   formsmith config path
//!   formsmith config init [-g] [--force]

use console::style;
use std::path::Path;

use crate::ai::provider::ProviderKind;
use crate::cli::ui::Output;
use crate::config::{ConfigFormat, ConfigLoader};
use crate::types::Result;

/// Parse `config show` format
pub fn parse_format(s: &str) -> std::result::Result<ConfigFormat, String> {
    match s.to_lowercase().as_str() {
        "toml" | "text" => Ok(ConfigFormat::Toml),
        "json" => Ok(ConfigFormat::Json),
        _ => Err(format!("Invalid format '{}'. Valid values: toml, json", s)),
    }
}

/// Show merged effective configuration and credential status
pub fn show(format: ConfigFormat, config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load_with(config_path)?;
    println!("{}", ConfigLoader::render(&config, format)?);

    if format == ConfigFormat::Toml {
        let output = Output::new();
        output.section("Credentials");
        for kind in ProviderKind::ALL {
            if config.providers.get(kind).has_api_key() {
                output.success(&format!("{}: configured", kind));
            } else {
                output.warning(&format!("{}: not set ({})", kind, kind.primary_env_var()));
            }
        }
    }
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    println!("Configuration paths:");
    println!();

    if let Some(global) = ConfigLoader::global_config_path() {
        println!("  Global:  {} {}", marker(global.exists()), global.display());
    } else {
        println!("  Global:  (not available)");
    }

    let project = ConfigLoader::project_config_path();
    println!("  Project: {} {}", marker(project.exists()), project.display());
    Ok(())
}

/// Initialize global or project configuration
pub fn init(global: bool, force: bool) -> Result<()> {
    let (path, written) = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };

    let output = Output::new();
    if written {
        output.success(&format!(
            "Initialized {} configuration",
            if global { "global" } else { "project" }
        ));
        println!("  Config: {}", path.display());
    } else {
        output.warning(&format!(
            "Config already exists: {} (use --force to overwrite)",
            path.display()
        ));
    }
    Ok(())
}

fn marker(exists: bool) -> String {
    if exists {
        style("✓").green().to_string()
    } else {
        style("✗").red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format("json"), Ok(ConfigFormat::Json));
        assert_eq!(parse_format("TOML"), Ok(ConfigFormat::Toml));
        assert!(parse_format("yaml").is_err());
    }
}
