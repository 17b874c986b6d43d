//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/formsmith/config.toml)
//! 3. Project config (.formsmith/config.toml)
//! 4. Environment variables (FORMSMITH_*)
//! 5. Provider key variables (ANTHROPIC_API_KEY, GEMINI_API_KEY, ...)
//! 6. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::{ConfigFormat, ConfigLoader};
pub use types::*;
