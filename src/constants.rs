//! Global Constants
//!
//! Centralized constants for generation tuning.
//! All magic numbers should be defined here with documentation.

/// Generation request constants
pub mod generation {
    /// Default number of questions for topic requests
    pub const DEFAULT_QUESTION_COUNT: u32 = 5;

    /// Upper bound on questions a single topic request may ask for
    pub const MAX_QUESTION_COUNT: u32 = 50;

    /// Token ceiling for free-form prompt requests
    pub const PROMPT_MAX_TOKENS: u32 = 1024;

    /// Token ceiling for structured topic requests
    pub const TOPIC_MAX_TOKENS: u32 = 4000;

    /// Sampling temperature (moderately creative)
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Characters of raw model output attached to parse diagnostics
    pub const RAW_PREVIEW_CHARS: usize = 200;
}

/// HTTP/Network constants
pub mod network {
    /// Default per-attempt request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Largest timeout accepted from configuration (seconds)
    pub const MAX_TIMEOUT_SECS: u64 = 300;

    /// Connection establishment timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 10;

    /// Error bodies longer than this are truncated in messages
    pub const MAX_ERROR_BODY_CHARS: usize = 500;
}

/// Provider defaults
pub mod providers {
    /// xAI (OpenAI-compatible) endpoint base
    pub const GROK_API_BASE: &str = "https://api.x.ai/v1";

    /// Anthropic Messages API base
    pub const CLAUDE_API_BASE: &str = "https://api.anthropic.com/v1";

    /// Anthropic API version header value
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";

    /// Google Generative Language API base
    pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Grok models, tried in order
    pub const GROK_MODELS: &[&str] = &["grok-beta", "grok-2-latest"];

    /// Claude models, tried in order
    pub const CLAUDE_MODELS: &[&str] = &[
        "claude-3-5-sonnet-20241022",
        "claude-3-5-sonnet-latest",
        "claude-3-haiku-20240307",
    ];

    /// Gemini models, tried in order
    pub const GEMINI_MODELS: &[&str] = &["gemini-1.5-flash", "gemini-1.5-pro", "gemini-pro"];
}
