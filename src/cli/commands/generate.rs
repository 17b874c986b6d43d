//! Generate Command
//!
//! Run one form generation and print the outcome.
//!
//! Usage:
//!   formsmith generate --prompt "customer satisfaction survey"
//!   formsmith generate --topic "job application" --count 3 [--description TEXT]
//!   formsmith generate ... [--provider gemini] [--no-fallback] [--format json]
//!   formsmith --config ./form.toml generate --prompt "..."

use std::path::PathBuf;

use crate::ai::GenerationOrchestrator;
use crate::ai::provider::ProviderKind;
use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::{GenerationOutcome, GenerationRequest, Result};

/// Output format for the outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format '{}'. Valid values: text, json", s)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub prompt: Option<String>,
    pub topic: Option<String>,
    pub description: Option<String>,
    pub count: Option<u32>,
    pub provider: Option<ProviderKind>,
    pub no_fallback: bool,
    pub format: OutputFormat,
    pub config_path: Option<PathBuf>,
}

impl GenerateOptions {
    /// Request for the orchestrator; a topic takes precedence over a prompt
    ///
    /// With neither given the prompt is empty and the orchestrator reports
    /// `InvalidRequest`.
    pub fn to_request(&self) -> GenerationRequest {
        let request = match &self.topic {
            Some(topic) => GenerationRequest::topic(topic, self.description.clone(), self.count),
            None => GenerationRequest::prompt(self.prompt.clone().unwrap_or_default()),
        };

        match self.provider {
            Some(provider) => request.with_provider(provider),
            None => request,
        }
    }
}

/// Returns whether generation succeeded
pub async fn run(options: GenerateOptions) -> Result<bool> {
    let mut config = ConfigLoader::load_with(options.config_path.as_deref())?;
    if options.no_fallback {
        config.generation.fallback.enabled = false;
    }

    let orchestrator = GenerationOrchestrator::from_config(&config)?;
    let outcome = orchestrator.generate(&options.to_request()).await;

    match options.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => print_outcome(&outcome),
    }

    Ok(outcome.is_success())
}

fn print_outcome(outcome: &GenerationOutcome) {
    let output = Output::new();

    match outcome {
        GenerationOutcome::Success {
            fields,
            provider_used,
            model_used,
            was_fallback,
            notes,
            attempts,
        } => {
            output.success(&format!(
                "Generated {} fields with {} ({})",
                fields.len(),
                provider_used,
                model_used
            ));
            if *was_fallback {
                output.warning("Primary provider was unavailable; used the fallback provider");
                output.attempts(attempts);
            }

            output.header("Form");
            for (index, field) in fields.iter().enumerate() {
                output.field(index, field);
            }

            if !notes.is_empty() {
                output.section("Adjustments");
                for note in notes {
                    output.info(note);
                }
            }
        }
        GenerationOutcome::Failure {
            kind,
            message,
            remediation,
            attempts,
        } => {
            output.error(&format!("Generation failed ({}): {}", kind, message));
            if let Some(remediation) = remediation {
                output.info(remediation);
            }
            if !attempts.is_empty() {
                output.section("Attempts");
                output.attempts(attempts);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GenerationIntent;

    #[test]
    fn test_prompt_request() {
        let options = GenerateOptions {
            prompt: Some("customer satisfaction survey".to_string()),
            ..Default::default()
        };
        let request = options.to_request();

        assert_eq!(request, GenerationRequest::prompt("customer satisfaction survey"));
        assert!(request.provider.is_none());
    }

    #[test]
    fn test_topic_request_with_provider() {
        let options = GenerateOptions {
            topic: Some("job application".to_string()),
            description: Some("Backend engineer".to_string()),
            count: Some(3),
            provider: Some(ProviderKind::Gemini),
            ..Default::default()
        };
        let request = options.to_request();

        assert_eq!(request.provider, Some(ProviderKind::Gemini));
        assert_eq!(
            request.intent,
            GenerationIntent::Topic {
                topic: "job application".to_string(),
                description: Some("Backend engineer".to_string()),
                question_count: 3,
            }
        );
    }

    #[test]
    fn test_missing_input_is_invalid() {
        let request = GenerateOptions::default().to_request();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
