use console::style;

use crate::types::{AttemptStatus, Field, ProviderAttempt};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// One numbered field with its options
    pub fn field(&self, index: usize, field: &Field) {
        println!("{}", field_line(index, field));
        if let Some(placeholder) = &field.placeholder {
            println!("     {}", style(format!("placeholder: {}", placeholder)).dim());
        }
        for option in &field.options {
            println!("     - {}", option);
        }
    }

    /// Provider call trace, one line per attempt
    pub fn attempts(&self, attempts: &[ProviderAttempt]) {
        for attempt in attempts {
            let model = attempt.model.as_deref().unwrap_or("-");
            match &attempt.status {
                AttemptStatus::Succeeded => {
                    println!("  {} {} ({})", style("✓").green(), attempt.provider, model)
                }
                AttemptStatus::Failed { kind, message, .. } => println!(
                    "  {} {} ({}): {}: {}",
                    style("✗").red(),
                    attempt.provider,
                    model,
                    kind,
                    message
                ),
            }
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

/// `  1. [single-choice] Label *` where `*` marks required fields
fn field_line(index: usize, field: &Field) -> String {
    format!(
        "{:>3}. [{}] {}{}  {}",
        index + 1,
        field.field_type,
        field.label,
        if field.required { " *" } else { "" },
        style(format!("#{}", field.id)).dim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;

    #[test]
    fn test_field_line() {
        console::set_colors_enabled(false);
        let field = Field {
            id: "rating".to_string(),
            field_type: FieldType::SingleChoice,
            label: "How was it?".to_string(),
            placeholder: None,
            options: vec!["Good".to_string()],
            required: true,
        };

        assert_eq!(field_line(0, &field), "  1. [single-choice] How was it? *  #rating");
    }
}
