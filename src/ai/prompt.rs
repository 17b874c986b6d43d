//! Prompt Builder
//!
//! Standardized prompt construction for form generation.
//!
//! ## Structure
//!
//! 1. **Role Definition**: what the model is acting as
//! 2. **Request Sections**: the caller's prompt or topic
//! 3. **Structured Objectives**: numbered rules
//! 4. **Output Schema**: field shape with an example

use crate::types::{FieldType, GenerationIntent, GenerationRequest};

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Code block with language
    Code { language: String, content: String },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add objectives section
    pub fn objectives(mut self, objectives: Vec<String>) -> Self {
        self.sections.push(PromptSection::Objectives(objectives));
        self
    }

    /// Add text section
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Add code block
    pub fn code(mut self, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Code {
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Code { language, content } => {
                    prompt.push_str(&format!("```{}\n", language));
                    prompt.push_str(&content);
                    prompt.push_str("\n```\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

const FIELD_EXAMPLE: &str = r#"[
  {
    "id": "full_name",
    "type": "short-text",
    "label": "What is your full name?",
    "placeholder": "Jane Doe",
    "required": true
  },
  {
    "id": "experience_level",
    "type": "single-choice",
    "label": "How would you rate your experience?",
    "options": ["Beginner", "Intermediate", "Expert"],
    "required": false
  }
]"#;

/// Build the model prompt for a generation request
pub fn build_prompt(request: &GenerationRequest) -> String {
    let type_list = FieldType::ALL
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut builder = PromptBuilder::new().role("form designer", "building clear, well-structured web forms");

    let mut objectives = match &request.intent {
        GenerationIntent::Prompt { prompt } => {
            builder = builder.section("Form Request", prompt.trim());
            vec!["Design the fields a form for this request needs, in a sensible order".to_string()]
        }
        GenerationIntent::Topic {
            topic,
            description,
            question_count,
        } => {
            builder = builder.section("Topic", topic.trim());
            if let Some(description) = description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
                builder = builder.section("Description", description);
            }
            vec![format!(
                "Create exactly {} questions covering the topic",
                question_count
            )]
        }
    };

    objectives.extend([
        format!("Use only these field types: {}", type_list),
        "Give single-choice, multiple-choice and dropdown fields a non-empty \"options\" array of strings"
            .to_string(),
        "Give every field a unique snake_case \"id\" and a clear \"label\"".to_string(),
        "Set \"required\" to true or false".to_string(),
    ]);

    builder
        .objectives(objectives)
        .section("Output Format", "A JSON array of field objects, for example:")
        .code("json", FIELD_EXAMPLE)
        .text("Respond with ONLY the JSON array. No explanation, no markdown, no surrounding text.")
        .build()
}
