//! Form Field Types
//!
//! One question of a generated form and its closed type vocabulary.

use serde::{Deserialize, Serialize};

/// Closed set of field types a form can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    ShortText,
    LongText,
    Number,
    SingleChoice,
    MultipleChoice,
    Dropdown,
}

impl FieldType {
    pub const ALL: [FieldType; 6] = [
        FieldType::ShortText,
        FieldType::LongText,
        FieldType::Number,
        FieldType::SingleChoice,
        FieldType::MultipleChoice,
        FieldType::Dropdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::ShortText => "short-text",
            FieldType::LongText => "long-text",
            FieldType::Number => "number",
            FieldType::SingleChoice => "single-choice",
            FieldType::MultipleChoice => "multiple-choice",
            FieldType::Dropdown => "dropdown",
        }
    }

    /// Whether the type needs a non-empty `options` list
    pub fn requires_options(&self) -> bool {
        matches!(
            self,
            FieldType::SingleChoice | FieldType::MultipleChoice | FieldType::Dropdown
        )
    }

    /// Whether a placeholder is meaningful for this type
    pub fn accepts_placeholder(&self) -> bool {
        !self.requires_options()
    }

    /// Map a model-supplied type tag onto the enumeration
    ///
    /// Accepts canonical names, the legacy HTML-ish tags (`text`, `textarea`,
    /// `radio`, `checkbox`, `select`) and a handful of common synonyms.
    /// Matching ignores case and treats `_`, ` ` and `-` alike.
    pub fn from_tag(tag: &str) -> Option<FieldType> {
        let normalized: String = tag
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect();

        let field_type = match normalized.as_str() {
            "short-text" | "text" | "string" | "short-answer" | "email" | "tel" | "phone"
            | "url" | "date" | "input" => FieldType::ShortText,
            "long-text" | "textarea" | "paragraph" | "long-answer" | "multiline" => {
                FieldType::LongText
            }
            "number" | "numeric" | "integer" | "int" | "float" | "decimal" => FieldType::Number,
            "single-choice" | "radio" | "choice" | "single-select" => FieldType::SingleChoice,
            "multiple-choice" | "checkbox" | "checkboxes" | "multi-select" | "multiselect" => {
                FieldType::MultipleChoice
            }
            "dropdown" | "select" | "combobox" => FieldType::Dropdown,
            _ => return None,
        };
        Some(field_type)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::from_tag(s).ok_or_else(|| {
            format!(
                "Unknown field type: {}. Valid values: short-text, long-text, number, single-choice, multiple-choice, dropdown",
                s
            )
        })
    }
}

/// One question within a generated form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Unique within the form
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Display text, never empty
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Non-empty exactly when `field_type.requires_options()`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

impl Field {
    /// Check the per-field structural invariants
    pub fn is_well_formed(&self) -> bool {
        !self.id.is_empty()
            && !self.label.trim().is_empty()
            && self.field_type.requires_options() == !self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_tags() {
        assert_eq!(FieldType::from_tag("text"), Some(FieldType::ShortText));
        assert_eq!(FieldType::from_tag("textarea"), Some(FieldType::LongText));
        assert_eq!(FieldType::from_tag("number"), Some(FieldType::Number));
        assert_eq!(FieldType::from_tag("radio"), Some(FieldType::SingleChoice));
        assert_eq!(
            FieldType::from_tag("checkbox"),
            Some(FieldType::MultipleChoice)
        );
        assert_eq!(FieldType::from_tag("select"), Some(FieldType::Dropdown));
    }

    #[test]
    fn test_canonical_and_case_insensitive() {
        for field_type in FieldType::ALL {
            assert_eq!(FieldType::from_tag(field_type.as_str()), Some(field_type));
        }
        assert_eq!(FieldType::from_tag("Single_Choice"), Some(FieldType::SingleChoice));
        assert_eq!(FieldType::from_tag(" LONG TEXT "), Some(FieldType::LongText));
        assert_eq!(FieldType::from_tag("signature"), None);
    }

    #[test]
    fn test_requires_options() {
        assert!(FieldType::Dropdown.requires_options());
        assert!(!FieldType::Number.requires_options());
        assert!(FieldType::LongText.accepts_placeholder());
    }

    #[test]
    fn test_field_serialization() {
        let field = Field {
            id: "q1".to_string(),
            field_type: FieldType::SingleChoice,
            label: "How satisfied are you?".to_string(),
            placeholder: None,
            options: vec!["Good".to_string(), "Bad".to_string()],
            required: true,
        };
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "single-choice");
        assert_eq!(value["options"][1], "Bad");
        assert!(value.get("placeholder").is_none());
        assert!(field.is_well_formed());
    }
}
