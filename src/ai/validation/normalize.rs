//! Field Normalization
//!
//! Turns loosely-shaped model JSON into [`Field`]s that satisfy every form
//! invariant. Individual defects are coerced and noted, never fatal; only a
//! non-array or a non-object element rejects the batch.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::types::{Field, FieldType, NormalizeError, json_bool, json_string_lenient};

/// Options substituted when a choice field arrives without any
const PLACEHOLDER_OPTIONS: [&str; 2] = ["Option 1", "Option 2"];

/// Keys models use for the display text, in preference order
const LABEL_KEYS: &[&str] = &["label", "question", "title", "text"];

/// Normalised fields plus a note for every coercion applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub fields: Vec<Field>,
    pub notes: Vec<String>,
}

/// Field normaliser for one generation call
///
/// Synthesised ids share the timestamp captured at construction, so ids are
/// unique within the call and stable for its duration.
#[derive(Debug, Clone)]
pub struct FieldNormalizer {
    timestamp_millis: i64,
}

impl Default for FieldNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldNormalizer {
    pub fn new() -> Self {
        Self {
            timestamp_millis: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Fixed timestamp for deterministic ids
    pub fn with_timestamp(timestamp_millis: i64) -> Self {
        Self { timestamp_millis }
    }

    /// Normalise a parsed field list
    pub fn normalize(&self, raw: &[Value]) -> Result<Normalized, NormalizeError> {
        if let Some(index) = raw.iter().position(|v| !v.is_object()) {
            return Err(NormalizeError::NotObject { index });
        }

        let mut out = Normalized::default();
        let mut seen_ids = HashSet::with_capacity(raw.len());

        for (index, element) in raw.iter().enumerate() {
            let field = self.normalize_one(index, element, &mut seen_ids, &mut out.notes);
            out.fields.push(field);
        }

        if !out.notes.is_empty() {
            debug!(
                "Normalised {} fields with {} coercions",
                out.fields.len(),
                out.notes.len()
            );
        }

        Ok(out)
    }

    fn normalize_one(
        &self,
        index: usize,
        element: &Value,
        seen_ids: &mut HashSet<String>,
        notes: &mut Vec<String>,
    ) -> Field {
        let position = index + 1;

        let id = match json_string_lenient(element, "id") {
            Some(id) => id,
            None => {
                let id = format!("ai-generated-{}-{}", self.timestamp_millis, index);
                notes.push(format!("field {}: missing id, assigned '{}'", position, id));
                id
            }
        };
        let id = unique_id(id, seen_ids, position, notes);

        let field_type = match json_string_lenient(element, "type") {
            Some(tag) => FieldType::from_tag(&tag).unwrap_or_else(|| {
                notes.push(format!(
                    "field {}: unknown type '{}', defaulted to short-text",
                    position, tag
                ));
                FieldType::ShortText
            }),
            None => {
                notes.push(format!(
                    "field {}: missing type, defaulted to short-text",
                    position
                ));
                FieldType::ShortText
            }
        };

        let label = LABEL_KEYS
            .iter()
            .find_map(|key| json_string_lenient(element, key))
            .unwrap_or_else(|| {
                notes.push(format!(
                    "field {}: missing label, used 'Question {}'",
                    position, position
                ));
                format!("Question {}", position)
            });

        let placeholder = if field_type.accepts_placeholder() {
            json_string_lenient(element, "placeholder")
        } else {
            None
        };

        let options = if field_type.requires_options() {
            let options = coerce_options(element.get("options"));
            if options.is_empty() {
                notes.push(format!(
                    "field {}: {} without options, added placeholder options",
                    position, field_type
                ));
                PLACEHOLDER_OPTIONS.iter().map(|s| s.to_string()).collect()
            } else {
                options
            }
        } else {
            Vec::new()
        };

        Field {
            id,
            field_type,
            label,
            placeholder,
            options,
            required: json_bool(element, "required", false),
        }
    }
}

/// Normalise with a normaliser stamped at the current time
pub fn normalize(raw: &[Value]) -> Result<Normalized, NormalizeError> {
    FieldNormalizer::new().normalize(raw)
}

/// Suffix `-2`, `-3`, ... until the id is unused in this call
fn unique_id(
    id: String,
    seen_ids: &mut HashSet<String>,
    position: usize,
    notes: &mut Vec<String>,
) -> String {
    if seen_ids.insert(id.clone()) {
        return id;
    }

    let mut suffix = 2;
    loop {
        let candidate = format!("{}-{}", id, suffix);
        if seen_ids.insert(candidate.clone()) {
            notes.push(format!(
                "field {}: duplicate id '{}', renamed to '{}'",
                position, id, candidate
            ));
            return candidate;
        }
        suffix += 1;
    }
}

/// Coerce an `options` value into non-empty strings
///
/// Accepts arrays of scalars or `{label|value}` objects, and
/// comma-separated strings.
fn coerce_options(value: Option<&Value>) -> Vec<String> {
    let items: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(option_text).collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };

    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn option_text(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(_) => ["label", "value", "text"]
            .iter()
            .find_map(|key| json_string_lenient(item, key)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn normalizer() -> FieldNormalizer {
        FieldNormalizer::with_timestamp(1_700_000_000_000)
    }

    #[test]
    fn test_well_formed_field_passes_through() {
        let raw = vec![json!({
            "id": "satisfaction",
            "type": "single-choice",
            "label": "How satisfied are you?",
            "options": ["Very", "Somewhat", "Not at all"],
            "required": true
        })];
        let out = normalizer().normalize(&raw).unwrap();

        assert!(out.notes.is_empty());
        assert_eq!(
            out.fields,
            vec![Field {
                id: "satisfaction".to_string(),
                field_type: FieldType::SingleChoice,
                label: "How satisfied are you?".to_string(),
                placeholder: None,
                options: vec![
                    "Very".to_string(),
                    "Somewhat".to_string(),
                    "Not at all".to_string()
                ],
                required: true,
            }]
        );
    }

    #[test]
    fn test_legacy_tags_and_placeholder() {
        let raw = vec![
            json!({"id": "name", "type": "text", "label": "Name", "placeholder": "Jane Doe"}),
            json!({"id": "bio", "type": "textarea", "label": "Bio"}),
            json!({"id": "color", "type": "select", "label": "Color", "options": ["Red"], "placeholder": "pick"}),
        ];
        let out = normalizer().normalize(&raw).unwrap();

        assert_eq!(out.fields[0].field_type, FieldType::ShortText);
        assert_eq!(out.fields[0].placeholder.as_deref(), Some("Jane Doe"));
        assert_eq!(out.fields[1].field_type, FieldType::LongText);
        assert_eq!(out.fields[2].field_type, FieldType::Dropdown);
        assert_eq!(out.fields[2].placeholder, None);
    }

    #[test]
    fn test_missing_id_synthesised() {
        let raw = vec![json!({"type": "text", "label": "A"}), json!({"id": "", "label": "B"})];
        let out = normalizer().normalize(&raw).unwrap();

        assert_eq!(out.fields[0].id, "ai-generated-1700000000000-0");
        assert_eq!(out.fields[1].id, "ai-generated-1700000000000-1");
        assert!(out.notes.iter().any(|n| n.contains("missing id")));
    }

    #[test]
    fn test_duplicate_ids_suffixed() {
        let raw = vec![
            json!({"id": "q", "label": "A"}),
            json!({"id": "q", "label": "B"}),
            json!({"id": "q-2", "label": "C"}),
        ];
        let out = normalizer().normalize(&raw).unwrap();
        let ids: Vec<&str> = out.fields.iter().map(|f| f.id.as_str()).collect();

        assert_eq!(ids, vec!["q", "q-2", "q-2-2"]);
    }

    #[test]
    fn test_unknown_type_defaults_with_note() {
        let raw = vec![json!({"id": "sig", "type": "signature", "label": "Sign here"})];
        let out = normalizer().normalize(&raw).unwrap();

        assert_eq!(out.fields[0].field_type, FieldType::ShortText);
        assert_eq!(
            out.notes,
            vec!["field 1: unknown type 'signature', defaulted to short-text".to_string()]
        );
    }

    #[test]
    fn test_choice_without_options_gets_placeholders() {
        let raw = vec![json!({"id": "c", "type": "checkbox", "label": "Pick", "options": []})];
        let out = normalizer().normalize(&raw).unwrap();

        assert_eq!(out.fields[0].options, vec!["Option 1", "Option 2"]);
        assert_eq!(out.notes.len(), 1);
    }

    #[test]
    fn test_options_coerced() {
        let raw = vec![
            json!({"id": "a", "type": "radio", "label": "A", "options": [1, " two ", "", {"label": "Three"}, null]}),
            json!({"id": "b", "type": "dropdown", "label": "B", "options": "Small, Medium,Large"}),
            json!({"id": "c", "type": "number", "label": "C", "options": ["ignored"]}),
        ];
        let out = normalizer().normalize(&raw).unwrap();

        assert_eq!(out.fields[0].options, vec!["1", "two", "Three"]);
        assert_eq!(out.fields[1].options, vec!["Small", "Medium", "Large"]);
        assert!(out.fields[2].options.is_empty());
    }

    #[test]
    fn test_required_coercion() {
        let raw = vec![
            json!({"id": "a", "label": "A", "required": "true"}),
            json!({"id": "b", "label": "B", "required": 1}),
            json!({"id": "c", "label": "C", "required": true}),
        ];
        let out = normalizer().normalize(&raw).unwrap();
        let required: Vec<bool> = out.fields.iter().map(|f| f.required).collect();

        assert_eq!(required, vec![false, false, true]);
    }

    #[test]
    fn test_blank_label_replaced() {
        let raw = vec![
            json!({"id": "a", "label": "Real"}),
            json!({"id": "b", "label": "   "}),
            json!({"id": "c", "question": "From question key"}),
        ];
        let out = normalizer().normalize(&raw).unwrap();

        assert_eq!(out.fields[1].label, "Question 2");
        assert_eq!(out.fields[2].label, "From question key");
    }

    #[test]
    fn test_rejects_non_objects() {
        let raw = vec![json!({"id": "a"}), json!("just a string")];
        assert_eq!(
            normalizer().normalize(&raw),
            Err(NormalizeError::NotObject { index: 1 })
        );
    }

    #[test]
    fn test_empty_list() {
        let out = normalizer().normalize(&[]).unwrap();
        assert!(out.fields.is_empty());
        assert!(out.notes.is_empty());
    }

    fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[ a-zA-Z0-9_-]{0,12}".prop_map(Value::String),
            prop::sample::select(vec![
                "text", "textarea", "radio", "checkbox", "select", "number", "dropdown",
                "single_choice", "mystery",
            ])
            .prop_map(|s| Value::String(s.to_string())),
        ]
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        arb_scalar().prop_recursive(2, 12, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..3)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn arb_element() -> impl Strategy<Value = Value> {
        (
            prop::option::of(arb_scalar()),
            prop::option::of(arb_scalar()),
            prop::option::of(arb_scalar()),
            prop::option::of(arb_value()),
            prop::option::of(arb_scalar()),
        )
            .prop_map(|(id, ty, label, options, required)| {
                let mut obj = serde_json::Map::new();
                let pairs = [
                    ("id", id),
                    ("type", ty),
                    ("label", label),
                    ("options", options),
                    ("required", required),
                ];
                for (key, value) in pairs {
                    if let Some(value) = value {
                        obj.insert(key.to_string(), value);
                    }
                }
                Value::Object(obj)
            })
    }

    proptest! {
        #[test]
        fn prop_output_satisfies_invariants(raw in prop::collection::vec(arb_element(), 0..12)) {
            let out = normalizer().normalize(&raw).unwrap();
            prop_assert_eq!(out.fields.len(), raw.len());

            let mut ids = HashSet::new();
            for field in &out.fields {
                prop_assert!(ids.insert(field.id.clone()), "duplicate id {}", field.id);
                prop_assert!(FieldType::ALL.contains(&field.field_type));
                prop_assert!(field.is_well_formed(), "ill-formed {:?}", field);
                prop_assert!(field.options.iter().all(|o| !o.trim().is_empty()));
            }
        }
    }
}
