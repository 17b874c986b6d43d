//! Response Extraction
//!
//! Isolates the JSON field array inside free-text model output.
//!
//! Handles the usual model habits:
//! - Markdown code fence wrapping (```json ... ```)
//! - Explanatory prose before and after the array
//! - Arrays nested inside a wrapper object (`{"fields": [...]}`)
//! - Trailing commas before `]` or `}`

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::generation::RAW_PREVIEW_CHARS;
use crate::types::ExtractError;

/// Parsed, not yet normalised, field candidates
pub type RawFieldList = Vec<Value>;

/// Opening of an array whose first element is an object
static ARRAY_OF_OBJECTS_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*\{").expect("valid regex"));

/// Extract the field array from raw model text
///
/// Never panics. Fails with `MalformedJson` when an array of objects was
/// found but none parses, and with `NoJsonFound` otherwise. Bracketed prose
/// such as `[see policy]` is not an array.
pub fn extract_json(raw: &str) -> Result<RawFieldList, ExtractError> {
    let cleaned = preprocess(raw);

    // Fast path: the whole text is already a clean array
    if cleaned.starts_with('[')
        && let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&cleaned)
    {
        return Ok(items);
    }

    // Arrays of objects embedded in prose or a wrapper; the first that parses
    // wins, and a failed candidate hides any array nested inside it
    let mut object_array_error = None;
    let mut covered_until = 0;
    for start in ARRAY_OF_OBJECTS_START.find_iter(&cleaned).map(|m| m.start()) {
        if start < covered_until {
            continue;
        }
        let Some(end) = matching_bracket(&cleaned, start) else {
            debug!("Array opened at byte {} never closes", start);
            object_array_error.get_or_insert_with(|| malformed("unterminated JSON array", raw));
            break;
        };
        match parse_candidate(&cleaned[start..end], raw) {
            Ok(items) => return Ok(items),
            Err(e) => {
                debug!("Candidate at byte {} rejected: {}", start, e);
                object_array_error.get_or_insert(e);
                covered_until = end;
            }
        }
    }

    // Whole text as JSON (e.g. `{"fields": []}` has no object-array marker)
    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        if let Value::Array(items) = value {
            return Ok(items);
        }
        if let Some(items) = first_array_member(&value) {
            return Ok(items);
        }
    }

    // Any other balanced array that parses; bracketed prose is skipped
    let mut covered_until = 0;
    for (start, _) in cleaned.match_indices('[') {
        if start < covered_until {
            continue;
        }
        if let Some(end) = matching_bracket(&cleaned, start) {
            match parse_candidate(&cleaned[start..end], raw) {
                Ok(items) => return Ok(items),
                Err(_) => covered_until = end,
            }
        }
    }

    // Only an array of objects that failed to parse counts as malformed
    Err(object_array_error.unwrap_or(ExtractError::NoJsonFound))
}

/// Parse an extracted `[...]` slice, retrying once with trailing commas removed
fn parse_candidate(candidate: &str, raw: &str) -> Result<RawFieldList, ExtractError> {
    let first_err = match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Array(items)) => return Ok(items),
        Ok(_) => return Err(malformed("extracted JSON is not an array", raw)),
        Err(e) => e,
    };

    let repaired = strip_trailing_commas(candidate);
    if repaired != candidate
        && let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&repaired)
    {
        warn!("Model output needed trailing-comma repair");
        return Ok(items);
    }

    Err(malformed(&first_err.to_string(), raw))
}

fn malformed(message: &str, raw: &str) -> ExtractError {
    ExtractError::MalformedJson {
        message: message.to_string(),
        preview: raw.chars().take(RAW_PREVIEW_CHARS).collect(),
    }
}

/// Trim, drop a BOM and surrounding code fences
fn preprocess(raw: &str) -> String {
    let s = raw.trim().trim_start_matches('\u{feff}').trim();
    strip_code_fences(s).trim().to_string()
}

fn strip_code_fences(s: &str) -> &str {
    let mut result = s;

    // ```json\n ... or ``` ...
    if result.starts_with("```") {
        result = match result.find('\n') {
            Some(first_newline) => &result[first_newline + 1..],
            None => result.trim_start_matches('`'),
        };
    }

    if let Some(stripped) = result.trim_end().strip_suffix("```") {
        result = stripped;
    }

    result
}

/// Byte index one past the `]` matching the `[` at `start`
///
/// String-aware: brackets inside JSON strings are ignored.
fn matching_bracket(s: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (i, ch) in s[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '[' | '{' if !in_string => depth += 1,
            ']' | '}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (ch == ']').then_some(start + i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

/// First array-valued member of a wrapper object
fn first_array_member(value: &Value) -> Option<RawFieldList> {
    value
        .as_object()?
        .values()
        .find_map(|v| v.as_array().cloned())
}

/// Remove commas directly followed (modulo whitespace) by `]` or `}`
fn strip_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape {
            escape = false;
            result.push(ch);
            continue;
        }

        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some(']') | Some('}')) {
                    continue;
                }
            }
            _ => {}
        }

        result.push(ch);
    }

    result
}
