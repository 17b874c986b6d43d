//! Shared helpers for reading loosely-typed JSON and trimming text.
//!
//! ## JSON Extraction Helpers
//!
//! - `json_string` - Extract a string as-is
//! - `json_string_lenient` - Extract a trimmed, non-empty string or number
//! - `json_bool` - Extract a strict boolean with default

use serde_json::Value;

// =============================================================================
// JSON Value Extraction Helpers
// =============================================================================

/// Extract string from JSON value by key.
#[inline]
pub fn json_string(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(String::from)
}

/// Extract a trimmed, non-empty string by key, stringifying numbers.
///
/// Models sometimes emit numeric ids or labels; blanks count as absent.
pub fn json_string_lenient(value: &Value, key: &str) -> Option<String> {
    let s = match value.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// Extract boolean with default. Non-boolean values yield the default.
#[inline]
pub fn json_bool(value: &Value, key: &str, default: bool) -> bool {
    value.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
}

// =============================================================================
// String Utilities
// =============================================================================

/// Truncate to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    let mut chars = s.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_string_lenient() {
        let v = json!({"a": "  hi ", "b": 42, "c": "   ", "d": true});
        assert_eq!(json_string_lenient(&v, "a").as_deref(), Some("hi"));
        assert_eq!(json_string_lenient(&v, "b").as_deref(), Some("42"));
        assert_eq!(json_string_lenient(&v, "c"), None);
        assert_eq!(json_string_lenient(&v, "d"), None);
        assert_eq!(json_string_lenient(&v, "missing"), None);
    }

    #[test]
    fn test_json_bool_strict() {
        let v = json!({"yes": true, "str": "true"});
        assert!(json_bool(&v, "yes", false));
        assert!(!json_bool(&v, "str", false));
        assert!(json_bool(&v, "missing", true));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello world", 5), "hello...");
        assert_eq!(truncate_chars("héllo", 2), "hé...");
    }
}
