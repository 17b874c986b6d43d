//! HTTP plumbing shared by the adapters
//!
//! Maps every failure onto `ProviderError`. Reading a provider's error body
//! never fails: a best-effort message is substituted when the body does not
//! have a recognised shape.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{ProviderConfig, ProviderResult};
use crate::constants::network::{CONNECTION_TIMEOUT_SECS, MAX_ERROR_BODY_CHARS};
use crate::types::{FormError, ProviderError, Result, json_string, truncate_chars};

/// HTTP client for one adapter
pub(super) fn build_client(config: &ProviderConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| FormError::HttpClient(format!("Failed to create HTTP client: {}", e)))
}

/// Send a prepared request and decode a successful JSON body
pub(super) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> ProviderResult<T> {
    let response = request
        .send()
        .await
        .map_err(|e| request_error(provider, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| request_error(provider, e))?;

    if !status.is_success() {
        debug!("{} returned HTTP {}", provider, status.as_u16());
        let message = error_message(&body).unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                truncate_chars(trimmed, MAX_ERROR_BODY_CHARS)
            }
        });
        return Err(ProviderError::http(provider, status.as_u16(), message, Some(body)));
    }

    serde_json::from_str(&body).map_err(|e| {
        ProviderError::transport(
            provider,
            format!(
                "unexpected response shape: {} (body began: {})",
                e,
                truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS)
            ),
        )
    })
}

/// Reject empty model output
pub(super) fn non_empty_text(provider: &str, text: Option<String>) -> ProviderResult<String> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ProviderError::transport(provider, "response contained no text")),
    }
}

/// Pull a readable message out of the common error body shapes
///
/// `{"error": {"message": ..}}`, `{"error": ".."}`, `{"message": ..}` and
/// Gemini's array-wrapped variant.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let value = match &value {
        Value::Array(items) => items.first()?,
        other => other,
    };

    value
        .get("error")
        .and_then(|e| json_string(e, "message"))
        .or_else(|| json_string(value, "error"))
        .or_else(|| json_string(value, "message"))
        .filter(|m| !m.trim().is_empty())
}

/// Transport failure without the request URL, which may carry a key
fn request_error(provider: &str, err: reqwest::Error) -> ProviderError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {}", err.without_url())
    } else {
        format!("request failed: {}", err.without_url())
    };
    ProviderError::transport(provider, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"type":"error","error":{"type":"invalid_request_error","message":"Your credit balance is too low"}}"#)
                .as_deref(),
            Some("Your credit balance is too low")
        );
        assert_eq!(
            error_message(r#"{"error":"Incorrect API key provided"}"#).as_deref(),
            Some("Incorrect API key provided")
        );
        assert_eq!(
            error_message(r#"{"message":"model not found"}"#).as_deref(),
            Some("model not found")
        );
        assert_eq!(
            error_message(r#"[{"error":{"code":400,"message":"API key not valid"}}]"#).as_deref(),
            Some("API key not valid")
        );
    }

    #[test]
    fn test_error_message_tolerates_garbage() {
        assert_eq!(error_message("<html>Bad Gateway</html>"), None);
        assert_eq!(error_message(""), None);
        assert_eq!(error_message(r#"{"error":{"code":500}}"#), None);
        assert_eq!(error_message("[]"), None);
    }

    #[test]
    fn test_non_empty_text() {
        assert_eq!(non_empty_text("grok", Some("[]".into())), Ok("[]".to_string()));
        assert!(non_empty_text("grok", Some("  ".into())).is_err());
        assert!(non_empty_text("grok", None).is_err());
    }
}
