use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors returned by, or while talking to, the execution node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The node answered with a non-success status.
    #[error("node returned {status}: {message}")]
    Api {
        /// HTTP status of the response.
        status: StatusCode,
        /// Error message extracted from the response body.
        message: String,
    },
    /// The request could not be sent or the response could not be read.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The response body is not the expected JSON.
    #[error("malformed node response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The endpoint URL could not be built.
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),
}

/// Extracts a human readable message from a node error body.
///
/// The node, and the proxies in front of it, answer with several JSON error shapes. They are tried
/// in order:
///
/// 1. `{"errors": [{"message": ..} | {"msg": ..} | ".."]}`, all messages joined by `"; "`
/// 2. `{"message": ".."}`
/// 3. `{"error": ".."}`
/// 4. `{"error": {"message": ".."}}`
/// 5. `{"detail": ".."}`
///
/// Anything else falls back to the raw body, or the status reason if the body is empty.
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        let body = body.trim();
        if body.is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            body.to_string()
        }
    };

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };

    if let Some(errors) = value.get("errors").and_then(Value::as_array) {
        let messages = errors
            .iter()
            .filter_map(|err| match err {
                Value::String(msg) => Some(msg.as_str()),
                err => err.get("message").or_else(|| err.get("msg")).and_then(Value::as_str),
            })
            .collect::<Vec<_>>();
        if !messages.is_empty() {
            return messages.join("; ");
        }
    }

    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return message.to_string();
    }

    match value.get("error") {
        Some(Value::String(message)) => return message.clone(),
        Some(err) => {
            if let Some(message) = err.get("message").and_then(Value::as_str) {
                return message.to_string();
            }
        }
        None => {}
    }

    if let Some(detail) = value.get("detail").and_then(Value::as_str) {
        return detail.to_string();
    }

    fallback()
}
