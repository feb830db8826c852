//! Structured error payload reported by an upstream service

use serde::{Deserialize, Serialize};

/// Error body returned by a remote service
///
/// Every field is optional; missing fields are replaced with placeholder
/// text when the payload is turned into an error record. Accepts both
/// camelCase and PascalCase field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteErrorPayload {
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
    #[serde(default, alias = "MessageDetail")]
    pub message_detail: Option<String>,
    #[serde(default, alias = "InnerError", alias = "InnerException")]
    pub inner_error: Option<String>,
}

impl RemoteErrorPayload {
    /// Payload with only a message
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Parse a payload from a response body; `None` if the body is not JSON
    /// of the expected shape
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pascal_case_payload() {
        let payload =
            RemoteErrorPayload::parse(r#"{"Message":"nope","MessageDetail":"db down"}"#).unwrap();
        assert_eq!(payload.message.as_deref(), Some("nope"));
        assert_eq!(payload.message_detail.as_deref(), Some("db down"));
        assert_eq!(payload.inner_error, None);
    }

    #[test]
    fn parses_camel_case_payload() {
        let payload = RemoteErrorPayload::parse(r#"{"innerError":"x"}"#).unwrap();
        assert_eq!(payload.inner_error.as_deref(), Some("x"));
    }

    #[test]
    fn garbage_yields_none() {
        assert!(RemoteErrorPayload::parse("<html>").is_none());
    }
}
