//! Client error types

use serde_json::Value;

/// Failures of the transport collaborator
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: status {status}: {body}")]
    Status { status: u16, body: Value },

    #[error("Invalid JSON in response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TransportError {
    /// The error text reported by the remote API, if the exchange got that far.
    ///
    /// Prefers the `error` field of a JSON body and falls back to the whole body.
    pub fn remote_message(&self) -> Option<String> {
        let TransportError::Status { body, .. } = self else {
            return None;
        };

        match body {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            Value::Object(map) => match map.get("error") {
                Some(Value::String(text)) => Some(text.clone()),
                Some(other) => Some(other.to_string()),
                None => Some(body.to_string()),
            },
            other => Some(other.to_string()),
        }
    }
}

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to authenticate: {message}")]
    Authentication { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to encode request payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ClientError {
    /// Wraps a failed auth exchange, carrying the remote error text when there is one
    pub fn authentication(error: &TransportError) -> Self {
        let message = error
            .remote_message()
            .unwrap_or_else(|| error.to_string());
        ClientError::Authentication { message }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ClientError::Authentication { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(body: Value) -> TransportError {
        TransportError::Status { status: 401, body }
    }

    #[test]
    fn test_remote_message_prefers_error_field() {
        let err = status(json!({"error": "invalid facebook token", "code": 401}));
        assert_eq!(err.remote_message().as_deref(), Some("invalid facebook token"));
    }

    #[test]
    fn test_remote_message_fallbacks() {
        assert_eq!(
            status(json!("Unauthorized")).remote_message().as_deref(),
            Some("Unauthorized")
        );
        assert_eq!(
            status(json!({"status": 500})).remote_message().as_deref(),
            Some(r#"{"status":500}"#)
        );
        assert_eq!(status(Value::Null).remote_message(), None);
    }

    #[test]
    fn test_authentication_message() {
        let err = ClientError::authentication(&status(json!({"error": "bad token"})));
        assert!(err.is_authentication());
        assert_eq!(err.to_string(), "Failed to authenticate: bad token");
    }

    #[test]
    fn test_authentication_without_remote_text() {
        let err = ClientError::authentication(&status(Value::Null));
        assert_eq!(
            err.to_string(),
            "Failed to authenticate: API error: status 401: null"
        );
    }
}
