//! HTTP transport
//!
//! This module provides the `reqwest`-backed transport used against the live API.

use std::time::Duration;

use reqwest::Client as ReqwestClient;
use serde_json::Value;

use super::{Transport, TransportError};
use crate::models::{Method, RequestDescriptor};

/// HTTP transport configuration
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    /// Upper bound on a whole exchange; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

/// Transport that performs requests over HTTPS
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: ReqwestClient,
}

impl HttpTransport {
    /// Create a new transport with default configuration
    pub fn new() -> Self {
        Self {
            http_client: ReqwestClient::new(),
        }
    }

    /// Create a new transport with custom configuration
    pub fn with_config(config: TransportConfig) -> Result<Self, TransportError> {
        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
        })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<Value, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self.http_client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.json_body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: parse_error_body(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Error bodies are kept even when they are not JSON
fn parse_error_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_error_body() {
        assert_eq!(parse_error_body(""), Value::Null);
        assert_eq!(parse_error_body("  \n"), Value::Null);
        assert_eq!(
            parse_error_body(r#"{"error":"nope"}"#),
            json!({"error": "nope"})
        );
        assert_eq!(
            parse_error_body("Bad Gateway"),
            Value::String("Bad Gateway".to_string())
        );
    }

    #[test]
    fn test_with_config_timeout() {
        let config = TransportConfig {
            timeout: Some(Duration::from_secs(5)),
        };
        assert!(HttpTransport::with_config(config).is_ok());
    }
}
