//! Error types for the DataHub client.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A shared error type for the entire DataHub client.
///
/// Covers the taxonomy the stores recover from: validation before a request
/// is issued, missing credentials, transport/server rejections carrying an
/// optional structured body, and local storage or configuration failures.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DatahubError {
    /// Required input was missing; no request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation needs an access (or refresh) token and none is held.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The server answered with a non-success status.
    #[error("HTTP {status}{}", body_suffix(.body))]
    Http { status: u16, body: Option<Value> },

    /// The request never produced a response (connect, timeout, TLS, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Durable token storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn body_suffix(body: &Option<Value>) -> String {
    match body {
        Some(Value::String(text)) if !text.is_empty() => format!(": {}", text),
        Some(Value::Null) | None => String::new(),
        Some(other) => format!(": {}", other),
    }
}

impl DatahubError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an Http error from a status and an optional decoded body
    pub fn http(status: u16, body: Option<Value>) -> Self {
        Self::Http { status, body }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an Unauthenticated error
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    /// Check if the server rejected the credentials (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// HTTP status of a server rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured body of a server rejection, if any.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for DatahubError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for DatahubError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DatahubError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for DatahubError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, DatahubError>`.
pub type Result<T> = std::result::Result<T, DatahubError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_display_includes_body() {
        let err = DatahubError::http(400, Some(json!({"detail": "bad"})));
        assert_eq!(err.to_string(), r#"HTTP 400: {"detail":"bad"}"#);

        let err = DatahubError::http(500, None);
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn test_unauthorized_predicate() {
        assert!(DatahubError::http(401, None).is_unauthorized());
        assert!(!DatahubError::http(403, None).is_unauthorized());
        assert!(!DatahubError::Unauthenticated.is_unauthorized());
        assert!(DatahubError::Unauthenticated.is_unauthenticated());
    }
}
