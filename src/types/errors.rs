//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. Validation
//! messages are stable strings so upstream adapters can tell failures apart.

use crate::compiler::EntityKind;
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the Polaris tools.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-input problems detected before any network activity.
    #[error("{0}")]
    Validation(String),

    /// Operation string not present in the alias table of its entity kind.
    #[error("Unsupported {kind} operation: {operation}")]
    UnsupportedOperation { kind: EntityKind, operation: String },

    /// Unknown tool name.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid configuration values.
    #[error("configuration error: {0}")]
    Config(String),

    /// Token endpoint answered with a non-success status.
    #[error("OAuth token endpoint returned {status}: {body}")]
    TokenEndpointStatus { status: u16, body: String },

    /// Token exchange failed (transport, invalid JSON, missing access_token).
    #[error("{0}")]
    TokenExchange(String),

    /// HTTP transport errors from the request executor.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable error code for structured tool results.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "INVALID_ARGUMENT",
            Error::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Config(_) => "CONFIG",
            Error::TokenEndpointStatus { .. } | Error::TokenExchange(_) => "TOKEN_EXCHANGE",
            Error::Http(_) => "HTTP",
            Error::Serialization(_) | Error::Io(_) => "INTERNAL",
        }
    }

    /// True for failures raised by the compiler before any I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::UnsupportedOperation { .. }
        )
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unsupported_operation(kind: EntityKind, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            kind,
            operation: operation.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn token_exchange(msg: impl Into<String>) -> Self {
        Self::TokenExchange(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_operation_names_kind_and_operation() {
        let err = Error::unsupported_operation(EntityKind::CatalogRole, "explode");
        assert_eq!(err.to_string(), "Unsupported catalog role operation: explode");
        assert_eq!(err.kind(), "UNSUPPORTED_OPERATION");
        assert!(err.is_validation());
    }

    #[test]
    fn token_status_error_embeds_status_and_body() {
        let err = Error::TokenEndpointStatus {
            status: 401,
            body: "bad client".to_string(),
        };
        assert_eq!(err.to_string(), "OAuth token endpoint returned 401: bad client");
        assert_eq!(err.kind(), "TOKEN_EXCHANGE");
        assert!(!err.is_validation());
    }

    #[test]
    fn validation_message_is_verbatim() {
        let err = Error::validation("Namespace must be provided");
        assert_eq!(err.to_string(), "Namespace must be provided");
    }
}
