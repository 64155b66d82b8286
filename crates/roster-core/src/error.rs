//! Unified error handling for roster-core

use thiserror::Error;

/// Core error type for roster-core
#[derive(Error, Debug)]
pub enum Error {
    /// Non-2xx reply from the API, with the server-supplied `error`/`message` when present
    #[error("API error {status}: {}", message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    #[error("Session invalid: {0}")]
    SessionInvalid(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for roster-core
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an API error from a status code and optional server message
    pub fn api(status: u16, message: Option<String>) -> Self {
        Error::Api { status, message }
    }

    /// Create a session error
    pub fn session(msg: impl Into<String>) -> Self {
        Error::SessionInvalid(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// HTTP status of an API failure, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the server rejected the credential (401/403) or the session is unusable
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::SessionInvalid(_)) || matches!(self.status(), Some(401 | 403))
    }

    /// True for client-side validation failures that never reached the network
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::validation("Username is required");
        assert_eq!(err.to_string(), "Validation error: Username is required");
    }

    #[test]
    fn test_api_error_display_with_message() {
        let err = Error::api(409, Some("Username already exists".to_string()));
        assert_eq!(err.to_string(), "API error 409: Username already exists");
    }

    #[test]
    fn test_api_error_display_without_message() {
        let err = Error::api(500, None);
        assert_eq!(err.to_string(), "API error 500: no message");
    }

    #[test]
    fn test_auth_failure_classification() {
        assert!(Error::api(401, None).is_auth_failure());
        assert!(Error::api(403, None).is_auth_failure());
        assert!(Error::session("no token").is_auth_failure());
        assert!(!Error::api(500, None).is_auth_failure());
        assert!(!Error::validation("x").is_auth_failure());
    }

    #[test]
    fn test_status_only_for_api_errors() {
        assert_eq!(Error::api(404, None).status(), Some(404));
        assert_eq!(Error::config("bad").status(), None);
    }
}
