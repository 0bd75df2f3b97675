// Error handling module
// Defines the session error taxonomy shared by gateways, stores and the manager

use thiserror::Error;

/// Errors that can occur while talking to the auth backend or the credential store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Backend unreachable, connection reset, timeout
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Login rejected by the backend
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Identity check rejected the stored token
    #[error("Invalid or expired token: {0}")]
    InvalidOrExpiredToken(String),

    /// Payload did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Any other non-success status from the backend
    #[error("Auth API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Credential store read/write failure
    #[error("Credential store error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            SessionError::Transport(_) => true,
            SessionError::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}

impl From<rusqlite::Error> for SessionError {
    fn from(err: rusqlite::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::MalformedResponse(err.to_string())
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
