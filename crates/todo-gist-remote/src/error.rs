//! Error types for remote document operations

use reqwest::StatusCode;
use todo_gist_core::ErrorKind;

/// Result type for remote operations
pub type Result<T> = std::result::Result<T, RemoteError>;

/// Errors that can occur while talking to the remote document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The remote document does not exist yet
    #[error("Remote document not found: {0}")]
    NotFound(String),

    /// The credential was rejected
    #[error("Remote rejected the credential: {0}")]
    Unauthorized(String),

    /// Transport failure or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with an error status
    #[error("Remote server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// The payload could not be decoded
    #[error("Failed to decode remote document: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::AuthRequired,
            Self::Network(_) => ErrorKind::NetworkError,
            Self::Server { .. } => ErrorKind::ServerError,
            Self::Decode(_) => ErrorKind::DecodeError,
        }
    }

    /// Map a non-success HTTP status to an error.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown status").to_owned()
        } else {
            body.trim().to_owned()
        };
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            other => Self::Server {
                status: other.as_u16(),
                message,
            },
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Network(format!("request timed out: {err}"));
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::from_status(status, "");
        }
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
