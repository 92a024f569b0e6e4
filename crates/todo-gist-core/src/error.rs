//! Error taxonomy shared by every layer of todo-gist.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Closed classification of every failure the tracker can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No usable credential; the user must authenticate first.
    AuthRequired,
    /// Bad task description or malformed prefix.
    InvalidArgument,
    /// No task matches a prefix, or the remote document is absent.
    NotFound,
    /// A prefix matches more than one task.
    Ambiguous,
    /// Transport failure, including timeouts.
    NetworkError,
    /// The remote service answered with an error status.
    ServerError,
    /// The remote payload could not be decoded.
    DecodeError,
}

impl ErrorKind {
    /// Stable identifier used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthRequired => "auth_required",
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::Ambiguous => "ambiguous",
            Self::NetworkError => "network_error",
            Self::ServerError => "server_error",
            Self::DecodeError => "decode_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures raised by the task model and identifier service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Task descriptions must contain non-whitespace text.
    #[error("Description cannot be empty.")]
    EmptyDescription,

    /// Task identifiers must be non-empty.
    #[error("Task id cannot be empty.")]
    EmptyId,

    /// Prefix was empty or shorter than the minimum length.
    #[error("Prefix '{prefix}' must be at least {min} characters long.")]
    InvalidPrefix {
        /// Prefix as typed by the user.
        prefix: String,
        /// Minimum accepted prefix length.
        min: usize,
    },

    /// Prefix does not match any known task.
    #[error("No task found with hash prefix '{0}'.")]
    NoMatch(String),

    /// Prefix matches several tasks.
    #[error("Hash prefix '{prefix}' matches {count} tasks. Please use more characters.")]
    Ambiguous {
        /// Prefix as typed by the user.
        prefix: String,
        /// Number of matching tasks.
        count: usize,
    },
}

impl TaskError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyDescription | Self::EmptyId | Self::InvalidPrefix { .. } => {
                ErrorKind::InvalidArgument
            }
            Self::NoMatch(_) => ErrorKind::NotFound,
            Self::Ambiguous { .. } => ErrorKind::Ambiguous,
        }
    }
}
