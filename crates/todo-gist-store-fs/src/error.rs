//! Error types for todo-gist file store operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during `FileStore` and token file operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The task file exists but is not a JSON array.
    #[error("Task file {} is corrupt: {reason}", path.display())]
    Corrupt {
        /// Location of the file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Failed to serialize tasks to JSON.
    #[error("Failed to serialize tasks: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Failed to move the freshly written file into place.
    #[error("Failed to replace {}: {source}", path.display())]
    Persist {
        /// Destination path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// I/O operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
