//! Application layer logic for todo-gist.
//!
//! This crate wires the task model, the local store and the remote document
//! together: task operations, credential handling, configuration and the
//! sync engine used by the CLI.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod auth;
pub mod clock;
pub mod config;
pub mod sync;
pub mod task_service;
pub mod task_store;

// Re-exports for convenience
pub use auth::{
    AuthError, AuthStatus, Authenticator, Credential, MemoryTokens, TokenStorage, TokenValidator,
    ValidationCache,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, AuthConfig, StorageConfig};
pub use sync::{RemoteDocument, SyncEngine};
pub use task_service::{TaskOpError, TaskService};
pub use task_store::{MemoryStore, TaskStore};
