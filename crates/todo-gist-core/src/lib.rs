//! Domain types & merge logic for todo-gist.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Error taxonomy.
pub mod error;
/// Identifier generation and prefix resolution.
pub mod id;
/// Snapshot reconciliation.
pub mod merge;
/// Sync reporting.
pub mod outcome;
/// Task model.
pub mod task;

pub use error::{ErrorKind, TaskError};
pub use id::{IdGenerator, RandomIds, TaskId, resolve_prefix};
pub use merge::{MergeResult, Winner, merge, pick_winner};
pub use outcome::SyncOutcome;
pub use task::{Task, TaskStatus};
