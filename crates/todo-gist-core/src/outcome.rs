use serde::Serialize;

use crate::error::ErrorKind;

/// Report of a single synchronization attempt. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    /// Whether both sides now hold the merged set.
    pub success: bool,
    /// Human-readable summary or failure reason.
    pub message: String,
    /// Number of tasks written to the remote document.
    pub tasks_synced: usize,
    /// Number of ids whose local and remote copies disagreed.
    pub conflicts_resolved: usize,
    /// Classification of the failure, when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ErrorKind>,
}

impl SyncOutcome {
    /// Successful outcome.
    pub fn succeeded(message: impl Into<String>, tasks_synced: usize, conflicts_resolved: usize) -> Self {
        Self {
            success: true,
            message: message.into(),
            tasks_synced,
            conflicts_resolved,
            failure: None,
        }
    }

    /// Failed outcome with zeroed counters.
    pub fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            tasks_synced: 0,
            conflicts_resolved: 0,
            failure: Some(kind),
        }
    }
}
