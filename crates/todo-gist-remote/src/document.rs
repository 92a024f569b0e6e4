//! Codec for the task list stored in the remote document

use serde_json::Value;
use todo_gist_core::Task;
use tracing::warn;

use crate::{RemoteError, Result};

/// Decode the document body.
///
/// A blank body is an empty list. Entries that are not valid tasks are
/// skipped one by one; only a body that is not a JSON array fails.
///
/// # Errors
/// Returns [`RemoteError::Decode`] when the body is not a JSON array.
pub fn decode_tasks(content: &str) -> Result<Vec<Task>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let entries: Vec<Value> = serde_json::from_str(content)
        .map_err(|err| RemoteError::Decode(format!("task list is not a JSON array: {err}")))?;

    let mut tasks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Task>(entry) {
            Ok(task) => tasks.push(task),
            Err(err) => warn!(index, %err, "Skipping malformed remote task"),
        }
    }
    Ok(tasks)
}

/// Encode tasks as the pretty-printed document body.
///
/// # Errors
/// Returns [`RemoteError::Decode`] if serialization fails.
pub fn encode_tasks(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_gist_core::{ErrorKind, TaskStatus};

    #[test]
    fn blank_body_is_empty_list() {
        assert!(decode_tasks("").unwrap_or_else(|err| panic!("{err}")).is_empty());
        assert!(decode_tasks(" \n").unwrap_or_else(|err| panic!("{err}")).is_empty());
    }

    #[test]
    fn malformed_entries_are_dropped_individually() {
        let body = r#"[
            {"hash": "abc123def456", "description": "Buy milk", "status": "Pending", "createdAt": "2024-03-01T09:00:00Z"},
            {"hash": "abc789uvw012", "description": "", "status": "Pending", "createdAt": "2024-03-01T09:00:00Z"},
            {"hash": "xyz345pqr678", "description": "Walk dog", "status": "Sleeping", "createdAt": "2024-03-01T09:00:00Z"},
            42,
            {"hash": "def000aaa111", "description": "Call mom", "status": "Completed", "createdAt": "2024-03-02T10:30:00+02:00"}
        ]"#;
        let tasks = decode_tasks(body).unwrap_or_else(|err| panic!("{err}"));
        let ids: Vec<_> = tasks.iter().map(|task| task.id().as_str()).collect();
        assert_eq!(ids, vec!["abc123def456", "def000aaa111"]);
        assert_eq!(tasks[1].status(), TaskStatus::Completed);
    }

    #[test]
    fn non_array_body_is_decode_error() {
        let err = decode_tasks(r#"{"tasks": []}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeError);
    }

    #[test]
    fn encoded_body_decodes_to_same_tasks() {
        let body = r#"[{"hash": "abc123def456", "description": "Buy milk", "status": "Pending", "createdAt": "2024-03-01T09:00:00Z"}]"#;
        let tasks = decode_tasks(body).unwrap_or_else(|err| panic!("{err}"));
        let encoded = encode_tasks(&tasks).unwrap_or_else(|err| panic!("{err}"));
        assert!(encoded.contains("\"hash\": \"abc123def456\""));
        assert_eq!(decode_tasks(&encoded).unwrap_or_else(|err| panic!("{err}")), tasks);
    }
}
