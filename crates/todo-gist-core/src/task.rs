//! Task model and its serialized form.

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

use crate::error::TaskError;
use crate::id::TaskId;

/// Completion state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Still to be done.
    Pending,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// Name used in the serialized document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single to-do item.
///
/// `id` and `description` never change once constructed. `created_at` doubles
/// as the merge tie-break signal and is not refreshed when the status changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    id: TaskId,
    description: String,
    status: TaskStatus,
    created_at: OffsetDateTime,
}

impl Task {
    /// Build a task, rejecting blank descriptions.
    ///
    /// # Errors
    /// Returns [`TaskError::EmptyDescription`] when `description` has no
    /// non-whitespace characters.
    pub fn new(
        id: TaskId,
        description: impl Into<String>,
        status: TaskStatus,
        created_at: OffsetDateTime,
    ) -> Result<Self, TaskError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(TaskError::EmptyDescription);
        }
        Ok(Self {
            id,
            description,
            status,
            created_at,
        })
    }

    /// Identifier of the task.
    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Whether the task has been completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, TaskStatus::Completed)
    }

    /// Mark the task completed. Returns `false` when it already was.
    pub const fn complete(&mut self) -> bool {
        if self.is_completed() {
            return false;
        }
        self.status = TaskStatus::Completed;
        true
    }

    /// Whether two copies of a task disagree on any merge-relevant field.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.created_at != other.created_at
            || self.description != other.description
            || self.status != other.status
    }
}

/// Wire shape shared by the local task file and the remote document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    hash: TaskId,
    description: String,
    status: TaskStatus,
    #[serde(with = "timestamp")]
    created_at: OffsetDateTime,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Self::new(record.hash, record.description, record.status, record.created_at)
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        Self {
            hash: task.id,
            description: task.description,
            status: task.status,
            created_at: task.created_at,
        }
    }
}

/// RFC 3339 on write; RFC 3339, offset ISO-8601 or offset-less ISO-8601 (as UTC) on read.
mod timestamp {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::format_description::well_known::{Iso8601, Rfc3339};
    use time::{OffsetDateTime, PrimitiveDateTime};

    pub fn serialize<S>(value: &OffsetDateTime, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        s.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
    }

    pub fn parse(raw: &str) -> Option<OffsetDateTime> {
        let raw = raw.trim();
        OffsetDateTime::parse(raw, &Rfc3339)
            .or_else(|_| OffsetDateTime::parse(raw, &Iso8601::DEFAULT))
            .ok()
            .or_else(|| {
                PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT)
                    .ok()
                    .map(PrimitiveDateTime::assume_utc)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use time::macros::datetime;

    fn id(raw: &str) -> TaskId {
        raw.parse().unwrap_or_else(|err| panic!("valid id: {err}"))
    }

    #[test]
    fn rejects_blank_description() {
        let err = Task::new(id("abc"), "  \t", TaskStatus::Pending, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(err, Err(TaskError::EmptyDescription));
    }

    #[test]
    fn complete_is_idempotent_and_keeps_timestamp() {
        let created = datetime!(2024-03-01 09:00 UTC);
        let mut task = Task::new(id("abc123"), "Buy milk", TaskStatus::Pending, created)
            .unwrap_or_else(|err| panic!("{err}"));
        assert!(task.complete());
        assert!(!task.complete());
        assert!(task.is_completed());
        assert_eq!(task.created_at(), created);
    }

    #[test]
    fn serializes_to_wire_shape() {
        let task = Task::new(
            id("abc123def456"),
            "Buy milk",
            TaskStatus::Completed,
            datetime!(2024-03-01 09:00:05 UTC),
        )
        .unwrap_or_else(|err| panic!("{err}"));
        let value = serde_json::to_value(&task).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(
            value,
            json!({
                "hash": "abc123def456",
                "description": "Buy milk",
                "status": "Completed",
                "createdAt": "2024-03-01T09:00:05Z"
            })
        );
    }

    #[test]
    fn reads_offset_timestamps_with_long_fractions() {
        let value = json!({
            "hash": "abc123def456",
            "description": "Walk dog",
            "status": "Pending",
            "createdAt": "2024-03-01T10:00:00.1234567+01:00"
        });
        let task: Task = serde_json::from_value(value).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(task.created_at().unix_timestamp(), datetime!(2024-03-01 09:00 UTC).unix_timestamp());
    }

    #[test]
    fn reads_offsetless_timestamps_as_utc() {
        let value = json!({
            "hash": "abc123def456",
            "description": "Walk dog",
            "status": "Pending",
            "createdAt": "2024-03-01T10:00:00.0000000"
        });
        let task: Task = serde_json::from_value(value).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(task.created_at(), datetime!(2024-03-01 10:00 UTC));
    }

    #[test]
    fn rejects_invalid_records() {
        let bad: [Value; 4] = [
            json!({"hash": "", "description": "x", "status": "Pending", "createdAt": "2024-03-01T10:00:00Z"}),
            json!({"hash": "abc", "description": " ", "status": "Pending", "createdAt": "2024-03-01T10:00:00Z"}),
            json!({"hash": "abc", "description": "x", "status": "Done", "createdAt": "2024-03-01T10:00:00Z"}),
            json!({"hash": "abc", "description": "x", "status": "Pending", "createdAt": "yesterday"}),
        ];
        for value in bad {
            assert!(serde_json::from_value::<Task>(value.clone()).is_err(), "{value}");
        }
    }

    #[test]
    fn conflict_detection_covers_each_field() {
        let base = Task::new(id("h1"), "Buy milk", TaskStatus::Pending, datetime!(2024-03-01 09:00 UTC))
            .unwrap_or_else(|err| panic!("{err}"));
        let same = base.clone();
        assert!(!base.conflicts_with(&same));

        let mut done = base.clone();
        done.complete();
        assert!(base.conflicts_with(&done));

        let renamed = Task::new(id("h1"), "Buy oat milk", TaskStatus::Pending, base.created_at())
            .unwrap_or_else(|err| panic!("{err}"));
        assert!(base.conflicts_with(&renamed));

        let later = Task::new(
            id("h1"),
            "Buy milk",
            TaskStatus::Pending,
            datetime!(2024-03-01 09:00:01 UTC),
        )
        .unwrap_or_else(|err| panic!("{err}"));
        assert!(base.conflicts_with(&later));
    }
}
