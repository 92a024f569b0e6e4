//! File-backed storage implementation for todo-gist.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod token;

pub use error::StoreError;
pub use token::FileTokenStorage;

use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use todo_gist_core::Task;
use tracing::{debug, info, warn};

/// Name of the task file inside the data directory.
pub const TASKS_FILE: &str = "tasks.json";

/// Storage based on a single JSON array at `<data_dir>/tasks.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open the store rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir).map_err(|err| StoreError::io(dir, err))?;
        Ok(Self {
            path: dir.join(TASKS_FILE),
        })
    }

    /// Location of the task file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every task from disk.
    ///
    /// A missing file is an empty set. Entries that are not valid tasks are
    /// skipped; a file that is not a JSON array is reported as corrupt rather
    /// than silently replaced.
    ///
    /// # Errors
    /// Returns [`StoreError::Corrupt`] or an I/O error.
    pub fn load(&self) -> Result<Vec<Task>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Task file absent; starting empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(StoreError::io(&self.path, err)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<Value> = serde_json::from_str(&raw).map_err(|err| StoreError::Corrupt {
            path: self.path.clone(),
            reason: err.to_string(),
        })?;
        let mut tasks = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<Task>(entry) {
                Ok(task) => tasks.push(task),
                Err(err) => warn!(index, %err, path = %self.path.display(), "Skipping invalid local task"),
            }
        }
        Ok(tasks)
    }

    /// Replace the whole task file with `tasks`.
    ///
    /// The content is written to a temporary sibling and renamed over the old
    /// file, so readers see either the previous or the new set.
    ///
    /// # Errors
    /// Returns an error if serialization, writing or the final rename fails.
    pub fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(tasks)?;
        write_atomically(&self.path, body.as_bytes())?;
        info!(path = %self.path.display(), tasks = tasks.len(), "Saved tasks");
        Ok(())
    }
}

pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| StoreError::io(dir, err))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|err| StoreError::io(tmp.path(), err))?;
    tmp.persist(path).map_err(|err| StoreError::Persist {
        path: path.to_path_buf(),
        source: err.error,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use time::macros::datetime;
    use todo_gist_core::TaskStatus;

    fn task(id: &str, description: &str, status: TaskStatus) -> Task {
        Task::new(
            id.parse().unwrap(),
            description,
            status,
            datetime!(2024-03-01 09:00 UTC),
        )
        .unwrap()
    }

    #[test]
    fn missing_file_is_empty() -> Result<(), StoreError> {
        let dir = tempdir().map_err(|err| StoreError::io("tempdir", err))?;
        let store = FileStore::open(dir.path().join("nested"))?;
        assert!(store.load()?.is_empty());
        assert!(dir.path().join("nested").is_dir());
        Ok(())
    }

    #[test]
    fn save_then_load_preserves_order_and_fields() -> Result<(), StoreError> {
        let dir = tempdir().map_err(|err| StoreError::io("tempdir", err))?;
        let store = FileStore::open(dir.path())?;
        let tasks = vec![
            task("abc123def456", "Buy milk", TaskStatus::Pending),
            task("xyz345pqr678", "Walk dog", TaskStatus::Completed),
        ];
        store.save(&tasks)?;
        assert_eq!(store.load()?, tasks);

        store.save(&tasks[1..])?;
        assert_eq!(store.load()?, tasks[1..].to_vec());
        Ok(())
    }

    #[test]
    fn corrupt_file_is_reported_not_discarded() -> Result<(), StoreError> {
        let dir = tempdir().map_err(|err| StoreError::io("tempdir", err))?;
        let store = FileStore::open(dir.path())?;
        fs::write(store.path(), "{ not json").map_err(|err| StoreError::io(store.path(), err))?;

        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
        let still_there = fs::read_to_string(store.path()).map_err(|err| StoreError::io(store.path(), err))?;
        assert_eq!(still_there, "{ not json");
        Ok(())
    }

    #[test]
    fn invalid_entries_are_skipped() -> Result<(), StoreError> {
        let dir = tempdir().map_err(|err| StoreError::io("tempdir", err))?;
        let store = FileStore::open(dir.path())?;
        let body = r#"[
            {"hash": "abc123def456", "description": "Buy milk", "status": "Pending", "createdAt": "2024-03-01T09:00:00Z"},
            {"hash": "bad", "description": "No status", "createdAt": "2024-03-01T09:00:00Z"}
        ]"#;
        fs::write(store.path(), body).map_err(|err| StoreError::io(store.path(), err))?;

        let tasks = store.load()?;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id().as_str(), "abc123def456");
        Ok(())
    }
}
