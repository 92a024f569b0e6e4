//! Local task operations shared by every command.

use anyhow::Error;
use thiserror::Error;
use todo_gist_core::{ErrorKind, IdGenerator, RandomIds, Task, TaskError, TaskStatus, resolve_prefix};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::task_store::TaskStore;

/// Errors produced by [`TaskService`].
#[derive(Debug, Error)]
pub enum TaskOpError {
    /// Input was rejected by the task model or prefix resolution.
    #[error(transparent)]
    Task(#[from] TaskError),
    /// Backing store returned an error.
    #[error("store error: {0}")]
    Store(#[source] Error),
}

impl TaskOpError {
    fn store(err: impl Into<Error>) -> Self {
        Self::Store(err.into())
    }

    /// Classification for validation failures; `None` for storage failures.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Task(err) => Some(err.kind()),
            Self::Store(_) => None,
        }
    }
}

/// Add, list, complete and remove tasks in the local store.
pub struct TaskService<S, G = RandomIds, C = SystemClock> {
    store: S,
    ids: G,
    clock: C,
}

impl<S: TaskStore> TaskService<S> {
    /// Service with random ids and the system clock.
    pub const fn new(store: S) -> Self {
        Self {
            store,
            ids: RandomIds,
            clock: SystemClock,
        }
    }
}

impl<S, G, C> TaskService<S, G, C>
where
    S: TaskStore,
    G: IdGenerator,
    C: Clock,
{
    /// Service with explicit id and time sources.
    pub const fn with_sources(store: S, ids: G, clock: C) -> Self {
        Self { store, ids, clock }
    }

    /// Borrow the backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn load(&self) -> Result<Vec<Task>, TaskOpError> {
        self.store.load().map_err(TaskOpError::store)
    }

    fn save(&self, tasks: &[Task]) -> Result<(), TaskOpError> {
        self.store.save(tasks).map_err(TaskOpError::store)
    }

    /// Create a pending task from `description` (trimmed).
    ///
    /// # Errors
    /// Returns [`TaskError::EmptyDescription`] for blank input, or a store error.
    pub fn add(&self, description: &str) -> Result<Task, TaskOpError> {
        let task = Task::new(
            self.ids.next_id(),
            description.trim(),
            TaskStatus::Pending,
            self.clock.now(),
        )?;
        let mut tasks = self.load()?;
        tasks.push(task.clone());
        self.save(&tasks)?;
        info!(id = %task.id(), "Added task");
        Ok(task)
    }

    /// Snapshot of the local set in stored order.
    ///
    /// # Errors
    /// Returns a store error when the set cannot be read.
    pub fn list(&self) -> Result<Vec<Task>, TaskOpError> {
        self.load()
    }

    /// Mark the task identified by `prefix` completed and return it.
    /// `createdAt` is left untouched.
    ///
    /// # Errors
    /// Propagates prefix resolution failures and store errors.
    pub fn complete(&self, prefix: &str) -> Result<Task, TaskOpError> {
        let mut tasks = self.load()?;
        let index = Self::locate(&tasks, prefix)?;
        let changed = tasks[index].complete();
        if changed {
            self.save(&tasks)?;
        }
        debug!(id = %tasks[index].id(), changed, "Completed task");
        Ok(tasks.swap_remove(index))
    }

    /// Delete the task identified by `prefix` and return it.
    ///
    /// # Errors
    /// Propagates prefix resolution failures and store errors.
    pub fn remove(&self, prefix: &str) -> Result<Task, TaskOpError> {
        let mut tasks = self.load()?;
        let index = Self::locate(&tasks, prefix)?;
        let removed = tasks.remove(index);
        self.save(&tasks)?;
        info!(id = %removed.id(), "Removed task");
        Ok(removed)
    }

    /// Complete every pending task; returns how many changed.
    ///
    /// # Errors
    /// Returns a store error.
    pub fn complete_all(&self) -> Result<usize, TaskOpError> {
        let mut tasks = self.load()?;
        let changed = tasks.iter_mut().map(Task::complete).filter(|changed| *changed).count();
        if changed > 0 {
            self.save(&tasks)?;
        }
        Ok(changed)
    }

    /// Delete every task; returns how many were removed.
    ///
    /// # Errors
    /// Returns a store error.
    pub fn remove_all(&self) -> Result<usize, TaskOpError> {
        let removed = self.load()?.len();
        if removed > 0 {
            self.save(&[])?;
        }
        Ok(removed)
    }

    /// Replace the whole local set.
    ///
    /// # Errors
    /// Returns a store error.
    pub fn replace_all(&self, tasks: &[Task]) -> Result<(), TaskOpError> {
        self.save(tasks)
    }

    fn locate(tasks: &[Task], prefix: &str) -> Result<usize, TaskOpError> {
        let id = resolve_prefix(prefix, tasks.iter().map(Task::id))?;
        // resolve_prefix only returns ids drawn from `tasks`
        tasks
            .iter()
            .position(|task| *task.id() == id)
            .ok_or_else(|| TaskError::NoMatch(prefix.trim().to_owned()).into())
    }
}
