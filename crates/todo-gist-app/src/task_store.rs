//! Persistence seam for the local task set.

use anyhow::Error;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};
use todo_gist_core::Task;
use todo_gist_store_fs::{FileStore, StoreError};

/// Whole-set storage for local tasks.
pub trait TaskStore {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error>;

    /// Load the full local task set in stored order.
    ///
    /// # Errors
    /// Returns a store-specific error when the set cannot be read.
    fn load(&self) -> Result<Vec<Task>, Self::Error>;

    /// Atomically replace the full local task set.
    ///
    /// # Errors
    /// Returns a store-specific error when the set cannot be written.
    fn save(&self, tasks: &[Task]) -> Result<(), Self::Error>;
}

impl TaskStore for FileStore {
    type Error = StoreError;

    fn load(&self) -> Result<Vec<Task>, Self::Error> {
        Self::load(self)
    }

    fn save(&self, tasks: &[Task]) -> Result<(), Self::Error> {
        Self::save(self, tasks)
    }
}

impl<T: TaskStore + ?Sized> TaskStore for &T {
    type Error = T::Error;

    fn load(&self) -> Result<Vec<Task>, Self::Error> {
        (**self).load()
    }

    fn save(&self, tasks: &[Task]) -> Result<(), Self::Error> {
        (**self).save(tasks)
    }
}

/// In-memory store; clones share the same task set.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tasks: Arc<Mutex<Vec<Task>>>,
}

impl MemoryStore {
    /// Store pre-populated with `tasks`.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(tasks)),
        }
    }

    /// Copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl TaskStore for MemoryStore {
    type Error = Infallible;

    fn load(&self) -> Result<Vec<Task>, Self::Error> {
        Ok(self.snapshot())
    }

    fn save(&self, tasks: &[Task]) -> Result<(), Self::Error> {
        *self.tasks.lock().unwrap_or_else(PoisonError::into_inner) = tasks.to_vec();
        Ok(())
    }
}
