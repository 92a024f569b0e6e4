//! Reconciliation of the local task set with the remote document.

use todo_gist_core::{ErrorKind, SyncOutcome, Task, merge};
use todo_gist_remote::{GistClient, RemoteError};
use tracing::{info, warn};

use crate::auth::Credential;
use crate::task_service::TaskOpError;
use crate::task_store::TaskStore;

/// The remote copy of the task list.
#[allow(async_fn_in_trait)]
pub trait RemoteDocument {
    /// Fetch the remote set. [`RemoteError::NotFound`] means no document exists yet.
    ///
    /// # Errors
    /// Returns the transport, server or decoding failure.
    async fn fetch(&self, credential: &Credential) -> Result<Vec<Task>, RemoteError>;

    /// Create the remote document holding `tasks`.
    ///
    /// # Errors
    /// Returns the transport or server failure.
    async fn create(&self, credential: &Credential, tasks: &[Task]) -> Result<(), RemoteError>;

    /// Overwrite the remote document with `tasks`.
    ///
    /// # Errors
    /// Returns the transport or server failure.
    async fn update(&self, credential: &Credential, tasks: &[Task]) -> Result<(), RemoteError>;
}

impl RemoteDocument for GistClient {
    async fn fetch(&self, credential: &Credential) -> Result<Vec<Task>, RemoteError> {
        self.fetch_tasks(credential.expose()).await
    }

    async fn create(&self, credential: &Credential, tasks: &[Task]) -> Result<(), RemoteError> {
        self.create_document(credential.expose(), tasks).await
    }

    async fn update(&self, credential: &Credential, tasks: &[Task]) -> Result<(), RemoteError> {
        self.update_document(credential.expose(), tasks).await
    }
}

impl<R: RemoteDocument + ?Sized> RemoteDocument for &R {
    async fn fetch(&self, credential: &Credential) -> Result<Vec<Task>, RemoteError> {
        (**self).fetch(credential).await
    }

    async fn create(&self, credential: &Credential, tasks: &[Task]) -> Result<(), RemoteError> {
        (**self).create(credential, tasks).await
    }

    async fn update(&self, credential: &Credential, tasks: &[Task]) -> Result<(), RemoteError> {
        (**self).update(credential, tasks).await
    }
}

/// Runs one full reconciliation pass between a local store and a remote document.
pub struct SyncEngine<S, R> {
    store: S,
    remote: R,
}

impl<S: TaskStore, R: RemoteDocument> SyncEngine<S, R> {
    /// Engine over `store` and `remote`.
    pub const fn new(store: S, remote: R) -> Self {
        Self { store, remote }
    }

    /// Reconcile both sides; remote wins when timestamps tie.
    ///
    /// Remote and authentication failures are reported in the returned
    /// outcome. A failed remote update after the local replacement does not
    /// roll the local set back.
    ///
    /// # Errors
    /// Returns an error only when the local store cannot be read or written.
    pub async fn synchronize(&self, credential: Option<&Credential>) -> Result<SyncOutcome, TaskOpError> {
        let Some(credential) = credential else {
            return Ok(SyncOutcome::failed(
                ErrorKind::AuthRequired,
                "Authentication required. Please run auth setup first.",
            ));
        };

        let local = self.store.load().map_err(|err| TaskOpError::Store(err.into()))?;

        let remote = match self.remote.fetch(credential).await {
            Ok(remote) => remote,
            Err(RemoteError::NotFound(reason)) => {
                info!(%reason, tasks = local.len(), "No remote document; creating it from local tasks");
                return Ok(match self.remote.create(credential, &local).await {
                    Ok(()) => SyncOutcome::succeeded("Created remote gist with local tasks.", local.len(), 0),
                    Err(err) => {
                        warn!(%err, "Failed to create remote document");
                        SyncOutcome::failed(err.kind(), format!("Failed to create remote gist: {err}"))
                    }
                });
            }
            Err(err) => {
                warn!(%err, "Failed to fetch remote tasks");
                return Ok(SyncOutcome::failed(
                    err.kind(),
                    format!("Failed to fetch remote tasks: {err}"),
                ));
            }
        };

        let merged = merge(&local, &remote);
        info!(
            local = local.len(),
            remote = remote.len(),
            merged = merged.tasks.len(),
            conflicts = merged.conflicts_resolved,
            "Merged task sets"
        );

        self.store
            .save(&merged.tasks)
            .map_err(|err| TaskOpError::Store(err.into()))?;

        if let Err(err) = self.remote.update(credential, &merged.tasks).await {
            warn!(%err, "Remote update failed after local replacement");
            return Ok(SyncOutcome::failed(
                err.kind(),
                format!("Failed to update remote gist: {err}"),
            ));
        }

        Ok(SyncOutcome::succeeded(
            "Synchronization completed successfully.",
            merged.tasks.len(),
            merged.conflicts_resolved,
        ))
    }
}
