//! Sync engine and task service running against the file store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Mutex;

use tempfile::TempDir;
use todo_gist_app::{Credential, RemoteDocument, SyncEngine, TaskService};
use todo_gist_core::{ErrorKind, Task};
use todo_gist_remote::RemoteError;
use todo_gist_store_fs::FileStore;

#[derive(Default)]
struct SharedDocument {
    tasks: Mutex<Option<Vec<Task>>>,
}

impl RemoteDocument for SharedDocument {
    async fn fetch(&self, _credential: &Credential) -> Result<Vec<Task>, RemoteError> {
        self.tasks
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RemoteError::NotFound("no gist".into()))
    }

    async fn create(&self, _credential: &Credential, tasks: &[Task]) -> Result<(), RemoteError> {
        *self.tasks.lock().unwrap() = Some(tasks.to_vec());
        Ok(())
    }

    async fn update(&self, _credential: &Credential, tasks: &[Task]) -> Result<(), RemoteError> {
        *self.tasks.lock().unwrap() = Some(tasks.to_vec());
        Ok(())
    }
}

fn machine() -> (TempDir, FileStore) {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    (dir, store)
}

#[tokio::test]
async fn two_machines_converge_through_the_document() {
    let document = SharedDocument::default();
    let credential = Credential::new("token").unwrap();
    let (_laptop_dir, laptop) = machine();
    let (_desktop_dir, desktop) = machine();

    let laptop_tasks = TaskService::new(&laptop);
    let milk = laptop_tasks.add("Buy milk").unwrap();
    let bootstrap = SyncEngine::new(&laptop, &document)
        .synchronize(Some(&credential))
        .await
        .unwrap();
    assert!(bootstrap.success);
    assert_eq!(bootstrap.tasks_synced, 1);

    let desktop_tasks = TaskService::new(&desktop);
    desktop_tasks.add("Walk dog").unwrap();
    let outcome = SyncEngine::new(&desktop, &document)
        .synchronize(Some(&credential))
        .await
        .unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.tasks_synced, 2);

    // Completion does not refresh createdAt, so the untouched remote copy wins the tie.
    desktop_tasks.complete(milk.id().as_str()).unwrap();
    let outcome = SyncEngine::new(&desktop, &document)
        .synchronize(Some(&credential))
        .await
        .unwrap();
    assert_eq!(outcome.conflicts_resolved, 1);
    let reverted = desktop_tasks.list().unwrap();
    assert!(reverted.iter().all(|task| !task.is_completed()));

    SyncEngine::new(&laptop, &document)
        .synchronize(Some(&credential))
        .await
        .unwrap();
    let mut on_laptop = laptop_tasks.list().unwrap();
    let mut on_desktop = desktop_tasks.list().unwrap();
    on_laptop.sort_by(|a, b| a.id().cmp(b.id()));
    on_desktop.sort_by(|a, b| a.id().cmp(b.id()));
    assert_eq!(on_laptop, on_desktop);
    assert_eq!(on_laptop.len(), 2);
}

#[tokio::test]
async fn sync_without_credential_keeps_file_as_is() {
    let document = SharedDocument::default();
    let (_dir, store) = machine();
    TaskService::new(&store).add("Buy milk").unwrap();
    let before = std::fs::read_to_string(store.path()).unwrap();

    let outcome = SyncEngine::new(&store, &document).synchronize(None).await.unwrap();
    assert_eq!(outcome.failure, Some(ErrorKind::AuthRequired));
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    assert!(document.tasks.lock().unwrap().is_none());
}
