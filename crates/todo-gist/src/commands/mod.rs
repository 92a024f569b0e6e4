//! Command dispatch and console rendering.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use time::Duration;
use todo_gist_app::{AppConfig, Authenticator, SyncEngine, SystemClock, TaskService, ValidationCache};
use todo_gist_remote::GistClient;
use todo_gist_store_fs::{FileStore, FileTokenStorage};

use crate::{AuthCommand, Command};

mod auth;
mod handlers;
mod sync;

const VALIDATION_CACHE_FILE: &str = "validation.json";

/// Resolved configuration and data location for one invocation.
pub struct Environment {
    config: AppConfig,
    data_dir: PathBuf,
}

impl Environment {
    pub const fn new(config: AppConfig, data_dir: PathBuf) -> Self {
        Self { config, data_dir }
    }

    fn store(&self) -> Result<FileStore> {
        FileStore::open(&self.data_dir)
            .with_context(|| format!("failed to open task store in {}", self.data_dir.display()))
    }

    fn authenticator(&self) -> Result<Authenticator<FileTokenStorage, SystemClock>> {
        let tokens = FileTokenStorage::open(&self.data_dir)?;
        let ttl = i64::try_from(self.config.auth.validation_ttl).unwrap_or(i64::MAX);
        let cache = ValidationCache::persistent(
            self.data_dir.join(VALIDATION_CACHE_FILE),
            SystemClock,
            Duration::seconds(ttl),
        );
        Ok(Authenticator::new(tokens, cache))
    }

    fn client(&self) -> Result<GistClient> {
        Ok(GistClient::new(self.config.remote.clone())?)
    }
}

/// Execute `command`, writing user-facing output to `out`.
///
/// Returns `Ok(false)` when the command failed in a way already reported to
/// the user.
pub async fn run(command: Command, env: &Environment, out: &mut impl Write) -> Result<bool> {
    match command {
        Command::Auth { cmd } => {
            let authenticator = env.authenticator()?;
            match cmd {
                AuthCommand::Setup { token } => {
                    let client = env.client()?;
                    auth::setup(&authenticator, &client, token.as_deref().unwrap_or_default(), out).await
                }
                AuthCommand::Status => auth::status(&authenticator, out),
                AuthCommand::Logout => auth::logout(&authenticator, out),
            }
        }
        Command::Sync => {
            let store = env.store()?;
            let authenticator = env.authenticator()?;
            let client = env.client()?;
            let engine = SyncEngine::new(&store, &client);
            sync::run(&engine, &authenticator, &client, out).await
        }
        Command::Add { words } => {
            let service = TaskService::new(env.store()?);
            handlers::add(&service, &words.join(" "), out)
        }
        Command::List => {
            let service = TaskService::new(env.store()?);
            handlers::list(&service, out)
        }
        Command::Done { prefix } => {
            let service = TaskService::new(env.store()?);
            handlers::done(&service, &prefix, out)
        }
        Command::DoneAll => {
            let service = TaskService::new(env.store()?);
            handlers::done_all(&service, out)
        }
        Command::Rm { target } => {
            let service = TaskService::new(env.store()?);
            if target.trim().eq_ignore_ascii_case("all") {
                handlers::remove_all(&service, out)
            } else {
                handlers::remove(&service, &target, out)
            }
        }
    }
}
