//! `todo sync`.

use std::io::Write;

use anyhow::Result;
use todo_gist_app::{
    AuthError, Authenticator, Clock, RemoteDocument, SyncEngine, TaskStore, TokenStorage, TokenValidator,
};
use todo_gist_core::ErrorKind;
use todo_gist_remote::TokenValidation;
use tracing::debug;

const REAUTH_HINT: &str = "Run 'todo auth setup' to re-authenticate.";

pub async fn run<S, R, T, C, V>(
    engine: &SyncEngine<S, R>,
    authenticator: &Authenticator<T, C>,
    validator: &V,
    out: &mut impl Write,
) -> Result<bool>
where
    S: TaskStore,
    R: RemoteDocument,
    T: TokenStorage,
    C: Clock,
    V: TokenValidator,
{
    let credential = match authenticator.ensure_validated(validator).await {
        Ok(credential) => credential,
        Err(AuthError::Storage(err)) => return Err(err),
        Err(err) => {
            debug!(kind = ?err.kind(), %err, "Sync not authorized");
            if let AuthError::Rejected(TokenValidation::InvalidToken) = err {
                writeln!(out, "Authentication expired. {REAUTH_HINT}")?;
            } else {
                writeln!(out, "Synchronization failed: {err}")?;
            }
            return Ok(false);
        }
    };

    writeln!(out, "Synchronizing with GitHub Gist...")?;
    let outcome = engine.synchronize(Some(&credential)).await?;
    if !outcome.success {
        writeln!(out, "Synchronization failed: {}", outcome.message)?;
        if outcome.failure == Some(ErrorKind::AuthRequired) {
            writeln!(out, "{REAUTH_HINT}")?;
        }
        return Ok(false);
    }

    writeln!(
        out,
        "Synchronization completed successfully. {} tasks synced.",
        outcome.tasks_synced
    )?;
    if outcome.conflicts_resolved > 0 {
        writeln!(out, "Resolved {} conflict(s).", outcome.conflicts_resolved)?;
    }
    Ok(true)
}
