//! Credential handling: token storage, validation cache and authenticator.

use anyhow::Error;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use todo_gist_core::ErrorKind;
use todo_gist_remote::{GistClient, TokenValidation};
use todo_gist_store_fs::{FileTokenStorage, StoreError};
use tracing::{debug, info, warn};

use crate::clock::Clock;

/// Access token handed to the remote client. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token, trimming whitespace. Blank input yields `None`.
    #[must_use]
    pub fn new(token: &str) -> Option<Self> {
        let token = token.trim();
        (!token.is_empty()).then(|| Self(token.to_owned()))
    }

    /// Raw token for request headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Where the token lives between invocations.
pub trait TokenStorage {
    /// Error type bubbled up from the backing storage.
    type Error: Into<Error>;

    /// Stored token, if any.
    ///
    /// # Errors
    /// Returns a storage-specific error when the token cannot be read.
    fn get_token(&self) -> Result<Option<String>, Self::Error>;

    /// Replace the stored token.
    ///
    /// # Errors
    /// Returns a storage-specific error when the token cannot be written.
    fn store_token(&self, token: &str) -> Result<(), Self::Error>;

    /// Forget the stored token.
    ///
    /// # Errors
    /// Returns a storage-specific error when the token cannot be removed.
    fn clear_token(&self) -> Result<(), Self::Error>;
}

impl TokenStorage for FileTokenStorage {
    type Error = StoreError;

    fn get_token(&self) -> Result<Option<String>, Self::Error> {
        Self::get_token(self)
    }

    fn store_token(&self, token: &str) -> Result<(), Self::Error> {
        Self::store_token(self, token)
    }

    fn clear_token(&self) -> Result<(), Self::Error> {
        Self::clear_token(self)
    }
}

/// Token storage kept in memory; clones share the slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokens {
    slot: Arc<Mutex<Option<String>>>,
}

impl TokenStorage for MemoryTokens {
    type Error = std::convert::Infallible;

    fn get_token(&self) -> Result<Option<String>, Self::Error> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn store_token(&self, token: &str) -> Result<(), Self::Error> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear_token(&self) -> Result<(), Self::Error> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Checks a token against the remote service.
#[allow(async_fn_in_trait)]
pub trait TokenValidator {
    /// Ask the service whether `token` is usable.
    async fn validate(&self, token: &str) -> TokenValidation;
}

impl TokenValidator for GistClient {
    async fn validate(&self, token: &str) -> TokenValidation {
        self.validate_token(token).await
    }
}

impl<T: TokenValidator + ?Sized> TokenValidator for &T {
    async fn validate(&self, token: &str) -> TokenValidation {
        (**self).validate(token).await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    fingerprint: String,
    validated_at: i64,
}

/// Remembers recent successful validations so every command does not hit
/// the network.
///
/// Only a SHA-256 fingerprint of the token is kept. With a path the entry is
/// persisted as JSON; without one it lives for the lifetime of the cache.
#[derive(Debug)]
pub struct ValidationCache<C> {
    path: Option<PathBuf>,
    clock: C,
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl<C: Clock> ValidationCache<C> {
    /// Cache persisted at `path`.
    pub fn persistent(path: impl Into<PathBuf>, clock: C, ttl: Duration) -> Self {
        let path = path.into();
        let entry = read_entry(&path);
        Self {
            path: Some(path),
            clock,
            ttl,
            entry: Mutex::new(entry),
        }
    }

    /// Cache that is never written to disk.
    pub const fn in_memory(clock: C, ttl: Duration) -> Self {
        Self {
            path: None,
            clock,
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Whether `token` was validated within the TTL.
    pub fn get(&self, token: &str) -> bool {
        let guard = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = guard.as_ref() else {
            return false;
        };
        if entry.fingerprint != fingerprint(token) {
            return false;
        }
        let Ok(validated_at) = OffsetDateTime::from_unix_timestamp(entry.validated_at) else {
            return false;
        };
        let age = self.clock.now() - validated_at;
        age >= Duration::ZERO && age < self.ttl
    }

    /// Record a successful validation of `token` now.
    pub fn put(&self, token: &str) {
        let entry = CacheEntry {
            fingerprint: fingerprint(token),
            validated_at: self.clock.now().unix_timestamp(),
        };
        self.persist(Some(&entry));
        *self.entry.lock().unwrap_or_else(PoisonError::into_inner) = Some(entry);
    }

    /// Drop any recorded validation.
    pub fn invalidate(&self) {
        self.persist(None);
        *self.entry.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    // Cache write failures only cost an extra validation round trip.
    fn persist(&self, entry: Option<&CacheEntry>) {
        let Some(path) = &self.path else {
            return;
        };
        let result = match entry {
            Some(entry) => serde_json::to_vec(entry)
                .map_err(std::io::Error::other)
                .and_then(|bytes| fs::write(path, bytes)),
            None => match fs::remove_file(path) {
                Err(err) if err.kind() == IoErrorKind::NotFound => Ok(()),
                other => other,
            },
        };
        if let Err(err) = result {
            warn!(path = %path.display(), %err, "Failed to update validation cache");
        }
    }
}

fn read_entry(path: &std::path::Path) -> Option<CacheEntry> {
    let raw = fs::read(path).ok()?;
    match serde_json::from_slice(&raw) {
        Ok(entry) => Some(entry),
        Err(err) => {
            debug!(path = %path.display(), %err, "Ignoring unreadable validation cache");
            None
        }
    }
}

fn fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Failures while establishing a usable credential.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token has been configured.
    #[error("Not authenticated. Please run 'todo auth setup' first.")]
    MissingToken,
    /// The supplied token was blank.
    #[error("Token cannot be empty.")]
    EmptyToken,
    /// The remote service refused the token.
    #[error("{}", .0.message())]
    Rejected(TokenValidation),
    /// Token storage failed.
    #[error("token storage error: {0}")]
    Storage(#[source] Error),
}

impl AuthError {
    /// Classification for reporting.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::MissingToken => Some(ErrorKind::AuthRequired),
            Self::EmptyToken => Some(ErrorKind::InvalidArgument),
            Self::Rejected(validation) => Some(match validation {
                TokenValidation::Network(_) => ErrorKind::NetworkError,
                TokenValidation::RateLimited | TokenValidation::Server(_) => ErrorKind::ServerError,
                TokenValidation::Valid
                | TokenValidation::InvalidToken
                | TokenValidation::InsufficientPermissions => ErrorKind::AuthRequired,
            }),
            Self::Storage(_) => None,
        }
    }

    fn storage(err: impl Into<Error>) -> Self {
        Self::Storage(err.into())
    }
}

/// Summary of the stored credential for `auth status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// No token stored.
    NotConfigured,
    /// Token stored and validated within the TTL.
    Validated,
    /// Token stored but not validated recently.
    Unverified,
}

/// Credential provider combining token storage and the validation cache.
#[derive(Debug)]
pub struct Authenticator<T, C> {
    tokens: T,
    cache: ValidationCache<C>,
}

impl<T: TokenStorage, C: Clock> Authenticator<T, C> {
    /// Build from its parts.
    pub const fn new(tokens: T, cache: ValidationCache<C>) -> Self {
        Self { tokens, cache }
    }

    fn stored(&self) -> Result<Option<Credential>, AuthError> {
        let token = self.tokens.get_token().map_err(AuthError::storage)?;
        Ok(token.as_deref().and_then(Credential::new))
    }

    /// Stored credential, if any. Storage errors are logged and read as absent.
    pub fn credential(&self) -> Option<Credential> {
        self.stored().unwrap_or_else(|err| {
            warn!(%err, "Failed to read token");
            None
        })
    }

    /// Whether a token is stored and was validated within the TTL.
    pub fn is_authenticated(&self) -> bool {
        self.credential()
            .is_some_and(|credential| self.cache.get(credential.expose()))
    }

    /// Describe the stored credential.
    pub fn status(&self) -> AuthStatus {
        match self.credential() {
            None => AuthStatus::NotConfigured,
            Some(credential) if self.cache.get(credential.expose()) => AuthStatus::Validated,
            Some(_) => AuthStatus::Unverified,
        }
    }

    /// Validate `token` and store it on success.
    ///
    /// # Errors
    /// Returns [`AuthError::EmptyToken`], [`AuthError::Rejected`] with the
    /// service verdict, or a storage error. A rejected token is not stored.
    pub async fn authenticate<V: TokenValidator>(
        &self,
        validator: &V,
        token: &str,
    ) -> Result<Credential, AuthError> {
        let credential = Credential::new(token).ok_or(AuthError::EmptyToken)?;
        let verdict = validator.validate(credential.expose()).await;
        if !verdict.is_valid() {
            warn!(?verdict, "Token validation failed");
            return Err(AuthError::Rejected(verdict));
        }
        self.tokens
            .store_token(credential.expose())
            .map_err(AuthError::storage)?;
        self.cache.put(credential.expose());
        info!("Stored validated token");
        Ok(credential)
    }

    /// Return the stored credential, validating it first when the cache is stale.
    ///
    /// # Errors
    /// Returns [`AuthError::MissingToken`] when nothing is stored and
    /// [`AuthError::Rejected`] when the service refuses the token.
    pub async fn ensure_validated<V: TokenValidator>(&self, validator: &V) -> Result<Credential, AuthError> {
        let credential = self.stored()?.ok_or(AuthError::MissingToken)?;
        if self.cache.get(credential.expose()) {
            debug!("Using cached token validation");
            return Ok(credential);
        }
        let verdict = validator.validate(credential.expose()).await;
        if !verdict.is_valid() {
            if matches!(
                verdict,
                TokenValidation::InvalidToken | TokenValidation::InsufficientPermissions
            ) {
                self.cache.invalidate();
            }
            return Err(AuthError::Rejected(verdict));
        }
        self.cache.put(credential.expose());
        Ok(credential)
    }

    /// Forget the token and any cached validation.
    ///
    /// # Errors
    /// Returns a storage error when the token cannot be removed.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.tokens.clear_token().map_err(AuthError::storage)?;
        self.cache.invalidate();
        info!("Cleared stored token");
        Ok(())
    }
}
