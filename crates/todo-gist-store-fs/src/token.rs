//! Plain-file storage for the access token.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{StoreError, write_atomically};

/// Name of the token file inside the data directory.
pub const TOKEN_FILE: &str = ".token";

/// Keeps the token in `<data_dir>/.token`, readable only by the owner on Unix.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Storage rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir).map_err(|err| StoreError::io(dir, err))?;
        Ok(Self {
            path: dir.join(TOKEN_FILE),
        })
    }

    /// Location of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token, if any. Blank files count as absent.
    ///
    /// # Errors
    /// Returns an error when the file exists but cannot be read.
    pub fn get_token(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_owned()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::io(&self.path, err)),
        }
    }

    /// Persist `token`, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error when the file cannot be written.
    pub fn store_token(&self, token: &str) -> Result<(), StoreError> {
        write_atomically(&self.path, token.trim().as_bytes())?;
        restrict_permissions(&self.path)?;
        debug!(path = %self.path.display(), "Stored token");
        Ok(())
    }

    /// Remove the stored token. Succeeds when none is stored.
    ///
    /// # Errors
    /// Returns an error when an existing file cannot be removed.
    pub fn clear_token(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::io(&self.path, err)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|err| StoreError::io(path, err))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}
