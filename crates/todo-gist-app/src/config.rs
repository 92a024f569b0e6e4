//! User configuration loaded from `config.toml`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use todo_gist_remote::RemoteConfig;

const APP_DIR: &str = "todo-gist";
const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote document settings.
    pub remote: RemoteConfig,
    /// Credential settings.
    pub auth: AuthConfig,
    /// Local storage settings.
    pub storage: StorageConfig,
}

/// `[auth]` block.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Seconds a successful token validation stays trusted.
    pub validation_ttl: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { validation_ttl: 3600 }
    }
}

/// `[storage]` block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the task file, token and validation cache.
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Default configuration file location, when the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load the configuration at `path`, or the default location when `None`.
    ///
    /// A missing file yields defaults.
    ///
    /// # Errors
    /// Fails when the file cannot be read, parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("failed to load {}", path.display()))
    }

    /// Parse and validate configuration text.
    ///
    /// # Errors
    /// Fails on malformed TOML or invalid values.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.remote.timeout == 0 {
            bail!("remote.timeout must be greater than zero");
        }
        if self.remote.document_label.trim().is_empty() {
            bail!("remote.document_label cannot be empty");
        }
        if self.remote.file_name.trim().is_empty() {
            bail!("remote.file_name cannot be empty");
        }
        if self.remote.api_base.trim().is_empty() {
            bail!("remote.api_base cannot be empty");
        }
        Ok(())
    }

    /// Resolve the data directory: `override_dir`, then `storage.data_dir`,
    /// then the platform data directory.
    ///
    /// # Errors
    /// Fails when no directory can be determined.
    pub fn data_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = override_dir {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| anyhow!("could not determine a data directory; use --data-dir"))
    }
}
