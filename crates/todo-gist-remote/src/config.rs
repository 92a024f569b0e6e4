//! Remote document configuration

use serde::Deserialize;
use std::time::Duration;

/// Configuration for the gist-backed remote document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the GitHub REST API
    pub api_base: String,

    /// Timeout in seconds applied to every request
    pub timeout: u64,

    /// Gist description used to discover the task document
    pub document_label: String,

    /// Name of the file inside the gist holding the task list
    pub file_name: String,

    /// User-Agent header sent with each request
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com/".into(),
            timeout: 30,
            document_label: "TodoCLI Task List".into(),
            file_name: "todolist.json".into(),
            user_agent: concat!("todo-gist/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl RemoteConfig {
    /// Request timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Join `path` onto the API base URL
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
