//! Gist API payloads and token validation results

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Entry of `GET /gists`
#[derive(Debug, Clone, Deserialize)]
pub struct GistSummary {
    /// Gist identifier
    pub id: String,
    /// Free-form description, used as the document label
    #[serde(default)]
    pub description: Option<String>,
}

/// Response of `GET /gists/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct Gist {
    /// Gist identifier
    pub id: String,
    /// Files keyed by name
    #[serde(default)]
    pub files: HashMap<String, GistFile>,
}

/// File inside a gist
#[derive(Debug, Clone, Deserialize)]
pub struct GistFile {
    /// Inline content, possibly truncated
    #[serde(default)]
    pub content: Option<String>,
    /// Whether `content` was cut short by the API
    #[serde(default)]
    pub truncated: bool,
    /// Location of the full content
    #[serde(default)]
    pub raw_url: Option<String>,
}

/// Body of `POST /gists`
#[derive(Debug, Serialize)]
pub(crate) struct CreateGist<'a> {
    pub description: &'a str,
    pub public: bool,
    pub files: HashMap<&'a str, FileContent>,
}

/// Body of `PATCH /gists/{id}`
#[derive(Debug, Serialize)]
pub(crate) struct UpdateGist<'a> {
    pub files: HashMap<&'a str, FileContent>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FileContent {
    pub content: String,
}

/// Pick the gist carrying `label` as its description.
#[must_use]
pub fn find_labelled<'a>(gists: &'a [GistSummary], label: &str) -> Option<&'a GistSummary> {
    gists
        .iter()
        .find(|gist| gist.description.as_deref() == Some(label))
}

/// Outcome of validating a token against the remote service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValidation {
    /// Token is valid and may manage gists
    Valid,
    /// Token was rejected
    InvalidToken,
    /// Token works but lacks the `gist` scope
    InsufficientPermissions,
    /// The API rate limit is exhausted
    RateLimited,
    /// Transport failure
    Network(String),
    /// Unexpected status from the service
    Server(String),
}

impl TokenValidation {
    /// Whether the token can be used.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Message suitable for the console.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Valid => "Authentication successful.".into(),
            Self::InvalidToken => "Invalid token. Please check your GitHub token.".into(),
            Self::InsufficientPermissions => {
                "Token lacks required permissions. Ensure 'gist' scope is enabled.".into()
            }
            Self::RateLimited => "GitHub API rate limit exceeded. Try again later.".into(),
            Self::Network(detail) => {
                format!("Network connection failed. Please check your internet connection. ({detail})")
            }
            Self::Server(detail) => format!("GitHub API error: {detail}"),
        }
    }
}
