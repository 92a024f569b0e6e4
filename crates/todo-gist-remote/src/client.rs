//! HTTP client for the gist holding the task document

use reqwest::header::{ACCEPT, HeaderMap};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::collections::HashMap;
use std::sync::Mutex;
use todo_gist_core::Task;
use tracing::{debug, info, warn};

use crate::document::{decode_tasks, encode_tasks};
use crate::types::{CreateGist, FileContent, Gist, GistSummary, TokenValidation, UpdateGist, find_labelled};
use crate::{RemoteConfig, RemoteError, Result};

const GITHUB_JSON: &str = "application/vnd.github+json";
const PAGE_SIZE: usize = 100;
const MAX_PAGES: usize = 50;

/// Client for the single gist that stores the task list
#[derive(Debug)]
pub struct GistClient {
    http: Client,
    config: RemoteConfig,
    document_id: Mutex<Option<String>>,
}

impl GistClient {
    /// Create a client applying the configured timeout to every request
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Network`] if the HTTP client cannot be built.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout_duration())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| RemoteError::Network(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            config,
            document_id: Mutex::new(None),
        })
    }

    /// Borrow the configuration
    #[must_use]
    pub const fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn cached_id(&self) -> Option<String> {
        self.document_id.lock().ok().and_then(|guard| guard.clone())
    }

    fn remember_id(&self, id: &str) {
        if let Ok(mut guard) = self.document_id.lock() {
            *guard = Some(id.to_owned());
        }
    }

    fn authorized(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.bearer_auth(token).header(ACCEPT, GITHUB_JSON)
    }

    async fn send(&self, builder: RequestBuilder, token: &str) -> Result<Response> {
        let response = self.authorized(builder, token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::from_status(status, &body))
    }

    async fn get_json<T>(&self, url: &str, token: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!(%url, "GET");
        let body = self.send(self.http.get(url), token).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Find the id of the gist labelled with the configured description
    ///
    /// # Errors
    ///
    /// Returns an error when listing gists fails; a missing gist is `Ok(None)`.
    pub async fn locate_document(&self, token: &str) -> Result<Option<String>> {
        for page in 1..=MAX_PAGES {
            let url = self
                .config
                .endpoint(&format!("gists?per_page={PAGE_SIZE}&page={page}"));
            let gists: Vec<GistSummary> = self.get_json(&url, token).await?;
            if let Some(found) = find_labelled(&gists, &self.config.document_label) {
                debug!(id = %found.id, page, "Located task gist");
                self.remember_id(&found.id);
                return Ok(Some(found.id.clone()));
            }
            if gists.len() < PAGE_SIZE {
                break;
            }
        }
        Ok(None)
    }

    async fn document_id(&self, token: &str) -> Result<String> {
        if let Some(id) = self.cached_id() {
            return Ok(id);
        }
        self.locate_document(token).await?.ok_or_else(|| {
            RemoteError::NotFound(format!("no gist labelled '{}'", self.config.document_label))
        })
    }

    /// Fetch the task list from the remote document
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::NotFound`] when no labelled gist exists, or the
    /// transport/decoding error that interrupted the fetch.
    pub async fn fetch_tasks(&self, token: &str) -> Result<Vec<Task>> {
        let id = self.document_id(token).await?;
        let gist: Gist = self.get_json(&self.config.endpoint(&format!("gists/{id}")), token).await?;

        let Some(file) = gist.files.get(&self.config.file_name) else {
            warn!(gist = %gist.id, file = %self.config.file_name, "Task file missing from gist; treating as empty");
            return Ok(Vec::new());
        };

        let content = match (&file.content, file.truncated, &file.raw_url) {
            (_, true, Some(raw_url)) => {
                debug!(%raw_url, "Fetching truncated task file");
                self.send(self.http.get(raw_url.as_str()), token).await?.text().await?
            }
            (Some(content), _, _) => content.clone(),
            (None, _, _) => String::new(),
        };
        decode_tasks(&content)
    }

    /// Create the remote document seeded with `tasks`
    ///
    /// # Errors
    ///
    /// Returns the transport or server error reported by the API.
    pub async fn create_document(&self, token: &str, tasks: &[Task]) -> Result<()> {
        let body = CreateGist {
            description: &self.config.document_label,
            public: false,
            files: self.file_map(tasks)?,
        };
        let response = self
            .send(self.http.post(self.config.endpoint("gists")).json(&body), token)
            .await?;
        let created: GistSummary = serde_json::from_str(&response.text().await?)?;
        self.remember_id(&created.id);
        info!(id = %created.id, tasks = tasks.len(), "Created task gist");
        Ok(())
    }

    /// Overwrite the remote document with `tasks`
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::NotFound`] when the gist disappeared, or the
    /// transport/server error reported by the API.
    pub async fn update_document(&self, token: &str, tasks: &[Task]) -> Result<()> {
        let id = self.document_id(token).await?;
        let body = UpdateGist {
            files: self.file_map(tasks)?,
        };
        self.send(
            self.http
                .patch(self.config.endpoint(&format!("gists/{id}")))
                .json(&body),
            token,
        )
        .await?;
        info!(%id, tasks = tasks.len(), "Updated task gist");
        Ok(())
    }

    fn file_map(&self, tasks: &[Task]) -> Result<HashMap<&str, FileContent>> {
        let mut files = HashMap::new();
        files.insert(
            self.config.file_name.as_str(),
            FileContent {
                content: encode_tasks(tasks)?,
            },
        );
        Ok(files)
    }

    /// Check that `token` is accepted and may manage gists
    pub async fn validate_token(&self, token: &str) -> TokenValidation {
        let user = match self
            .authorized(self.http.get(self.config.endpoint("user")), token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return TokenValidation::Network(RemoteError::from(err).to_string()),
        };
        if !user.status().is_success() {
            return classify_rejection(user.status(), user.headers());
        }

        match self
            .authorized(self.http.get(self.config.endpoint("gists?per_page=1")), token)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => TokenValidation::Valid,
            Ok(response) if rate_limited(response.status(), response.headers()) => {
                TokenValidation::RateLimited
            }
            Ok(_) => TokenValidation::InsufficientPermissions,
            Err(err) => TokenValidation::Network(RemoteError::from(err).to_string()),
        }
    }
}

fn rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    (status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS)
        && headers
            .get("x-ratelimit-remaining")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|remaining| remaining.trim() == "0")
}

/// Classify a non-success answer to `GET /user`.
#[must_use]
pub fn classify_rejection(status: StatusCode, headers: &HeaderMap) -> TokenValidation {
    if status == StatusCode::UNAUTHORIZED {
        return TokenValidation::InvalidToken;
    }
    if rate_limited(status, headers) {
        return TokenValidation::RateLimited;
    }
    TokenValidation::Server(status.to_string())
}
