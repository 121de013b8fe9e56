// GitHub repository lookup, passed through to clients unchanged

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use crate::core::errors::AppError;
use crate::core::resilience::{create_circuit_breaker, execute_with_cb, UpstreamCircuitBreaker};

const USER_AGENT: &str = concat!("devhub-api/", env!("CARGO_PKG_VERSION"));
const REPO_LIMIT: &str = "5";
const REPO_SORT: &str = "created:asc";

/// Source of a user's public repositories
#[async_trait]
pub trait RepoLookup: Send + Sync {
    /// Latest repositories of `username` as the upstream returned them
    async fn list_repos(&self, username: &str) -> Result<serde_json::Value, AppError>;
}

/// Upstream failures, kept internal; clients only ever see a generic 404
#[derive(Debug, thiserror::Error)]
enum LookupError {
    #[error("request timeout after {0}s")]
    Timeout(u64),
    #[error("HTTP request failed: {0}")]
    Transport(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("failed to parse response: {0}")]
    Body(String),
}

pub struct GithubClient {
    http_client: Client,
    base_url: Url,
    token: Option<Secret<String>>,
    timeout: Duration,
    cb: UpstreamCircuitBreaker,
}

impl GithubClient {
    pub fn new(
        base_url: &str,
        token: Option<Secret<String>>,
        timeout_secs: u64,
    ) -> Result<Self, AppError> {
        let timeout = Duration::from_secs(timeout_secs);
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Configuration(format!("Invalid GITHUB_API_URL: {}", e)))?;

        let http_client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(2))
            .user_agent(USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            token,
            timeout,
            cb: create_circuit_breaker(),
        })
    }

    /// `{base}/users/{username}/repos?per_page=5&sort=created:asc`
    pub fn repos_url(&self, username: &str) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Configuration("GITHUB_API_URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(&["users", username, "repos"]);
        url.query_pairs_mut()
            .append_pair("per_page", REPO_LIMIT)
            .append_pair("sort", REPO_SORT);
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<serde_json::Value, LookupError> {
        let mut request = self
            .http_client
            .get(url.clone())
            .header("Accept", "application/vnd.github+json");
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout(self.timeout.as_secs())
            } else {
                LookupError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = %status, url = %url, "GitHub returned non-success status");
            return Err(LookupError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| LookupError::Body(e.to_string()))
    }
}

#[async_trait]
impl RepoLookup for GithubClient {
    async fn list_repos(&self, username: &str) -> Result<serde_json::Value, AppError> {
        if !is_valid_username(username) {
            return Err(AppError::Upstream(format!("Invalid username {:?}", username)));
        }
        let url = self.repos_url(username)?;

        execute_with_cb(&self.cb, "github", || self.fetch(url))
            .await
            .map_err(|e| {
                error!(error = %e, username = %username, "GitHub lookup failed");
                e
            })
    }
}

/// Alphanumerics and single inner hyphens, at most 39 characters
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= 39
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !username.starts_with('-')
        && !username.ends_with('-')
        && !username.contains("--")
}
