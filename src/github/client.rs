//! GitHub REST client
//!
//! Thin authenticated wrapper over the GitHub REST API for a fixed
//! account. Only first-page results are fetched (`per_page=100`). README
//! lookups try the `main` branch first and fall back to `master`; content
//! arrives base64-encoded and is decoded here.
//!
//! There is no retry or backoff; callers decide which failures are fatal.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::{header, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::config::GitHubConfig;
use crate::models::{Repo, RepoCommit};

/// Topics that mark a repository as featured on the portfolio
const FEATURED_TOPIC: &str = "featured";

/// How many featured projects to fall back to when no repo carries the topic
const FEATURED_FALLBACK_COUNT: usize = 3;

/// Request timeout for all GitHub calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the GitHub client
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    /// Non-success HTTP status from the API
    #[error("GitHub API returned {status} for {path}")]
    Status { status: StatusCode, path: String },

    /// Transport-level failure
    #[error("GitHub request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// README content could not be decoded from its transport encoding
    #[error("Failed to decode README content: {0}")]
    Decode(String),
}

/// README content response from the contents API
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: Option<String>,
}

/// Authenticated REST client for the showcase account
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    username: String,
}

impl GitHubClient {
    /// Build a client from configuration.
    ///
    /// Sends the v3 JSON Accept header on every request; the GitHub API
    /// also requires a User-Agent. A token, when configured, raises the
    /// rate limit from 60 to 5000 requests per hour.
    pub fn new(config: &GitHubConfig) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        if let Some(token) = &config.token {
            let mut value = header::HeaderValue::from_str(&format!("token {}", token))
                .map_err(|_| anyhow::anyhow!("GitHub token contains invalid characters"))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("vitrine/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            username: config.username.clone(),
        })
    }

    /// The account whose repositories are showcased
    pub fn username(&self) -> &str {
        &self.username
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GitHubError> {
        let url = format!("{}{}", self.api_base, path);
        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitHubError::Status {
                status,
                path: path.to_string(),
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch the account's repositories, most recently updated first.
    ///
    /// Fork filtering happens client-side; the listing endpoint has no
    /// server-side fork filter.
    pub async fn list_repos(&self, exclude_forks: bool) -> Result<Vec<Repo>, GitHubError> {
        let path = format!("/users/{}/repos", self.username);
        let repos: Vec<Repo> = self
            .get_json(
                &path,
                &[("sort", "updated"), ("direction", "desc"), ("per_page", "100")],
            )
            .await?;

        Ok(if exclude_forks {
            repos.into_iter().filter(|repo| !repo.fork).collect()
        } else {
            repos
        })
    }

    /// Fetch repositories carrying at least one of the given topics
    pub async fn list_repos_by_topics(
        &self,
        topics: &[&str],
        exclude_forks: bool,
    ) -> Result<Vec<Repo>, GitHubError> {
        let repos = self.list_repos(exclude_forks).await?;
        Ok(repos
            .into_iter()
            .filter(|repo| topics.iter().any(|topic| repo.topics.iter().any(|t| t == topic)))
            .collect())
    }

    /// Fetch the featured repositories.
    ///
    /// Repos tagged with the `featured` topic win; when none carry it, the
    /// three most recently updated non-fork repos are used instead.
    pub async fn featured_repos(&self) -> Result<Vec<Repo>, GitHubError> {
        let featured = self.list_repos_by_topics(&[FEATURED_TOPIC], true).await?;
        if !featured.is_empty() {
            return Ok(featured);
        }

        let mut repos = self.list_repos(true).await?;
        repos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        repos.truncate(FEATURED_FALLBACK_COUNT);
        Ok(repos)
    }

    /// Fetch a single repository's metadata
    pub async fn get_repo(&self, name: &str) -> Result<Repo, GitHubError> {
        let path = format!("/repos/{}/{}", self.username, name);
        self.get_json(&path, &[]).await
    }

    /// Fetch the first page of a repository's commit history (up to 100)
    pub async fn list_commits(&self, name: &str) -> Result<Vec<RepoCommit>, GitHubError> {
        let path = format!("/repos/{}/{}/commits", self.username, name);
        self.get_json(&path, &[("per_page", "100"), ("page", "1")]).await
    }

    /// Fetch a repository's README, trying `main` then `master`.
    ///
    /// Returns `None` when no README exists on either branch or when the
    /// fetch fails; README absence is never fatal to callers.
    pub async fn get_readme(&self, name: &str) -> Option<String> {
        for branch in ["main", "master"] {
            match self.readme_for_branch(name, branch).await {
                Ok(content) => return Some(content),
                Err(e) => {
                    tracing::debug!("No README for {} on {}: {}", name, branch, e);
                }
            }
        }
        None
    }

    async fn readme_for_branch(&self, name: &str, branch: &str) -> Result<String, GitHubError> {
        let path = format!("/repos/{}/{}/contents/README.md", self.username, name);
        let response: ContentsResponse = self.get_json(&path, &[("ref", branch)]).await?;

        let encoded = response
            .content
            .ok_or_else(|| GitHubError::Decode("missing content field".to_string()))?;

        // The contents API wraps base64 at 60 columns
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = BASE64
            .decode(compact.as_bytes())
            .map_err(|e| GitHubError::Decode(e.to_string()))?;

        String::from_utf8(bytes).map_err(|e| GitHubError::Decode(e.to_string()))
    }
}
