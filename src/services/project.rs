//! Project aggregation service
//!
//! Combines GitHub repository metadata, README content and commit
//! activity into the project views the portfolio renders. Repository
//! listings are cached briefly so page loads do not hammer the GitHub
//! rate limit.
//!
//! Only the repository fetch itself is fatal when building project data;
//! a missing README or an unavailable commit history degrade to `None`
//! and an empty activity chart.

use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheLayer, MemoryCache};
use crate::github::{process_commit_stats, GitHubClient, GitHubError};
use crate::models::{ProjectData, Repo};

/// Cache TTL for repository listings (10 minutes)
const REPO_CACHE_TTL_SECS: u64 = 600;

/// Cache key prefixes
const CACHE_KEY_REPO_LIST: &str = "projects:repos";
const CACHE_KEY_FEATURED: &str = "projects:featured";
const CACHE_KEY_PROJECT_DATA: &str = "projects:data:";

/// Error types for project service operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectServiceError {
    /// Repository not found on the showcase account
    #[error("Project not found: {0}")]
    NotFound(String),

    /// Upstream GitHub failure
    #[error("GitHub error: {0}")]
    Upstream(#[from] GitHubError),
}

/// Project service aggregating GitHub data for the portfolio
pub struct ProjectService {
    github: Arc<GitHubClient>,
    cache: Arc<MemoryCache>,
}

impl ProjectService {
    /// Create a new project service
    pub fn new(github: Arc<GitHubClient>, cache: Arc<MemoryCache>) -> Self {
        Self { github, cache }
    }

    /// List the account's repositories, most recently updated first
    pub async fn list_projects(&self, exclude_forks: bool) -> Result<Vec<Repo>, ProjectServiceError> {
        let cache_key = format!("{}:{}", CACHE_KEY_REPO_LIST, exclude_forks);
        if let Ok(Some(cached)) = self.cache.get::<Vec<Repo>>(&cache_key).await {
            return Ok(cached);
        }

        let repos = self.github.list_repos(exclude_forks).await?;
        let _ = self
            .cache
            .set(
                &cache_key,
                &repos,
                Duration::from_secs(REPO_CACHE_TTL_SECS),
            )
            .await;

        Ok(repos)
    }

    /// List the featured repositories
    pub async fn featured_projects(&self) -> Result<Vec<Repo>, ProjectServiceError> {
        if let Ok(Some(cached)) = self.cache.get::<Vec<Repo>>(CACHE_KEY_FEATURED).await {
            return Ok(cached);
        }

        let repos = self.github.featured_repos().await?;
        let _ = self
            .cache
            .set(
                CACHE_KEY_FEATURED,
                &repos,
                Duration::from_secs(REPO_CACHE_TTL_SECS),
            )
            .await;

        Ok(repos)
    }

    /// Build the full project view for one repository.
    ///
    /// Metadata, README and commit history are fetched concurrently. The
    /// metadata fetch decides success; README and commit failures degrade
    /// rather than propagate.
    pub async fn fetch_project_data(&self, name: &str) -> Result<ProjectData, ProjectServiceError> {
        let cache_key = format!("{}{}", CACHE_KEY_PROJECT_DATA, name);
        if let Ok(Some(cached)) = self.cache.get::<ProjectData>(&cache_key).await {
            return Ok(cached);
        }

        let (repo, readme, commits) = tokio::join!(
            self.github.get_repo(name),
            self.github.get_readme(name),
            self.github.list_commits(name),
        );

        let repo = repo.map_err(|e| match e {
            GitHubError::Status { status, .. } if status == StatusCode::NOT_FOUND => {
                ProjectServiceError::NotFound(name.to_string())
            }
            other => ProjectServiceError::Upstream(other),
        })?;

        let commits = match commits {
            Ok(commits) => commits,
            Err(e) => {
                tracing::warn!("Commit history unavailable for {}: {}", name, e);
                Vec::new()
            }
        };

        let data = ProjectData {
            repo,
            readme,
            commit_stats: process_commit_stats(&commits),
        };

        let _ = self
            .cache
            .set(
                &cache_key,
                &data,
                Duration::from_secs(REPO_CACHE_TTL_SECS),
            )
            .await;

        Ok(data)
    }

    /// Drop all cached project views (admin refresh)
    pub async fn invalidate(&self) {
        let _ = self.cache.delete_prefix(CACHE_KEY_REPO_LIST).await;
        let _ = self.cache.delete(CACHE_KEY_FEATURED).await;
        let _ = self.cache.delete_prefix(CACHE_KEY_PROJECT_DATA).await;
    }
}
