//! GitHub project models
//!
//! Wire types for the GitHub REST API responses consumed by the project
//! showcase, plus the derived per-day commit statistics and the aggregate
//! returned to the frontend. Repository snapshots are read-only: they
//! reflect the provider's state at fetch time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Repository snapshot from the GitHub REST API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repo {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fork: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub stargazers_count: i64,
    #[serde(default)]
    pub watchers_count: i64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub forks_count: i64,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub open_issues_count: i64,
    #[serde(default)]
    pub license: Option<RepoLicense>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// License info embedded in a repository response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoLicense {
    pub key: String,
    pub name: String,
}

/// A single commit from the GitHub commits listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoCommit {
    pub sha: String,
    pub commit: CommitDetail,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Nested commit detail (author/committer/message)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    pub author: CommitSignature,
    pub message: String,
}

/// Commit author signature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSignature {
    pub name: String,
    pub date: DateTime<Utc>,
}

/// Per-day commit count, derived from the commit listing.
///
/// Ordered ascending by date; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStat {
    pub date: NaiveDate,
    pub count: u64,
}

/// Aggregate project data assembled by the aggregator
///
/// `readme` and `commit_stats` degrade to `None`/empty when their fetches
/// fail; only a repository metadata failure aborts the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectData {
    pub repo: Repo,
    pub readme: Option<String>,
    pub commit_stats: Vec<CommitStat>,
}
