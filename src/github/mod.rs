//! GitHub integration
//!
//! This module provides:
//! - `GitHubClient` - authenticated REST client for the showcase account
//! - commit statistics derivation for the project activity chart
//!
//! The client fetches first-page results only (`per_page=100`); the
//! showcase never paginates past that.

pub mod client;
pub mod stats;

pub use client::{GitHubClient, GitHubError};
pub use stats::process_commit_stats;
