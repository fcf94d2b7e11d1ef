//! Data models
//!
//! This module contains all data structures used throughout the Vitrine service.
//! Models represent:
//! - Database entities (Post, User, Session)
//! - GitHub provider wire types (Repo, Commit) and derived statistics
//! - AI summary records
//! - Internal data transfer objects

mod post;
mod project;
mod session;
mod summary;
mod user;

pub use post::{CreatePostInput, ListParams, PagedResult, Post, PostStatus, UpdatePostInput};
pub use project::{
    CommitDetail, CommitSignature, CommitStat, ProjectData, Repo, RepoCommit, RepoLicense,
};
pub use session::Session;
pub use summary::{SummaryRecord, SummaryStats};
pub use user::{User, UserRole};
