//! Business logic services
//!
//! Services sit between the API layer and the repositories/clients. Each
//! service owns validation, caching and error taxonomy for one domain:
//! posts, users/sessions, project aggregation, AI summaries.

pub mod frontmatter;
pub mod markdown;
pub mod password;
pub mod post;
pub mod project;
pub mod rate_limiter;
pub mod summary;
pub mod user;

pub use rate_limiter::LoginRateLimiter;
