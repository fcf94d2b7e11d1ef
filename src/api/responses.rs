//! API response types
//!
//! Wire-level views of the domain models. Full post reads carry the
//! rendered HTML alongside the raw markdown; list views carry only the
//! metadata the SPA needs for cards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{PagedResult, Post};

/// Full post view, returned by single-post reads
#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub date: NaiveDate,
    pub author: String,
    pub tags: Vec<String>,
    pub category: String,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub content: String,
    pub content_html: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl PostResponse {
    /// Build the response, rendering the markdown body
    pub fn from_post(post: Post, content_html: String) -> Self {
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            date: post.date,
            author: post.author,
            tags: post.tags,
            category: post.category,
            excerpt: post.excerpt,
            cover_image: post.cover_image,
            content: post.content,
            content_html,
            status: post.status.to_string(),
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }
}

/// Compact post view for list endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub date: NaiveDate,
    pub author: String,
    pub tags: Vec<String>,
    pub category: String,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub status: String,
}

impl From<Post> for PostSummary {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            date: post.date,
            author: post.author,
            tags: post.tags,
            category: post.category,
            excerpt: post.excerpt,
            cover_image: post.cover_image,
            status: post.status.to_string(),
        }
    }
}

/// Paginated post list response
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedPostsResponse {
    pub posts: Vec<PostSummary>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl From<PagedResult<Post>> for PaginatedPostsResponse {
    fn from(result: PagedResult<Post>) -> Self {
        let total_pages = result.total_pages();
        Self {
            posts: result.items.into_iter().map(PostSummary::from).collect(),
            total: result.total,
            page: result.page,
            per_page: result.per_page,
            total_pages,
        }
    }
}
