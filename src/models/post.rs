//! Blog post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - `PostStatus` enum for publication states
//! - Input types for creating and updating posts
//! - Pagination types for list queries

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Blog post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Post title
    pub title: String,
    /// Publication date shown to readers
    pub date: NaiveDate,
    /// Author display name
    pub author: String,
    /// Free-form tag list
    #[serde(default)]
    pub tags: Vec<String>,
    /// Category name
    pub category: String,
    /// Short excerpt for list views
    pub excerpt: String,
    /// Cover image (URL or emoji shorthand)
    #[serde(default)]
    pub cover_image: Option<String>,
    /// Markdown content
    pub content: String,
    /// Publication status
    pub status: PostStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Whether the post is visible to public readers
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}

/// Post publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Draft - not visible to public readers
    #[default]
    Draft,
    /// Published - visible to public readers
    Published,
}

impl PostStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    /// Parse status from database string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostInput {
    /// Explicit slug; derived from the title when absent
    pub slug: Option<String>,
    /// Post title (required)
    pub title: String,
    /// Publication date; defaults to today when absent
    pub date: Option<NaiveDate>,
    /// Author display name (required)
    pub author: String,
    /// Tag list
    #[serde(default)]
    pub tags: Vec<String>,
    /// Category name
    #[serde(default)]
    pub category: String,
    /// Short excerpt
    #[serde(default)]
    pub excerpt: String,
    /// Cover image
    #[serde(default)]
    pub cover_image: Option<String>,
    /// Markdown content (required)
    pub content: String,
    /// Publication status (defaults to draft)
    pub status: Option<PostStatus>,
}

/// Input for updating an existing post
///
/// All fields are optional; only set fields are applied. When the title
/// changes and no explicit slug is supplied, the slug is regenerated from
/// the new title (which changes the post's URL).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostInput {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub content: Option<String>,
    pub status: Option<PostStatus>,
}

impl UpdatePostInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.slug.is_some()
            || self.title.is_some()
            || self.date.is_some()
            || self.author.is_some()
            || self.tags.is_some()
            || self.category.is_some()
            || self.excerpt.is_some()
            || self.cover_image.is_some()
            || self.content.is_some()
            || self.status.is_some()
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters, clamped to sane bounds
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        ((self.total as u32) + self.per_page - 1) / self.per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_clamps() {
        let params = ListParams::new(0, 500);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_offset_handles_huge_page_numbers() {
        let params = ListParams::new(u32::MAX, 100);
        assert_eq!(params.offset(), (i64::from(u32::MAX) - 1) * 100);
    }

    #[test]
    fn test_list_params_offset() {
        let params = ListParams::new(3, 10);
        assert_eq!(params.offset(), 20);
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_post_status_roundtrip() {
        assert_eq!(PostStatus::parse("draft"), Some(PostStatus::Draft));
        assert_eq!(PostStatus::parse("Published"), Some(PostStatus::Published));
        assert_eq!(PostStatus::parse("archived"), None);
        assert_eq!(PostStatus::Published.as_str(), "published");
    }

    #[test]
    fn test_paged_result_total_pages() {
        let params = ListParams::new(1, 10);
        let result = PagedResult::<i32>::new(vec![], 25, &params);
        assert_eq!(result.total_pages(), 3);
    }
}
