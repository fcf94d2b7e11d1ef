//! Post service
//!
//! Business logic for blog post management:
//! - Create, read, update, delete posts
//! - Slug generation with collision handling
//! - Draft visibility (drafts never appear in public reads)
//! - Cache invalidation
//! - Validation

use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheLayer, MemoryCache};
use crate::db::repositories::PostRepository;
use crate::models::{CreatePostInput, ListParams, PagedResult, Post, PostStatus, UpdatePostInput};
use crate::services::markdown::MarkdownRenderer;

/// Cache TTL for single posts (1 hour)
const POST_CACHE_TTL_SECS: u64 = 3600;

/// Cache TTL for post lists (10 minutes, lists should refresh faster)
const POST_LIST_CACHE_TTL_SECS: u64 = 600;

/// Cache key prefixes
const CACHE_KEY_POST_BY_SLUG: &str = "post:slug:";
const CACHE_KEY_POST_LIST: &str = "posts:list";

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post not found
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate slug
    #[error("Post slug already exists: {0}")]
    DuplicateSlug(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Post service for managing blog posts
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    cache: Arc<MemoryCache>,
    markdown_renderer: MarkdownRenderer,
    cache_ttl: Duration,
}

impl PostService {
    /// Create a new post service
    pub fn new(
        repo: Arc<dyn PostRepository>,
        cache: Arc<MemoryCache>,
        markdown_renderer: MarkdownRenderer,
    ) -> Self {
        Self {
            repo,
            cache,
            markdown_renderer,
            cache_ttl: Duration::from_secs(POST_CACHE_TTL_SECS),
        }
    }

    /// Create a new post
    ///
    /// When no slug is supplied one is derived from the title; generated
    /// slugs that collide get a numeric suffix (`my-post-2`). An explicit
    /// slug that collides is rejected with `DuplicateSlug`.
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, PostServiceError> {
        self.validate_create_input(&input)?;

        let slug = match input.slug.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => {
                if self
                    .repo
                    .slug_exists(explicit)
                    .await
                    .context("Failed to check slug uniqueness")?
                {
                    return Err(PostServiceError::DuplicateSlug(explicit.to_string()));
                }
                explicit.to_string()
            }
            _ => self.unique_slug_for(&input.title, None).await?,
        };

        let now = Utc::now();
        let post = Post {
            id: 0,
            slug,
            title: input.title.trim().to_string(),
            date: input.date.unwrap_or_else(|| now.date_naive()),
            author: input.author.trim().to_string(),
            tags: input.tags,
            category: input.category,
            excerpt: input.excerpt,
            cover_image: input.cover_image,
            content: input.content,
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let created = self
            .repo
            .create(&post)
            .await
            .context("Failed to create post")?;

        self.invalidate_list_cache().await;

        Ok(created)
    }

    /// Get a post by slug regardless of status (admin reads)
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>, PostServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post by slug")
            .map_err(Into::into)
    }

    /// Get a published post by slug (public reads)
    ///
    /// Draft posts are invisible here; a draft's slug behaves exactly like
    /// a missing one.
    pub async fn get_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Post>, PostServiceError> {
        let cache_key = format!("{}{}", CACHE_KEY_POST_BY_SLUG, slug);
        if let Some(post) = self.cache.get::<Post>(&cache_key).await.ok().flatten() {
            return Ok(Some(post));
        }

        let post = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post by slug")?
            .filter(Post::is_published);

        if let Some(ref found) = post {
            let _ = self.cache.set(&cache_key, found, self.cache_ttl).await;
        }

        Ok(post)
    }

    /// List all posts regardless of status (admin reads)
    pub async fn list(&self, params: &ListParams) -> Result<PagedResult<Post>, PostServiceError> {
        let (posts, total) = self
            .repo
            .list(params, None)
            .await
            .context("Failed to list posts")?;

        Ok(PagedResult::new(posts, total, params))
    }

    /// List published posts newest-first (public reads)
    pub async fn list_published(
        &self,
        params: &ListParams,
    ) -> Result<PagedResult<Post>, PostServiceError> {
        let cache_key = format!(
            "{}:published:{}:{}",
            CACHE_KEY_POST_LIST,
            params.offset(),
            params.limit()
        );
        if let Ok(Some(cached)) = self.cache.get::<PagedResult<Post>>(&cache_key).await {
            return Ok(cached);
        }

        let (posts, total) = self
            .repo
            .list(params, Some(PostStatus::Published))
            .await
            .context("Failed to list published posts")?;

        let result = PagedResult::new(posts, total, params);
        let _ = self
            .cache
            .set(
                &cache_key,
                &result,
                Duration::from_secs(POST_LIST_CACHE_TTL_SECS),
            )
            .await;

        Ok(result)
    }

    /// Update a post identified by slug
    ///
    /// When the title changes and no explicit slug is supplied, the slug is
    /// regenerated from the new title and the post moves to a new URL.
    pub async fn update(
        &self,
        slug: &str,
        input: UpdatePostInput,
    ) -> Result<Post, PostServiceError> {
        let existing = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(slug.to_string()))?;

        self.validate_update_input(&input)?;

        let new_slug = match (&input.slug, &input.title) {
            (Some(explicit), _) => {
                let explicit = explicit.trim();
                if explicit.is_empty() {
                    return Err(PostServiceError::ValidationError(
                        "Post slug cannot be empty".to_string(),
                    ));
                }
                if explicit != existing.slug
                    && self
                        .repo
                        .slug_exists(explicit)
                        .await
                        .context("Failed to check slug uniqueness")?
                {
                    return Err(PostServiceError::DuplicateSlug(explicit.to_string()));
                }
                explicit.to_string()
            }
            (None, Some(new_title)) if new_title.trim() != existing.title => {
                self.unique_slug_for(new_title, Some(&existing.slug)).await?
            }
            _ => existing.slug.clone(),
        };

        let mut updated = existing.clone();
        updated.slug = new_slug;
        if let Some(title) = input.title {
            updated.title = title.trim().to_string();
        }
        if let Some(date) = input.date {
            updated.date = date;
        }
        if let Some(author) = input.author {
            updated.author = author.trim().to_string();
        }
        if let Some(tags) = input.tags {
            updated.tags = tags;
        }
        if let Some(category) = input.category {
            updated.category = category;
        }
        if let Some(excerpt) = input.excerpt {
            updated.excerpt = excerpt;
        }
        if let Some(cover_image) = input.cover_image {
            updated.cover_image = Some(cover_image);
        }
        if let Some(content) = input.content {
            updated.content = content;
        }
        if let Some(status) = input.status {
            updated.status = status;
        }
        updated.updated_at = Utc::now();

        self.repo
            .update(&updated)
            .await
            .context("Failed to update post")?;

        self.invalidate_post_cache(&existing.slug).await;
        if updated.slug != existing.slug {
            self.invalidate_post_cache(&updated.slug).await;
        }

        Ok(updated)
    }

    /// Delete a post by slug; returns false when no post matched
    pub async fn delete(&self, slug: &str) -> Result<bool, PostServiceError> {
        let deleted = self
            .repo
            .delete_by_slug(slug)
            .await
            .context("Failed to delete post")?;

        if deleted {
            self.invalidate_post_cache(slug).await;
        }

        Ok(deleted)
    }

    /// Render markdown content to HTML
    pub fn render_markdown(&self, content: &str) -> String {
        self.markdown_renderer.render(content)
    }

    /// Derive a slug from a title, appending a numeric suffix on collision.
    ///
    /// `current` is the slug of the post being updated, if any; a match
    /// against it is not a collision, so retitling a post to something
    /// that derives its existing slug keeps the post where it is.
    async fn unique_slug_for(
        &self,
        title: &str,
        current: Option<&str>,
    ) -> Result<String, PostServiceError> {
        let base = generate_slug(title);
        if base.is_empty() {
            return Err(PostServiceError::ValidationError(
                "Post title does not produce a valid slug".to_string(),
            ));
        }

        if Some(base.as_str()) == current
            || !self
                .repo
                .slug_exists(&base)
                .await
                .context("Failed to check slug uniqueness")?
        {
            return Ok(base);
        }

        let mut n = 2u32;
        loop {
            let candidate = format!("{}-{}", base, n);
            if Some(candidate.as_str()) == current
                || !self
                    .repo
                    .slug_exists(&candidate)
                    .await
                    .context("Failed to check slug uniqueness")?
            {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    fn validate_create_input(&self, input: &CreatePostInput) -> Result<(), PostServiceError> {
        if input.title.trim().is_empty() {
            return Err(PostServiceError::ValidationError(
                "Post title cannot be empty".to_string(),
            ));
        }
        if input.content.trim().is_empty() {
            return Err(PostServiceError::ValidationError(
                "Post content cannot be empty".to_string(),
            ));
        }
        if input.author.trim().is_empty() {
            return Err(PostServiceError::ValidationError(
                "Post author cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_update_input(&self, input: &UpdatePostInput) -> Result<(), PostServiceError> {
        if !input.has_changes() {
            return Err(PostServiceError::ValidationError(
                "No fields to update".to_string(),
            ));
        }
        if let Some(ref title) = input.title {
            if title.trim().is_empty() {
                return Err(PostServiceError::ValidationError(
                    "Post title cannot be empty".to_string(),
                ));
            }
        }
        if let Some(ref content) = input.content {
            if content.trim().is_empty() {
                return Err(PostServiceError::ValidationError(
                    "Post content cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    async fn invalidate_post_cache(&self, slug: &str) {
        let slug_key = format!("{}{}", CACHE_KEY_POST_BY_SLUG, slug);
        let _ = self.cache.delete(&slug_key).await;
        self.invalidate_list_cache().await;
    }

    async fn invalidate_list_cache(&self) {
        let _ = self.cache.delete_prefix(CACHE_KEY_POST_LIST).await;
    }
}

/// Generate a URL-friendly slug from a title
///
/// Lowercases the title, replaces runs of non-alphanumeric ASCII with a
/// single hyphen and trims hyphens from both ends. Non-ASCII characters
/// are kept as-is.
pub fn generate_slug(title: &str) -> String {
    let mapped: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || !c.is_ascii() {
                c
            } else {
                '-'
            }
        })
        .collect();

    let mut result = String::new();
    let mut prev_hyphen = false;
    for c in mapped.chars() {
        if c == '-' {
            if !prev_hyphen && !result.is_empty() {
                result.push(c);
                prev_hyphen = true;
            }
        } else {
            result.push(c);
            prev_hyphen = false;
        }
    }

    result.trim_end_matches('-').to_string()
}
