//! Post repository
//!
//! Database operations for blog posts. Tags are stored as a JSON array in
//! a TEXT column; list queries are ordered newest-first by date.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

use crate::models::{ListParams, Post, PostStatus};

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post and return it with its assigned id
    async fn create(&self, post: &Post) -> Result<Post>;

    /// Get a post by id
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get a post by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Check whether a slug is already taken
    async fn slug_exists(&self, slug: &str) -> Result<bool>;

    /// List posts newest-first, optionally filtered by status.
    /// Returns the page of posts and the total count.
    async fn list(
        &self,
        params: &ListParams,
        status: Option<PostStatus>,
    ) -> Result<(Vec<Post>, i64)>;

    /// Update an existing post (matched by id)
    async fn update(&self, post: &Post) -> Result<()>;

    /// Delete a post by slug; returns false when no post matched
    async fn delete_by_slug(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: SqlitePool,
}

impl SqlxPostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<Post> {
        let tags = serde_json::to_string(&post.tags).context("Failed to serialize tags")?;

        let result = sqlx::query(
            r#"
            INSERT INTO posts (slug, title, date, author, tags, category, excerpt,
                               cover_image, content, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.slug)
        .bind(&post.title)
        .bind(post.date)
        .bind(&post.author)
        .bind(&tags)
        .bind(&post.category)
        .bind(&post.excerpt)
        .bind(&post.cover_image)
        .bind(&post.content)
        .bind(post.status.as_str())
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create post")?;

        let mut created = post.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get post by id")?;

        row.map(|r| row_to_post(&r)).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let row = sqlx::query("SELECT * FROM posts WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get post by slug")?;

        row.map(|r| row_to_post(&r)).transpose()
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM posts WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to check slug existence")?;
        Ok(row.is_some())
    }

    async fn list(
        &self,
        params: &ListParams,
        status: Option<PostStatus>,
    ) -> Result<(Vec<Post>, i64)> {
        let (rows, total) = match status {
            Some(status) => {
                let rows = sqlx::query(
                    r#"
                    SELECT * FROM posts WHERE status = ?
                    ORDER BY date DESC, id DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(status.as_str())
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.pool)
                .await
                .context("Failed to list posts")?;

                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE status = ?")
                    .bind(status.as_str())
                    .fetch_one(&self.pool)
                    .await
                    .context("Failed to count posts")?;

                (rows, total)
            }
            None => {
                let rows = sqlx::query(
                    r#"
                    SELECT * FROM posts
                    ORDER BY date DESC, id DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.pool)
                .await
                .context("Failed to list posts")?;

                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
                    .fetch_one(&self.pool)
                    .await
                    .context("Failed to count posts")?;

                (rows, total)
            }
        };

        let posts = rows
            .iter()
            .map(row_to_post)
            .collect::<Result<Vec<_>>>()?;
        Ok((posts, total))
    }

    async fn update(&self, post: &Post) -> Result<()> {
        let tags = serde_json::to_string(&post.tags).context("Failed to serialize tags")?;

        sqlx::query(
            r#"
            UPDATE posts
            SET slug = ?, title = ?, date = ?, author = ?, tags = ?, category = ?,
                excerpt = ?, cover_image = ?, content = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.slug)
        .bind(&post.title)
        .bind(post.date)
        .bind(&post.author)
        .bind(&tags)
        .bind(&post.category)
        .bind(&post.excerpt)
        .bind(&post.cover_image)
        .bind(&post.content)
        .bind(post.status.as_str())
        .bind(post.updated_at)
        .bind(post.id)
        .execute(&self.pool)
        .await
        .context("Failed to update post")?;

        Ok(())
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE slug = ?")
            .bind(slug)
            .execute(&self.pool)
            .await
            .context("Failed to delete post")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_post(row: &SqliteRow) -> Result<Post> {
    let tags_json: String = row.get("tags");
    let tags: Vec<String> =
        serde_json::from_str(&tags_json).context("Failed to parse post tags")?;

    let status_str: String = row.get("status");
    let status = PostStatus::parse(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid post status: {}", status_str))?;

    Ok(Post {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        date: row.get::<NaiveDate, _>("date"),
        author: row.get("author"),
        tags,
        category: row.get("category"),
        excerpt: row.get("excerpt"),
        cover_image: row.get("cover_image"),
        content: row.get("content"),
        status,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    })
}
