//! User repository
//!
//! Database operations for users. The service is single-owner, so the
//! interesting queries are lookup by username and the user count used to
//! gate registration.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

use crate::models::{User, UserRole};

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return it with its assigned id
    async fn create(&self, user: &User) -> Result<User>;

    /// Get a user by id
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get a user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Count all users
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, display_name, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        let mut created = user.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by id")?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by username")?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;
        Ok(count)
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = UserRole::parse(&role_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid user role: {}", role_str))?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        display_name: row.get("display_name"),
        role,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    })
}
