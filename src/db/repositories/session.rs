//! Session repository
//!
//! Database operations for user sessions. Sessions are random tokens with
//! a server-side expiry; expired rows are purged by a background task.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::Session;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a new session
    async fn create(&self, session: &Session) -> Result<Session>;

    /// Get session by ID (token)
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>>;

    /// Delete a session
    async fn delete(&self, id: &str) -> Result<()>;

    /// Delete all sessions for a user
    async fn delete_by_user(&self, user_id: i64) -> Result<()>;

    /// Delete expired sessions, returning the number removed
    async fn delete_expired(&self) -> Result<i64>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository {
    pool: SqlitePool,
}

impl SqlxSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, session: &Session) -> Result<Session> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create session")?;

        Ok(session.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            "SELECT id, user_id, expires_at, created_at FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get session by ID")?;

        Ok(row.map(|row| Session {
            id: row.get("id"),
            user_id: row.get("user_id"),
            expires_at: row.get::<DateTime<Utc>, _>("expires_at"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        }))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    async fn delete_by_user(&self, user_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user sessions")?;
        Ok(())
    }

    async fn delete_expired(&self) -> Result<i64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .context("Failed to delete expired sessions")?;
        Ok(result.rows_affected() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use crate::models::{User, UserRole};
    use chrono::Duration;

    async fn setup() -> (SqlitePool, SqlxSessionRepository, i64) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let user_repo = super::super::user::SqlxUserRepository::new(pool.clone());
        use super::super::user::UserRepository;
        let user = user_repo
            .create(&User::new(
                "alex".to_string(),
                "hash".to_string(),
                "Alexandre".to_string(),
                UserRole::Admin,
            ))
            .await
            .unwrap();

        let repo = SqlxSessionRepository::new(pool.clone());
        (pool, repo, user.id)
    }

    fn session_for(user_id: i64, ttl: Duration) -> Session {
        let now = Utc::now();
        Session {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_pool, repo, user_id) = setup().await;
        let session = session_for(user_id, Duration::days(7));
        repo.create(&session).await.unwrap();

        let found = repo.get_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(found.user_id, user_id);
        assert!(!found.is_expired());
    }

    #[tokio::test]
    async fn test_delete_expired_removes_only_stale() {
        let (_pool, repo, user_id) = setup().await;
        let live = session_for(user_id, Duration::days(1));
        let stale = session_for(user_id, Duration::days(-1));
        repo.create(&live).await.unwrap();
        repo.create(&stale).await.unwrap();

        let removed = repo.delete_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert!(repo.get_by_id(&live.id).await.unwrap().is_some());
        assert!(repo.get_by_id(&stale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_by_user() {
        let (_pool, repo, user_id) = setup().await;
        let a = session_for(user_id, Duration::days(1));
        let b = session_for(user_id, Duration::days(2));
        repo.create(&a).await.unwrap();
        repo.create(&b).await.unwrap();

        repo.delete_by_user(user_id).await.unwrap();
        assert!(repo.get_by_id(&a.id).await.unwrap().is_none());
        assert!(repo.get_by_id(&b.id).await.unwrap().is_none());
    }
}
