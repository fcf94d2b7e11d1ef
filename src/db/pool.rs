//! Database connection pool
//!
//! Creates the SQLite connection pool from configuration. File-based
//! databases get their parent directory created and `mode=rwc` appended so
//! a fresh deployment works without manual setup.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

/// Create a SQLite connection pool from configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    connect(&config.url).await
}

/// Create an in-memory pool for tests
pub async fn create_test_pool() -> Result<SqlitePool> {
    connect("sqlite::memory:").await
}

async fn connect(url: &str) -> Result<SqlitePool> {
    // Ensure the database directory exists for file-based SQLite
    if !url.contains(":memory:") {
        let path = url.trim_start_matches("sqlite:");
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {:?}", parent)
                })?;
            }
        }
    }

    let connection_url = if url == ":memory:" {
        "sqlite::memory:".to_string()
    } else if url.starts_with("sqlite:") {
        if url.contains('?') || url.contains(":memory:") {
            url.to_string()
        } else {
            format!("{}?mode=rwc", url)
        }
    } else {
        format!("sqlite:{}?mode=rwc", url)
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .connect(&connection_url)
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .context("Failed to enable foreign keys")?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_test_pool() {
        let pool = create_test_pool().await.unwrap();
        let row: (i64,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.0, 1);
    }

    #[tokio::test]
    async fn test_create_file_pool_in_tempdir() {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("nested").join("test.db");
        let config = DatabaseConfig {
            url: url.to_string_lossy().into_owned(),
        };
        let pool = create_pool(&config).await.unwrap();
        pool.close().await;
        assert!(url.exists());
    }
}
