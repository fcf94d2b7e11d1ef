//! Database migrations
//!
//! Code-based migrations embedded in the binary for single-binary
//! deployment. Each migration has a unique sequential version; applied
//! versions are tracked in the `schema_migrations` table and skipped on
//! subsequent startups.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (unique and sequential)
    pub version: i64,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements
    pub up: &'static str,
}

/// All migrations for the Vitrine service
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                display_name VARCHAR(100) NOT NULL,
                role VARCHAR(20) NOT NULL DEFAULT 'author',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
        "#,
    },
    Migration {
        version: 2,
        name: "create_sessions",
        up: r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id VARCHAR(64) PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                expires_at TIMESTAMP NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
        "#,
    },
    Migration {
        version: 3,
        name: "create_posts",
        up: r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug VARCHAR(255) NOT NULL UNIQUE,
                title VARCHAR(255) NOT NULL,
                date DATE NOT NULL,
                author VARCHAR(100) NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                category VARCHAR(100) NOT NULL DEFAULT '',
                excerpt TEXT NOT NULL DEFAULT '',
                cover_image VARCHAR(255),
                content TEXT NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'draft',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_posts_slug ON posts(slug);
            CREATE INDEX IF NOT EXISTS idx_posts_status_date ON posts(status, date DESC);
        "#,
    },
];

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    create_migrations_table(pool).await?;

    let applied = applied_versions(pool).await?;

    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }

        tracing::info!(
            "Applying migration {} ({})",
            migration.version,
            migration.name
        );

        // SQLite executes one statement per call, so split on semicolons
        for statement in migration.up.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement).execute(pool).await.with_context(|| {
                format!(
                    "Migration {} ({}) failed on statement: {}",
                    migration.version, migration.name, statement
                )
            })?;
        }

        sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to record migration {}", migration.version))?;
    }

    Ok(())
}

async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;
    Ok(())
}

async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;
    Ok(rows.iter().map(|row| row.get::<i64, _>("version")).collect())
}
