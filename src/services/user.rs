//! User and session service
//!
//! Authentication for the single-owner admin surface:
//! - Registration is open only while the user table is empty; the first
//!   user becomes the admin and registration closes.
//! - Login verifies the argon2 hash and mints a random session token
//!   with a server-side expiry.
//! - Session validation resolves a token to its user and purges the
//!   session the moment it is found expired.

use anyhow::Context;
use std::sync::Arc;

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{Session, User, UserRole};
use crate::services::password::{hash_password, verify_password};

/// Minimum password length accepted at registration
const MIN_PASSWORD_LENGTH: usize = 8;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Bad credentials or invalid session
    #[error("Authentication failed")]
    AuthenticationError,

    /// Registration attempted after the owner account exists
    #[error("Registration is closed")]
    RegistrationClosed,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service handling registration, login and session lifecycle
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_days: i64,
}

impl UserService {
    /// Create a new user service
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_days,
        }
    }

    /// Session lifetime in days, as configured
    pub fn session_days(&self) -> i64 {
        self.session_days
    }

    /// Whether the owner account has been created yet
    pub async fn registration_open(&self) -> Result<bool, UserServiceError> {
        let count = self
            .user_repo
            .count()
            .await
            .context("Failed to count users")?;
        Ok(count == 0)
    }

    /// Register the owner account.
    ///
    /// Only allowed while no user exists; the created user is the admin.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
    ) -> Result<User, UserServiceError> {
        let username = username.trim().to_lowercase();
        if username.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(UserServiceError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        if !self.registration_open().await? {
            return Err(UserServiceError::RegistrationClosed);
        }

        let display_name = match display_name.trim() {
            "" => username.clone(),
            name => name.to_string(),
        };

        let password_hash = hash_password(password)?;
        let user = User::new(username, password_hash, display_name, UserRole::Admin);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        tracing::info!("Owner account created: {}", created.username);
        Ok(created)
    }

    /// Verify credentials and mint a new session.
    ///
    /// Unknown usernames and wrong passwords fail identically so the
    /// response does not leak which usernames exist.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(User, Session), UserServiceError> {
        let username = username.trim().to_lowercase();

        let user = self
            .user_repo
            .get_by_username(&username)
            .await
            .context("Failed to look up user")?
            .ok_or(UserServiceError::AuthenticationError)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(UserServiceError::AuthenticationError);
        }

        let session = self
            .session_repo
            .create(&Session::mint(user.id, self.session_days))
            .await
            .context("Failed to create session")?;

        Ok((user, session))
    }

    /// Resolve a session token to its user.
    ///
    /// Returns `None` for unknown tokens; expired sessions are deleted on
    /// sight and also resolve to `None`.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to look up session")?
        {
            Some(session) => session,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.session_repo
                .delete(&session.id)
                .await
                .context("Failed to delete expired session")?;
            return Ok(None);
        }

        self.user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to look up session user")
            .map_err(Into::into)
    }

    /// Invalidate a session token (logout). Unknown tokens are a no-op.
    pub async fn logout(&self, token: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")
            .map_err(Into::into)
    }

    /// Invalidate every session belonging to a user
    pub async fn logout_all(&self, user_id: i64) -> Result<(), UserServiceError> {
        self.session_repo
            .delete_by_user(user_id)
            .await
            .context("Failed to delete user sessions")
            .map_err(Into::into)
    }

    /// Purge expired sessions, returning the number removed
    pub async fn purge_expired_sessions(&self) -> Result<i64, UserServiceError> {
        self.session_repo
            .delete_expired()
            .await
            .context("Failed to purge expired sessions")
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> UserService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
            7,
        )
    }

    #[tokio::test]
    async fn test_first_registration_creates_admin_and_closes() {
        let service = setup().await;
        assert!(service.registration_open().await.unwrap());

        let owner = service
            .register("Alex", "s3cret-passphrase", "Alexandre")
            .await
            .unwrap();
        assert_eq!(owner.username, "alex");
        assert!(owner.is_admin());
        assert!(!service.registration_open().await.unwrap());

        let err = service
            .register("intruder", "another-passphrase", "")
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::RegistrationClosed));
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let service = setup().await;
        let err = service.register("alex", "short", "").await.unwrap_err();
        assert!(matches!(err, UserServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_login_and_validate_session() {
        let service = setup().await;
        service
            .register("alex", "s3cret-passphrase", "Alexandre")
            .await
            .unwrap();

        let (user, session) = service.login("alex", "s3cret-passphrase").await.unwrap();
        assert_eq!(user.username, "alex");
        assert!(!session.is_expired());

        let resolved = service
            .validate_session(&session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = setup().await;
        service
            .register("alex", "s3cret-passphrase", "")
            .await
            .unwrap();

        let wrong_password = service.login("alex", "wrong").await.unwrap_err();
        let unknown_user = service.login("nobody", "whatever").await.unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_expired_session_is_purged_on_validation() {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let session_repo = SqlxSessionRepository::boxed(pool.clone());
        let service = UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            session_repo.clone(),
            7,
        );

        let user = service
            .register("alex", "s3cret-passphrase", "")
            .await
            .unwrap();

        let stale = Session::mint(user.id, -1);
        session_repo.create(&stale).await.unwrap();

        assert!(service.validate_session(&stale.id).await.unwrap().is_none());
        // The expired row is gone, not just rejected
        assert!(session_repo.get_by_id(&stale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let service = setup().await;
        service
            .register("alex", "s3cret-passphrase", "")
            .await
            .unwrap();
        let (_, session) = service.login("alex", "s3cret-passphrase").await.unwrap();

        service.logout(&session.id).await.unwrap();
        assert!(service
            .validate_session(&session.id)
            .await
            .unwrap()
            .is_none());

        // Logging out an unknown token is a no-op
        service.logout("unknown-token").await.unwrap();
    }
}
