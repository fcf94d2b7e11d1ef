//! Session model
//!
//! Sessions are opaque bearer tokens with a server-side expiry. The token
//! doubles as the primary key, so logout is a single row delete and
//! nothing about the user leaks through the token itself.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated session, keyed by its token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session token (UUID v4)
    pub id: String,
    /// Owning user
    pub user_id: i64,
    /// Moment the token stops being accepted
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Mint a fresh session for a user with the given lifetime
    pub fn mint(user_id: i64, lifetime_days: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + Duration::days(lifetime_days),
            created_at: now,
        }
    }

    /// Whether the token is past its expiry
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_sets_lifetime_and_unique_tokens() {
        let a = Session::mint(1, 7);
        let b = Session::mint(1, 7);

        assert!(!a.is_expired());
        assert_eq!((a.expires_at - a.created_at).num_days(), 7);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_zero_lifetime_is_expired() {
        assert!(Session::mint(1, 0).is_expired());
    }
}
