//! User model
//!
//! The Vitrine admin surface is single-owner: the first registered user
//! becomes the admin and registration closes afterwards. Roles are kept as
//! an enum so the authorization middleware reads the same as in a
//! multi-user system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Password hash (argon2id, PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name shown as post author
    pub display_name: String,
    /// User role
    pub role: UserRole,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User. The password must already be hashed
    /// (`services::password::hash_password`).
    pub fn new(username: String, password_hash: String, display_name: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Set by the database
            username,
            password_hash,
            display_name,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// User role for authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator - full access to the admin surface
    Admin,
    /// Author - reserved for future multi-user setups
    #[default]
    Author,
}

impl UserRole {
    /// Convert role to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Author => "author",
        }
    }

    /// Parse role from database string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "author" => Some(UserRole::Author),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
