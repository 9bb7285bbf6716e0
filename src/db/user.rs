//! User model for Depot.
//!
//! Users are the principals of the system: every file record is owned by a
//! user and share grants name users. The credential check is a plaintext
//! comparison carried over from the prototype this service replaces.

/// User entity representing a registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login username (unique).
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last login timestamp (optional).
    pub last_login: Option<String>,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

impl NewUser {
    /// Create a new user.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}
