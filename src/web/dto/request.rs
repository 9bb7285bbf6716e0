//! Request DTOs for the Web API.

use serde::Deserialize;

/// User registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Share replacement request.
///
/// The given usernames become the file's entire share set.
#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    /// Usernames to share the file with.
    pub usernames: Vec<String>,
}

/// Ownership transfer request.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Username of the new owner.
    pub username: String,
}
