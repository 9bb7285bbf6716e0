//! Response DTOs for the Web API.

use serde::Serialize;

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// Auth DTOs
// ============================================================================

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Access token (JWT).
    pub access_token: String,
    /// Access token expiry in seconds.
    pub expires_in: u64,
    /// User information.
    pub user: UserInfo,
}

/// User information in responses.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
}

/// Current user response (for /api/auth/me).
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Number of files owned by this user.
    pub owned_file_count: u64,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last login timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

// ============================================================================
// File DTOs
// ============================================================================

/// File record response.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    /// File ID (also the stored blob name).
    pub id: String,
    /// Original filename.
    pub filename: String,
    /// File size in bytes.
    pub size: i64,
    /// File type (extension).
    pub file_type: String,
    /// Owner info.
    pub owner: UserInfo,
    /// Usernames the file is shared with.
    pub shared_to: Vec<String>,
    /// Whether the requesting user owns this file.
    pub is_owner: bool,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}
