//! Authentication handlers.

use axum::{extract::State, Json};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use crate::datetime::to_rfc3339;
use crate::db::{NewUser, UserRepository};
use crate::file::{FileRecordRepository, FileStorage};
use crate::web::dto::{
    ApiResponse, LoginRequest, LoginResponse, MeResponse, RegisterRequest, UserInfo,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, JwtClaims};
use crate::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Arc<Database>,
    /// Blob storage.
    pub storage: Arc<FileStorage>,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub access_token_expiry: u64,
    /// Maximum upload size in bytes.
    pub max_upload_size: usize,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Arc<Database>,
        storage: Arc<FileStorage>,
        jwt_secret: &str,
        access_token_expiry: u64,
        max_upload_size: usize,
    ) -> Self {
        Self {
            db,
            storage,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            access_token_expiry,
            max_upload_size,
        }
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user_id: i64, username: &str) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }
}

/// POST /api/auth/register - User registration.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    // Validate input
    if req.username.trim().is_empty() {
        return Err(ApiError::bad_request("Username is required"));
    }
    if req.password.is_empty() {
        return Err(ApiError::bad_request("Password is required"));
    }

    // Create user; the repository reports duplicates as a conflict
    let repo = UserRepository::new(state.db.pool());
    let user = repo.create(&NewUser::new(&req.username, &req.password)).await?;

    let access_token = state.generate_access_token(user.id, &user.username)?;

    let response = LoginResponse {
        access_token,
        expires_in: state.access_token_expiry,
        user: UserInfo {
            id: user.id,
            username: user.username,
        },
    };

    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/auth/login - User login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    // Validate input
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    // Get user from database
    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .get_by_username(&req.username)
        .await
        .map_err(|_| ApiError::unauthorized("Invalid username or password"))?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    // Plaintext credential check, kept as a placeholder
    if user.password != req.password {
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    // Update last login time
    let _ = repo.update_last_login(user.id).await;

    let access_token = state.generate_access_token(user.id, &user.username)?;

    let response = LoginResponse {
        access_token,
        expires_in: state.access_token_expiry,
        user: UserInfo {
            id: user.id,
            username: user.username,
        },
    };

    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/auth/me - Get current user info.
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    // Get user from database
    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .get_by_id(claims.sub)
        .await
        .map_err(|_| ApiError::internal("Database error"))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    // Get owned file count
    let file_repo = FileRecordRepository::new(state.db.pool());
    let owned_count = file_repo.count_by_owner(claims.sub).await.unwrap_or(0);

    let response = MeResponse {
        id: user.id,
        username: user.username,
        owned_file_count: owned_count as u64,
        created_at: to_rfc3339(&user.created_at),
        last_login_at: user.last_login.as_deref().map(to_rfc3339),
    };

    Ok(Json(ApiResponse::new(response)))
}
