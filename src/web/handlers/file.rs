//! File handlers for the Web API.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::header,
    response::Response,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::datetime::to_rfc3339;
use crate::db::UserRepository;
use crate::file::{FileRecord, FileService};
use crate::web::dto::{ApiResponse, FileResponse, ShareRequest, TransferRequest, UserInfo};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// Generate a safe Content-Disposition header value for file downloads.
///
/// This function sanitizes the filename to prevent header injection attacks
/// and uses RFC 5987 encoding for non-ASCII filenames.
///
/// # Security
///
/// The function:
/// - Removes control characters (including CR, LF which could cause header injection)
/// - Escapes double quotes and backslashes
/// - Uses RFC 5987 filename* parameter for proper Unicode support
fn content_disposition_header(filename: &str) -> String {
    // Sanitize filename for the basic filename parameter (ASCII fallback)
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control()) // Remove control characters (CR, LF, etc.)
        .map(|c| match c {
            '"' => '_',  // Replace double quotes
            '\\' => '_', // Replace backslashes
            _ => c,
        })
        .collect();

    // For ASCII-only filenames, use simple format
    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    // Use RFC 5987 encoding for non-ASCII or special characters
    // filename* parameter with UTF-8 encoding
    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// Resolve every username the given records refer to, with one query.
///
/// Covers each record's owner and sharees. IDs that no longer resolve are
/// simply absent from the map; a failed lookup propagates.
async fn resolve_usernames(
    state: &AppState,
    records: &[FileRecord],
) -> Result<HashMap<i64, String>, ApiError> {
    let mut ids: Vec<i64> = Vec::new();
    for record in records {
        ids.push(record.owner_id);
        ids.extend_from_slice(record.shared_to.ids());
    }
    ids.sort_unstable();
    ids.dedup();

    let user_repo = UserRepository::new(state.db.pool());
    let users = user_repo.get_by_ids(&ids).await?;

    Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
}

/// Build a file response from a record and the resolved username map.
fn file_response(
    record: FileRecord,
    viewer_id: i64,
    usernames: &HashMap<i64, String>,
) -> FileResponse {
    let owner = UserInfo {
        id: record.owner_id,
        username: usernames
            .get(&record.owner_id)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string()),
    };

    let shared_to = record
        .shared_to
        .ids()
        .iter()
        .filter_map(|id| usernames.get(id).cloned())
        .collect();

    FileResponse {
        is_owner: record.owner_id == viewer_id,
        id: record.id,
        filename: record.filename,
        size: record.size,
        file_type: record.file_type,
        owner,
        shared_to,
        created_at: to_rfc3339(&record.created_at),
        updated_at: to_rfc3339(&record.updated_at),
    }
}

/// GET /api/files - List all files visible to the current user.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let service = FileService::new(&state.db, &state.storage);
    let records = service.list_visible(claims.sub).await?;

    // One username lookup for the whole listing
    let usernames = resolve_usernames(&state, &records).await?;

    let responses = records
        .into_iter()
        .map(|record| file_response(record, claims.sub, &usernames))
        .collect();

    Ok(Json(ApiResponse::new(responses)))
}

/// POST /api/files - Upload a file.
///
/// Request body: multipart/form-data with a "file" field.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    // Extract file from multipart
    let mut filename: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            filename = field.file_name().map(|s| s.to_string());
            content = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to read file content: {}", e);
                        ApiError::bad_request("Failed to read file")
                    })?
                    .to_vec(),
            );
        }
    }

    let filename = filename.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let content = content.ok_or_else(|| ApiError::bad_request("No file content"))?;

    // Check file size
    if content.len() > state.max_upload_size {
        let max_mb = state.max_upload_size / 1024 / 1024;
        return Err(ApiError::bad_request(format!(
            "File too large (max {}MB)",
            max_mb
        )));
    }

    let service = FileService::new(&state.db, &state.storage);
    let record = service.upload(&content, &filename, claims.sub).await?;

    let usernames = resolve_usernames(&state, std::slice::from_ref(&record)).await?;
    let response = file_response(record, claims.sub, &usernames);
    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/files/:id - Get file metadata.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let service = FileService::new(&state.db, &state.storage);
    let record = service.get(&file_id, claims.sub).await?;

    let usernames = resolve_usernames(&state, std::slice::from_ref(&record)).await?;
    let response = file_response(record, claims.sub, &usernames);
    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/files/:id/download - Download a file.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Response<Body>, ApiError> {
    let service = FileService::new(&state.db, &state.storage);
    let (record, content) = service.download(&file_id, claims.sub).await?;

    // Determine content type from the original filename
    let content_type = mime_guess::from_path(&record.filename)
        .first_or_octet_stream()
        .to_string();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&record.filename),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}

/// PUT /api/files/:id/share - Replace the file's share set.
pub async fn share_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<String>,
    Json(req): Json<ShareRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let service = FileService::new(&state.db, &state.storage);
    let record = service.share(&file_id, claims.sub, &req.usernames).await?;

    let usernames = resolve_usernames(&state, std::slice::from_ref(&record)).await?;
    let response = file_response(record, claims.sub, &usernames);
    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/files/:id/transfer - Transfer ownership to another user.
pub async fn transfer_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<String>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    if req.username.trim().is_empty() {
        return Err(ApiError::bad_request("Username is required"));
    }

    let service = FileService::new(&state.db, &state.storage);
    let record = service.transfer(&file_id, claims.sub, &req.username).await?;

    let usernames = resolve_usernames(&state, std::slice::from_ref(&record)).await?;
    let response = file_response(record, claims.sub, &usernames);
    Ok(Json(ApiResponse::new(response)))
}

/// DELETE /api/files/:id - Delete a file.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let service = FileService::new(&state.db, &state.storage);
    service.delete(&file_id, claims.sub).await?;

    Ok(Json(ApiResponse::new(())))
}
