//! Router configuration for the Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_file, download_file, get_file, list_files, login, me, register, share_file,
    transfer_file, upload_file, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

// Multipart framing overhead on top of the configured upload cap
const BODY_LIMIT_OVERHEAD: usize = 64 * 1024;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    // Auth routes (no authentication required)
    let auth_public_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    // Auth routes (authentication required)
    let auth_protected_routes = Router::new().route("/me", get(me));

    // Combine auth routes
    let auth_routes = Router::new()
        .merge(auth_public_routes)
        .merge(auth_protected_routes);

    // File routes (authentication enforced by the AuthUser extractor)
    let file_routes = Router::new()
        .route("/", get(list_files).post(upload_file))
        .route("/:id", get(get_file).delete(delete_file))
        .route("/:id/download", get(download_file))
        .route("/:id/share", put(share_file))
        .route("/:id/transfer", post(transfer_file));

    // API routes
    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/files", file_routes);

    let body_limit = app_state.max_upload_size + BODY_LIMIT_OVERHEAD;

    // Clone jwt_state for the middleware closure
    let jwt_state_for_middleware = jwt_state.clone();

    // Build the main router with middleware
    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
