//! User HTTP Routes
//!
//! Public profile listings plus profile management for the caller.

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::errors::AuthError;
use crate::auth::user::UpdateProfileRequest;
use crate::blog::service::AuthorStats;

use super::auth_routes::UserResponse;
use super::{auth_error, blog_error, require_context, ApiError, ApiState};

/// User routes with shared state
pub fn user_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(list_users_handler))
        .route("/authors", get(list_authors_handler))
        .route("/profile", get(get_profile_handler).put(update_profile_handler))
        .route("/change-password", post(change_password_handler))
        .route("/stats", get(user_stats_handler))
        .route("/:id", get(get_user_handler))
        .with_state(state)
}

// ==================
// Request Types
// ==================

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

// ==================
// Handlers
// ==================

/// List all active users (public profiles)
async fn list_users_handler(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.auth.list_users().map_err(auth_error)?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// List all users with an authoring role
async fn list_authors_handler(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let authors = state.auth.list_authors().map_err(auth_error)?;
    Ok(Json(authors.iter().map(UserResponse::from).collect()))
}

/// Get a user by ID
async fn get_user_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth.get_user(id).map_err(auth_error)?;
    if !user.is_active {
        return Err(auth_error(AuthError::InvalidCredentials));
    }
    Ok(Json(UserResponse::from(&user)))
}

/// The caller's own profile
async fn get_profile_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let ctx = require_context(&state, &headers)?;
    let user_id = ctx.require_user_id().map_err(auth_error)?;
    let user = state.auth.get_user(user_id).map_err(auth_error)?;

    Ok(Json(UserResponse::from(&user)))
}

/// Update the caller's bio or avatar
async fn update_profile_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let ctx = require_context(&state, &headers)?;
    let user_id = ctx.require_user_id().map_err(auth_error)?;
    let user = state
        .auth
        .update_profile(user_id, request)
        .map_err(auth_error)?;

    Ok(Json(UserResponse::from(&user)))
}

/// Change the caller's password
async fn change_password_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let ctx = require_context(&state, &headers)?;
    let user_id = ctx.require_user_id().map_err(auth_error)?;

    state
        .auth
        .change_password(user_id, &request.old_password, &request.new_password)
        .map_err(auth_error)?;

    Ok(Json(serde_json::json!({
        "message": "Password changed successfully"
    })))
}

/// The caller's authoring statistics
async fn user_stats_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<AuthorStats>, ApiError> {
    let ctx = require_context(&state, &headers)?;
    let user_id = ctx.require_user_id().map_err(auth_error)?;
    let stats = state.blog.author_stats(user_id).map_err(blog_error)?;

    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_routes_build() {
        let state = Arc::new(ApiState::new(&AppConfig::default()));
        let _router = user_routes(state);
    }
}
