//! Auth HTTP Routes
//!
//! Signup, login, token refresh, logout, and the current-user endpoint.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::user::{LoginRequest, Role, SignupRequest, User};

use super::{auth_error, require_context, ApiError, ApiState};

/// Auth routes with shared state
pub fn auth_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_handler))
        .route("/logout", post(logout_handler))
        .route("/user", get(get_user_handler))
        .with_state(state)
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub bio: String,
    pub avatar_url: String,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            bio: user.bio.clone(),
            avatar_url: user.avatar_url.clone(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

// ==================
// Handlers
// ==================

/// Register a new account
async fn signup_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (user, tokens) = state.auth.signup(request).map_err(auth_error)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserResponse::from(&user),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
        }),
    ))
}

/// Exchange credentials for tokens
async fn login_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (user, tokens) = state.auth.login(request).map_err(auth_error)?;

    Ok(Json(AuthResponse {
        user: UserResponse::from(&user),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
    }))
}

/// Rotate the refresh token
async fn refresh_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let tokens = state
        .auth
        .refresh(&request.refresh_token)
        .map_err(auth_error)?;

    Ok(Json(RefreshResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
    }))
}

/// Invalidate a session
async fn logout_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<LogoutRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .auth
        .logout(&request.refresh_token)
        .map_err(auth_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// The authenticated caller's account
async fn get_user_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let ctx = require_context(&state, &headers)?;
    let user_id = ctx.require_user_id().map_err(auth_error)?;
    let user = state.auth.get_user(user_id).map_err(auth_error)?;

    Ok(Json(UserResponse::from(&user)))
}
