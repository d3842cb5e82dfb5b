//! # QuillBase HTTP Server Module
//!
//! The axum server combining all endpoint routers.
//!
//! # Endpoints
//!
//! - `/health` - Liveness probe
//! - `/`, `/api/docs` - JSON API documentation
//! - `/api/auth/*` - Signup, login, token refresh, logout
//! - `/api/users/*` - Profiles and author listings
//! - `/api/blog/*` - Posts, categories, comments
//! - `/ws/*` - WebSocket feeds (global and per-post)

pub mod auth_routes;
pub mod category_routes;
pub mod comment_routes;
pub mod config;
pub mod docs_routes;
pub mod post_routes;
pub mod realtime_routes;
pub mod server;
pub mod state;
pub mod user_routes;

pub use config::HttpServerConfig;
pub use server::HttpServer;
pub use state::ApiState;

use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use crate::auth::access::AccessContext;
use crate::auth::errors::AuthError;
use crate::blog::errors::BlogError;

/// Error body shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

/// Error half of every handler's return type
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn auth_error(err: AuthError) -> ApiError {
    let code = err.status_code();
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code,
        }),
    )
}

pub(crate) fn blog_error(err: BlogError) -> ApiError {
    let code = err.status_code();
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code,
        }),
    )
}

/// Build the caller's identity from the Authorization header
///
/// No header means anonymous; a present but invalid token is a 401.
pub(crate) fn request_context(
    state: &ApiState,
    headers: &HeaderMap,
) -> Result<AccessContext, ApiError> {
    let header = headers.get("authorization").and_then(|v| v.to_str().ok());

    let Some(header) = header else {
        return Ok(AccessContext::anonymous());
    };

    let Some(token) = header.strip_prefix("Bearer ") else {
        return Err(auth_error(AuthError::MalformedToken));
    };

    state.auth.validate_access_token(token).map_err(auth_error)
}

/// Shorthand for handlers that require an authenticated caller
pub(crate) fn require_context(
    state: &ApiState,
    headers: &HeaderMap,
) -> Result<AccessContext, ApiError> {
    let ctx = request_context(state, headers)?;
    if !ctx.is_authenticated {
        return Err(auth_error(AuthError::AuthenticationRequired));
    }
    Ok(ctx)
}
