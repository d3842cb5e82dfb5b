//! Comment HTTP Routes
//!
//! Per-post comment listing and creation, plus direct comment CRUD.
//! The per-post routes share the `:post` segment with the post routes
//! and parse the numeric ID themselves.

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};

use crate::blog::errors::BlogError;
use crate::blog::service::{CommentView, CreateCommentRequest, UpdateCommentRequest};

use super::{blog_error, request_context, ApiError, ApiState};

/// Comment routes with shared state
pub fn comment_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route(
            "/posts/:post/comments",
            get(list_comments_handler).post(create_comment_handler),
        )
        .route(
            "/comments/:id",
            get(get_comment_handler)
                .put(update_comment_handler)
                .delete(delete_comment_handler),
        )
        .with_state(state)
}

fn parse_post_id(param: &str) -> Result<u64, ApiError> {
    param
        .parse::<u64>()
        .map_err(|_| blog_error(BlogError::PostNotFound))
}

// ==================
// Handlers
// ==================

/// Approved comments on a post
async fn list_comments_handler(
    State(state): State<Arc<ApiState>>,
    Path(param): Path<String>,
) -> Result<Json<Vec<CommentView>>, ApiError> {
    let post_id = parse_post_id(&param)?;
    let comments = state
        .blog
        .comments_for_post(post_id)
        .map_err(blog_error)?;
    Ok(Json(comments))
}

/// Add a comment (authenticated)
async fn create_comment_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(param): Path<String>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentView>), ApiError> {
    let ctx = request_context(&state, &headers)?;
    let post_id = parse_post_id(&param)?;
    let comment = state
        .blog
        .add_comment(&ctx, post_id, request)
        .map_err(blog_error)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Get a comment by ID
async fn get_comment_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<u64>,
) -> Result<Json<CommentView>, ApiError> {
    let comment = state.blog.get_comment(id).map_err(blog_error)?;
    Ok(Json(comment))
}

/// Edit a comment (owner only)
async fn update_comment_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<CommentView>, ApiError> {
    let ctx = request_context(&state, &headers)?;
    let comment = state
        .blog
        .update_comment(&ctx, id, request)
        .map_err(blog_error)?;
    Ok(Json(comment))
}

/// Delete a comment (owner or admin)
async fn delete_comment_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let ctx = request_context(&state, &headers)?;
    state.blog.delete_comment(&ctx, id).map_err(blog_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_routes_build() {
        let state = Arc::new(ApiState::new(&AppConfig::default()));
        let _router = comment_routes(state);
    }
}
