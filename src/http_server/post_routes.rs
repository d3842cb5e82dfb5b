//! Post HTTP Routes
//!
//! Listing, CRUD, publish/archive transitions, per-author views, and
//! discovery endpoints (search, featured, trending, stats).
//!
//! Detail routes address posts by slug; the publish/archive actions
//! address them by numeric ID, so the shared `:post` segment is parsed
//! per handler.

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::blog::errors::BlogError;
use crate::blog::service::{
    AuthorPosts, BlogStats, CreatePostRequest, PostQuery, PostSummary, PostView,
    UpdatePostRequest,
};

use super::{blog_error, request_context, ApiError, ApiState};

/// Post routes with shared state
pub fn post_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/posts", get(list_posts_handler).post(create_post_handler))
        .route(
            "/posts/:post",
            get(get_post_handler)
                .put(update_post_handler)
                .delete(delete_post_handler),
        )
        .route("/posts/:post/publish", post(publish_post_handler))
        .route("/posts/:post/archive", post(archive_post_handler))
        .route("/my-posts", get(my_posts_handler))
        .route("/my-drafts", get(my_drafts_handler))
        .route("/authors/:author_id/posts", get(posts_by_author_handler))
        .route("/search", get(search_posts_handler))
        .route("/featured", get(featured_posts_handler))
        .route("/trending", get(trending_posts_handler))
        .route("/stats", get(blog_stats_handler))
        .with_state(state)
}

/// Numeric-ID actions share the `:post` segment with the slug routes
fn parse_post_id(param: &str) -> Result<u64, ApiError> {
    param
        .parse::<u64>()
        .map_err(|_| blog_error(BlogError::PostNotFound))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

// ==================
// Handlers
// ==================

/// List posts with optional filters
async fn list_posts_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Query(query): Query<PostQuery>,
) -> Result<Json<Vec<PostSummary>>, ApiError> {
    let ctx = request_context(&state, &headers)?;
    let posts = state.blog.list_posts(&ctx, &query).map_err(blog_error)?;
    Ok(Json(posts))
}

/// Create a post (authors only)
async fn create_post_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostView>), ApiError> {
    let ctx = request_context(&state, &headers)?;
    let view = state.blog.create_post(&ctx, request).map_err(blog_error)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Get a post by slug (counts the view)
async fn get_post_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<Json<PostView>, ApiError> {
    let ctx = request_context(&state, &headers)?;
    let view = state
        .blog
        .get_post_by_slug(&ctx, &slug)
        .map_err(blog_error)?;
    Ok(Json(view))
}

/// Update a post (owner or admin)
async fn update_post_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<PostView>, ApiError> {
    let ctx = request_context(&state, &headers)?;
    let view = state
        .blog
        .update_post(&ctx, &slug, request)
        .map_err(blog_error)?;
    Ok(Json(view))
}

/// Delete a post (owner or admin)
async fn delete_post_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    let ctx = request_context(&state, &headers)?;
    state.blog.delete_post(&ctx, &slug).map_err(blog_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Publish a draft (author only)
async fn publish_post_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(param): Path<String>,
) -> Result<Json<PostView>, ApiError> {
    let ctx = request_context(&state, &headers)?;
    let id = parse_post_id(&param)?;
    let view = state.blog.publish_post(&ctx, id).map_err(blog_error)?;
    Ok(Json(view))
}

/// Archive a published post (author only)
async fn archive_post_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(param): Path<String>,
) -> Result<Json<PostView>, ApiError> {
    let ctx = request_context(&state, &headers)?;
    let id = parse_post_id(&param)?;
    let view = state.blog.archive_post(&ctx, id).map_err(blog_error)?;
    Ok(Json(view))
}

/// The caller's posts, any status
async fn my_posts_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<PostSummary>>, ApiError> {
    let ctx = request_context(&state, &headers)?;
    let posts = state.blog.my_posts(&ctx).map_err(blog_error)?;
    Ok(Json(posts))
}

/// The caller's drafts
async fn my_drafts_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<PostSummary>>, ApiError> {
    let ctx = request_context(&state, &headers)?;
    let posts = state.blog.my_drafts(&ctx).map_err(blog_error)?;
    Ok(Json(posts))
}

/// An author's public profile and published posts
async fn posts_by_author_handler(
    State(state): State<Arc<ApiState>>,
    Path(author_id): Path<Uuid>,
) -> Result<Json<AuthorPosts>, ApiError> {
    let author_posts = state.blog.posts_by_author(author_id).map_err(blog_error)?;
    Ok(Json(author_posts))
}

/// Search published posts
async fn search_posts_handler(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<PostSummary>>, ApiError> {
    let posts = state.blog.search_posts(&query.q).map_err(blog_error)?;
    Ok(Json(posts))
}

/// Published posts with a featured image
async fn featured_posts_handler(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<PostSummary>>, ApiError> {
    let posts = state.blog.featured_posts().map_err(blog_error)?;
    Ok(Json(posts))
}

/// Most-viewed published posts
async fn trending_posts_handler(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<PostSummary>>, ApiError> {
    let posts = state.blog.trending_posts().map_err(blog_error)?;
    Ok(Json(posts))
}

/// Site-wide counters
async fn blog_stats_handler(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<BlogStats>, ApiError> {
    let stats = state.blog.blog_stats().map_err(blog_error)?;
    Ok(Json(stats))
}
