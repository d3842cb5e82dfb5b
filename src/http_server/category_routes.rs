//! Category HTTP Routes

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};

use crate::blog::category::Category;
use crate::blog::service::{CreateCategoryRequest, PostSummary, UpdateCategoryRequest};

use super::{blog_error, request_context, ApiError, ApiState};

/// Category routes with shared state
pub fn category_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route(
            "/categories",
            get(list_categories_handler).post(create_category_handler),
        )
        .route(
            "/categories/:slug",
            get(get_category_handler)
                .put(update_category_handler)
                .delete(delete_category_handler),
        )
        .route("/categories/:slug/posts", get(posts_by_category_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

/// List all categories
async fn list_categories_handler(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.blog.list_categories().map_err(blog_error)?;
    Ok(Json(categories))
}

/// Create a category (authors only)
async fn create_category_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let ctx = request_context(&state, &headers)?;
    let category = state
        .blog
        .create_category(&ctx, request)
        .map_err(blog_error)?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Get a category by slug
async fn get_category_handler(
    State(state): State<Arc<ApiState>>,
    Path(slug): Path<String>,
) -> Result<Json<Category>, ApiError> {
    let category = state.blog.get_category(&slug).map_err(blog_error)?;
    Ok(Json(category))
}

/// Update a category (authors only)
async fn update_category_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let ctx = request_context(&state, &headers)?;
    let category = state
        .blog
        .update_category(&ctx, &slug, request)
        .map_err(blog_error)?;
    Ok(Json(category))
}

/// Delete a category (admin only)
async fn delete_category_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    let ctx = request_context(&state, &headers)?;
    state
        .blog
        .delete_category(&ctx, &slug)
        .map_err(blog_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Published posts in a category
async fn posts_by_category_handler(
    State(state): State<Arc<ApiState>>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<PostSummary>>, ApiError> {
    let posts = state.blog.posts_by_category(&slug).map_err(blog_error)?;
    Ok(Json(posts))
}
