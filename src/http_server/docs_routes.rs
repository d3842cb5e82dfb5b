//! API Documentation Routes
//!
//! A JSON description of the API surface, served at the root and under
//! /api/docs.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

/// Documentation routes (stateless)
pub fn docs_routes() -> Router {
    Router::new()
        .route("/", get(api_documentation_handler))
        .route("/api/docs", get(api_documentation_handler))
}

/// Describe the whole API surface
async fn api_documentation_handler() -> Json<Value> {
    Json(json!({
        "title": "QuillBase API",
        "description": "REST API for a blogging platform with user management and real-time features",
        "endpoints": {
            "Authentication": {
                "POST /api/auth/signup": "Register new user",
                "POST /api/auth/login": "Login (get JWT tokens)",
                "POST /api/auth/refresh": "Rotate refresh token",
                "POST /api/auth/logout": "Invalidate session",
                "GET /api/auth/user": "Current account",
            },
            "Users": {
                "GET /api/users/": "List all users",
                "GET /api/users/{id}": "Get user by ID",
                "GET /api/users/authors": "List all authors",
                "GET /api/users/profile": "Get current user profile",
                "PUT /api/users/profile": "Update bio/avatar",
                "POST /api/users/change-password": "Change password",
                "GET /api/users/stats": "Current user's statistics",
            },
            "Blog Posts": {
                "GET /api/blog/posts": "List posts (filters: status, category, author, search, ordering)",
                "POST /api/blog/posts": "Create new post (authors only)",
                "GET /api/blog/posts/{slug}": "Get post by slug",
                "PUT /api/blog/posts/{slug}": "Update post (owner/admin only)",
                "DELETE /api/blog/posts/{slug}": "Delete post (owner/admin only)",
                "POST /api/blog/posts/{id}/publish": "Publish a draft",
                "POST /api/blog/posts/{id}/archive": "Archive a published post",
                "GET /api/blog/my-posts": "Current user's posts",
                "GET /api/blog/my-drafts": "Current user's drafts",
                "GET /api/blog/authors/{id}/posts": "An author's published posts",
                "GET /api/blog/search?q=": "Search published posts",
                "GET /api/blog/featured": "Published posts with a featured image",
                "GET /api/blog/trending": "Most-viewed published posts",
                "GET /api/blog/stats": "Site-wide counters",
            },
            "Categories": {
                "GET /api/blog/categories": "List categories",
                "POST /api/blog/categories": "Create category (authors only)",
                "GET /api/blog/categories/{slug}": "Get category",
                "PUT /api/blog/categories/{slug}": "Update category (authors only)",
                "DELETE /api/blog/categories/{slug}": "Delete category (admin only)",
                "GET /api/blog/categories/{slug}/posts": "Published posts in a category",
            },
            "Comments": {
                "GET /api/blog/posts/{id}/comments": "Approved comments on a post",
                "POST /api/blog/posts/{id}/comments": "Add comment (authenticated)",
                "GET /api/blog/comments/{id}": "Get comment",
                "PUT /api/blog/comments/{id}": "Edit comment (owner only)",
                "DELETE /api/blog/comments/{id}": "Delete comment (owner/admin)",
            },
        },
        "authentication": {
            "type": "JWT Bearer Token",
            "header": "Authorization: Bearer <token>",
            "note": "Get tokens from /api/auth/login",
        },
        "permissions": {
            "Public": "No authentication required",
            "Authenticated": "Valid JWT token required",
            "Author": "User must have 'author' or 'admin' role",
            "Owner": "User must be the owner of the resource",
        },
        "websocket_endpoints": {
            "/ws/blog": "Global feed: post_created and post_published events",
            "/ws/blog/post/{id}": "Per-post feed: comment_added events",
        },
        "websocket_message_shape": {
            "type": "post_created | post_published | comment_added",
            "data": "snapshot of the relevant record fields",
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_build() {
        let _router = docs_routes();
    }
}
