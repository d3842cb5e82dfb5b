//! # Blog Errors
//!
//! Error types for the content domain.

use thiserror::Error;

/// Result type for blog operations
pub type BlogResult<T> = Result<T, BlogError>;

/// Content domain errors
#[derive(Debug, Clone, Error)]
pub enum BlogError {
    // ==================
    // Lookup Errors
    // ==================
    /// Post not found (or not visible to the caller)
    #[error("Post not found")]
    PostNotFound,

    /// Category not found
    #[error("Category not found")]
    CategoryNotFound,

    /// Comment not found
    #[error("Comment not found")]
    CommentNotFound,

    /// Author not found
    #[error("Author not found")]
    AuthorNotFound,

    // ==================
    // Constraint Errors
    // ==================
    /// Slug already in use
    #[error("Slug already in use: {0}")]
    DuplicateSlug(String),

    /// Category name already in use
    #[error("Category already exists: {0}")]
    DuplicateCategory(String),

    /// Field failed validation
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    // ==================
    // Transition Errors
    // ==================
    /// Only drafts can be published
    #[error("Post is not a draft")]
    NotADraft,

    /// Only published posts can be archived
    #[error("Post is not published")]
    NotPublished,

    // ==================
    // Authorization Errors
    // ==================
    /// Caller must be authenticated
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Caller must have the author role
    #[error("Author role required")]
    AuthorRoleRequired,

    /// Caller is neither the owner nor an admin
    #[error("Not authorized to modify this resource")]
    NotOwner,

    // ==================
    // Internal Errors
    // ==================
    /// Storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl BlogError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            BlogError::ValidationFailed(_) => 400,
            BlogError::NotADraft => 400,
            BlogError::NotPublished => 400,

            // 401 Unauthorized
            BlogError::AuthenticationRequired => 401,

            // 403 Forbidden
            BlogError::AuthorRoleRequired => 403,
            BlogError::NotOwner => 403,

            // 404 Not Found
            BlogError::PostNotFound => 404,
            BlogError::CategoryNotFound => 404,
            BlogError::CommentNotFound => 404,
            BlogError::AuthorNotFound => 404,

            // 409 Conflict
            BlogError::DuplicateSlug(_) => 409,
            BlogError::DuplicateCategory(_) => 409,

            // 500 Internal Server Error
            BlogError::StorageError(_) => 500,
        }
    }
}
