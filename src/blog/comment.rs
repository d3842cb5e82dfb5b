//! # Comments
//!
//! Comment model and repository.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{BlogError, BlogResult};

/// Comment model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Sequence ID assigned by the store
    pub id: u64,

    /// The post this comment belongs to
    pub post_id: u64,

    /// Comment author's user ID
    pub author_id: Uuid,

    /// Comment body
    pub content: String,

    /// Moderation flag; unapproved comments are hidden from listings
    pub is_approved: bool,

    /// When the comment was created
    pub created_at: DateTime<Utc>,

    /// When the comment was last updated
    pub updated_at: DateTime<Utc>,
}

/// Comment repository trait
pub trait CommentRepository: Send + Sync {
    /// Store a new comment, assigning its ID
    fn create(&self, comment: Comment) -> BlogResult<Comment>;

    /// All comments
    fn all(&self) -> BlogResult<Vec<Comment>>;

    /// Find a comment by ID
    fn find_by_id(&self, id: u64) -> BlogResult<Option<Comment>>;

    /// Comments on a post, oldest first
    fn find_by_post(&self, post_id: u64) -> BlogResult<Vec<Comment>>;

    /// Update an existing comment
    fn update(&self, comment: &Comment) -> BlogResult<()>;

    /// Delete a comment
    fn delete(&self, id: u64) -> BlogResult<()>;

    /// Delete every comment on a post (cascades from post deletion)
    fn delete_by_post(&self, post_id: u64) -> BlogResult<usize>;
}

/// In-memory comment repository
#[derive(Debug)]
pub struct InMemoryCommentRepository {
    comments: std::sync::RwLock<Vec<Comment>>,
    next_id: AtomicU64,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self {
            comments: std::sync::RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryCommentRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentRepository for InMemoryCommentRepository {
    fn create(&self, mut comment: Comment) -> BlogResult<Comment> {
        let mut comments = self
            .comments
            .write()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;

        comment.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        comments.push(comment.clone());
        Ok(comment)
    }

    fn all(&self) -> BlogResult<Vec<Comment>> {
        let comments = self
            .comments
            .read()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;
        Ok(comments.clone())
    }

    fn find_by_id(&self, id: u64) -> BlogResult<Option<Comment>> {
        let comments = self
            .comments
            .read()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;
        Ok(comments.iter().find(|c| c.id == id).cloned())
    }

    fn find_by_post(&self, post_id: u64) -> BlogResult<Vec<Comment>> {
        let comments = self
            .comments
            .read()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;
        let mut out: Vec<Comment> = comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(out)
    }

    fn update(&self, comment: &Comment) -> BlogResult<()> {
        let mut comments = self
            .comments
            .write()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;

        if let Some(existing) = comments.iter_mut().find(|c| c.id == comment.id) {
            *existing = comment.clone();
            Ok(())
        } else {
            Err(BlogError::CommentNotFound)
        }
    }

    fn delete(&self, id: u64) -> BlogResult<()> {
        let mut comments = self
            .comments
            .write()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;

        let len_before = comments.len();
        comments.retain(|c| c.id != id);

        if comments.len() == len_before {
            Err(BlogError::CommentNotFound)
        } else {
            Ok(())
        }
    }

    fn delete_by_post(&self, post_id: u64) -> BlogResult<usize> {
        let mut comments = self
            .comments
            .write()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;

        let len_before = comments.len();
        comments.retain(|c| c.post_id != post_id);
        Ok(len_before - comments.len())
    }
}
