//! # Posts
//!
//! The blog post model and repository.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{BlogError, BlogResult};

/// Publication state of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl Default for PostStatus {
    fn default() -> Self {
        PostStatus::Draft
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Blog post model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Sequence ID assigned by the store
    pub id: u64,

    /// Post title
    pub title: String,

    /// URL-safe identifier (unique, derived from the title when absent)
    pub slug: String,

    /// Full body text
    pub content: String,

    /// Short teaser; derived from content when not supplied
    pub excerpt: String,

    /// Author's user ID
    pub author_id: Uuid,

    /// Publication state
    pub status: PostStatus,

    /// Optional category
    pub category_id: Option<u64>,

    /// Header image URL (may be empty)
    pub featured_image: String,

    /// Comma-separated tags
    pub tags: String,

    /// Times the post detail was retrieved
    pub views_count: u64,

    /// When the post was created
    pub created_at: DateTime<Utc>,

    /// When the post was last updated
    pub updated_at: DateTime<Utc>,

    /// When the post went live (set on first publish)
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Tags as a trimmed list
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Derive a teaser from the body: the first 297 characters plus an
    /// ellipsis when the body exceeds 300.
    pub fn derive_excerpt(content: &str) -> String {
        if content.chars().count() > 300 {
            let mut excerpt: String = content.chars().take(297).collect();
            excerpt.push_str("...");
            excerpt
        } else {
            content.to_string()
        }
    }
}

/// Post repository trait
pub trait PostRepository: Send + Sync {
    /// Store a new post, assigning its ID. Rejects duplicate slugs.
    fn create(&self, post: Post) -> BlogResult<Post>;

    /// All posts, newest first
    fn all(&self) -> BlogResult<Vec<Post>>;

    /// Find a post by ID
    fn find_by_id(&self, id: u64) -> BlogResult<Option<Post>>;

    /// Find a post by slug
    fn find_by_slug(&self, slug: &str) -> BlogResult<Option<Post>>;

    /// Check whether a slug is taken
    fn slug_exists(&self, slug: &str) -> BlogResult<bool>;

    /// Update an existing post
    fn update(&self, post: &Post) -> BlogResult<()>;

    /// Delete a post
    fn delete(&self, id: u64) -> BlogResult<()>;
}

/// In-memory post repository
#[derive(Debug)]
pub struct InMemoryPostRepository {
    posts: std::sync::RwLock<Vec<Post>>,
    next_id: AtomicU64,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            posts: std::sync::RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl PostRepository for InMemoryPostRepository {
    fn create(&self, mut post: Post) -> BlogResult<Post> {
        let mut posts = self
            .posts
            .write()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;

        if posts.iter().any(|p| p.slug == post.slug) {
            return Err(BlogError::DuplicateSlug(post.slug));
        }

        post.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        posts.push(post.clone());
        Ok(post)
    }

    fn all(&self) -> BlogResult<Vec<Post>> {
        let posts = self
            .posts
            .read()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;
        let mut out: Vec<Post> = posts.clone();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    fn find_by_id(&self, id: u64) -> BlogResult<Option<Post>> {
        let posts = self
            .posts
            .read()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    fn find_by_slug(&self, slug: &str) -> BlogResult<Option<Post>> {
        let posts = self
            .posts
            .read()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;
        Ok(posts.iter().find(|p| p.slug == slug).cloned())
    }

    fn slug_exists(&self, slug: &str) -> BlogResult<bool> {
        let posts = self
            .posts
            .read()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;
        Ok(posts.iter().any(|p| p.slug == slug))
    }

    fn update(&self, post: &Post) -> BlogResult<()> {
        let mut posts = self
            .posts
            .write()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;

        if let Some(existing) = posts.iter_mut().find(|p| p.id == post.id) {
            *existing = post.clone();
            Ok(())
        } else {
            Err(BlogError::PostNotFound)
        }
    }

    fn delete(&self, id: u64) -> BlogResult<()> {
        let mut posts = self
            .posts
            .write()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;

        let len_before = posts.len();
        posts.retain(|p| p.id != id);

        if posts.len() == len_before {
            Err(BlogError::PostNotFound)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_post(slug: &str) -> Post {
        let now = Utc::now();
        Post {
            id: 0,
            title: "Title".to_string(),
            slug: slug.to_string(),
            content: "Body".to_string(),
            excerpt: "Body".to_string(),
            author_id: Uuid::new_v4(),
            status: PostStatus::Draft,
            category_id: None,
            featured_image: String::new(),
            tags: String::new(),
            views_count: 0,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    #[test]
    fn test_tag_list() {
        let mut post = test_post("a");
        post.tags = "rust, web , , backend".to_string();

        assert_eq!(post.tag_list(), vec!["rust", "web", "backend"]);
    }

    #[test]
    fn test_derive_excerpt_short_content() {
        assert_eq!(Post::derive_excerpt("short body"), "short body");
    }

    #[test]
    fn test_derive_excerpt_long_content() {
        let content = "x".repeat(400);
        let excerpt = Post::derive_excerpt(&content);

        assert_eq!(excerpt.chars().count(), 300);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_repository_assigns_sequential_ids() {
        let repo = InMemoryPostRepository::new();

        let first = repo.create(test_post("first")).unwrap();
        let second = repo.create(test_post("second")).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn test_repository_rejects_duplicate_slug() {
        let repo = InMemoryPostRepository::new();

        repo.create(test_post("taken")).unwrap();
        let result = repo.create(test_post("taken"));

        assert!(matches!(result, Err(BlogError::DuplicateSlug(_))));
    }

    #[test]
    fn test_repository_lookup_and_delete() {
        let repo = InMemoryPostRepository::new();

        let post = repo.create(test_post("hello")).unwrap();

        assert!(repo.find_by_id(post.id).unwrap().is_some());
        assert!(repo.find_by_slug("hello").unwrap().is_some());
        assert!(repo.slug_exists("hello").unwrap());

        repo.delete(post.id).unwrap();
        assert!(repo.find_by_id(post.id).unwrap().is_none());
        assert!(matches!(repo.delete(post.id), Err(BlogError::PostNotFound)));
    }
}
