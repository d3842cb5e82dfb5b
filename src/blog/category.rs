//! # Categories
//!
//! Category model and repository.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{BlogError, BlogResult};

/// Category model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Sequence ID assigned by the store
    pub id: u64,

    /// Display name (unique)
    pub name: String,

    /// URL-safe identifier derived from the name
    pub slug: String,

    /// What belongs in this category
    pub description: String,

    /// When the category was created
    pub created_at: DateTime<Utc>,
}

/// Category repository trait
pub trait CategoryRepository: Send + Sync {
    /// Store a new category, assigning its ID. Rejects duplicate names
    /// and slugs.
    fn create(&self, category: Category) -> BlogResult<Category>;

    /// All categories, by name
    fn all(&self) -> BlogResult<Vec<Category>>;

    /// Find a category by ID
    fn find_by_id(&self, id: u64) -> BlogResult<Option<Category>>;

    /// Find a category by slug
    fn find_by_slug(&self, slug: &str) -> BlogResult<Option<Category>>;

    /// Update an existing category
    fn update(&self, category: &Category) -> BlogResult<()>;

    /// Delete a category
    fn delete(&self, id: u64) -> BlogResult<()>;
}

/// In-memory category repository
#[derive(Debug)]
pub struct InMemoryCategoryRepository {
    categories: std::sync::RwLock<Vec<Category>>,
    next_id: AtomicU64,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self {
            categories: std::sync::RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryCategoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryRepository for InMemoryCategoryRepository {
    fn create(&self, mut category: Category) -> BlogResult<Category> {
        let mut categories = self
            .categories
            .write()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;

        if categories
            .iter()
            .any(|c| c.name == category.name || c.slug == category.slug)
        {
            return Err(BlogError::DuplicateCategory(category.name));
        }

        category.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        categories.push(category.clone());
        Ok(category)
    }

    fn all(&self) -> BlogResult<Vec<Category>> {
        let categories = self
            .categories
            .read()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;
        let mut out: Vec<Category> = categories.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    fn find_by_id(&self, id: u64) -> BlogResult<Option<Category>> {
        let categories = self
            .categories
            .read()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;
        Ok(categories.iter().find(|c| c.id == id).cloned())
    }

    fn find_by_slug(&self, slug: &str) -> BlogResult<Option<Category>> {
        let categories = self
            .categories
            .read()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;
        Ok(categories.iter().find(|c| c.slug == slug).cloned())
    }

    fn update(&self, category: &Category) -> BlogResult<()> {
        let mut categories = self
            .categories
            .write()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;

        if let Some(existing) = categories.iter_mut().find(|c| c.id == category.id) {
            *existing = category.clone();
            Ok(())
        } else {
            Err(BlogError::CategoryNotFound)
        }
    }

    fn delete(&self, id: u64) -> BlogResult<()> {
        let mut categories = self
            .categories
            .write()
            .map_err(|_| BlogError::StorageError("Lock poisoned".to_string()))?;

        let len_before = categories.len();
        categories.retain(|c| c.id != id);

        if categories.len() == len_before {
            Err(BlogError::CategoryNotFound)
        } else {
            Ok(())
        }
    }
}
