//! # Blog Service
//!
//! Content operations over the post, category, and comment repositories:
//! visibility rules, ownership checks, status transitions, and derived
//! fields. Writes that commit with published-facing effects hand a
//! snapshot event to the publisher; event delivery can never fail the
//! originating call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::access::AccessContext;
use crate::auth::user::{Role, User, UserRepository};
use crate::realtime::EventPublisher;

use super::category::{Category, CategoryRepository};
use super::comment::{Comment, CommentRepository};
use super::errors::{BlogError, BlogResult};
use super::post::{Post, PostRepository, PostStatus};
use super::slug::slugify;

/// How many posts the trending feed returns
const TRENDING_LIMIT: usize = 10;

// ==================
// Requests
// ==================

/// Create a post
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

/// Partial post update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

/// Create a category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial category update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Create a comment
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// Update a comment
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// Post listing filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostQuery {
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub category: Option<u64>,
    #[serde(default)]
    pub author: Option<Uuid>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub ordering: Option<String>,
}

// ==================
// Views
// ==================

/// Public author fields embedded in content responses
#[derive(Debug, Clone, Serialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub bio: String,
    pub avatar_url: String,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            bio: user.bio.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Full post projection
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub author: AuthorSummary,
    pub status: PostStatus,
    pub category_id: Option<u64>,
    pub featured_image: String,
    pub tags: String,
    pub tag_list: Vec<String>,
    pub views_count: u64,
    pub reading_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Listing post projection (no body)
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub author: AuthorSummary,
    pub status: PostStatus,
    pub category_id: Option<u64>,
    pub featured_image: String,
    pub tag_list: Vec<String>,
    pub views_count: u64,
    pub reading_time: String,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// An author's public profile with their published posts
#[derive(Debug, Clone, Serialize)]
pub struct AuthorPosts {
    pub author: AuthorSummary,
    pub posts: Vec<PostSummary>,
}

/// Comment projection
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: u64,
    pub post_id: u64,
    pub author: AuthorSummary,
    pub content: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Site-wide counters
#[derive(Debug, Clone, Serialize)]
pub struct BlogStats {
    pub total_posts: u64,
    pub published_posts: u64,
    pub draft_posts: u64,
    pub total_views: u64,
    pub total_comments: u64,
    pub total_categories: u64,
}

/// One author's counters
#[derive(Debug, Clone, Serialize)]
pub struct AuthorStats {
    pub total_posts: u64,
    pub published_posts: u64,
    pub draft_posts: u64,
    pub total_views: u64,
    pub total_comments: u64,
    pub role: Role,
}

/// Estimated reading time at ~200 words per minute
fn reading_time(content: &str) -> String {
    let words = content.split_whitespace().count();
    let minutes = ((words as f64) / 200.0).round().max(1.0) as u64;
    format!("{} min read", minutes)
}

// ==================
// Service
// ==================

/// Content service over the blog repositories
pub struct BlogService<
    P: PostRepository,
    C: CategoryRepository,
    M: CommentRepository,
    U: UserRepository,
> {
    posts: P,
    categories: C,
    comments: M,
    users: Arc<U>,
    events: EventPublisher,
}

impl<P: PostRepository, C: CategoryRepository, M: CommentRepository, U: UserRepository>
    BlogService<P, C, M, U>
{
    pub fn new(posts: P, categories: C, comments: M, users: Arc<U>, events: EventPublisher) -> Self {
        Self {
            posts,
            categories,
            comments,
            users,
            events,
        }
    }

    // ==================
    // Internal helpers
    // ==================

    fn user_by_id(&self, id: Uuid) -> BlogResult<User> {
        self.users
            .find_by_id(id)
            .map_err(|e| BlogError::StorageError(e.to_string()))?
            .ok_or(BlogError::AuthorNotFound)
    }

    /// Caller must be authenticated
    fn require_user(&self, ctx: &AccessContext) -> BlogResult<User> {
        let user_id = ctx.user_id.ok_or(BlogError::AuthenticationRequired)?;
        self.user_by_id(user_id)
    }

    /// Caller must be authenticated with an authoring role
    fn require_author(&self, ctx: &AccessContext) -> BlogResult<User> {
        let user = self.require_user(ctx)?;
        if !user.is_author() {
            return Err(BlogError::AuthorRoleRequired);
        }
        Ok(user)
    }

    fn post_view(&self, post: &Post) -> BlogResult<PostView> {
        let author = self.user_by_id(post.author_id)?;
        Ok(PostView {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: post.content.clone(),
            excerpt: post.excerpt.clone(),
            author: AuthorSummary::from(&author),
            status: post.status,
            category_id: post.category_id,
            featured_image: post.featured_image.clone(),
            tags: post.tags.clone(),
            tag_list: post.tag_list(),
            views_count: post.views_count,
            reading_time: reading_time(&post.content),
            created_at: post.created_at,
            updated_at: post.updated_at,
            published_at: post.published_at,
        })
    }

    fn post_summary(&self, post: &Post) -> BlogResult<PostSummary> {
        let author = self.user_by_id(post.author_id)?;
        Ok(PostSummary {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            author: AuthorSummary::from(&author),
            status: post.status,
            category_id: post.category_id,
            featured_image: post.featured_image.clone(),
            tag_list: post.tag_list(),
            views_count: post.views_count,
            reading_time: reading_time(&post.content),
            created_at: post.created_at,
            published_at: post.published_at,
        })
    }

    fn post_summaries(&self, posts: &[Post]) -> BlogResult<Vec<PostSummary>> {
        posts.iter().map(|p| self.post_summary(p)).collect()
    }

    fn comment_view(&self, comment: &Comment) -> BlogResult<CommentView> {
        let author = self.user_by_id(comment.author_id)?;
        Ok(CommentView {
            id: comment.id,
            post_id: comment.post_id,
            author: AuthorSummary::from(&author),
            content: comment.content.clone(),
            is_approved: comment.is_approved,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        })
    }

    fn matches_search(post: &Post, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        post.title.to_lowercase().contains(&needle)
            || post.content.to_lowercase().contains(&needle)
            || post.tags.to_lowercase().contains(&needle)
    }

    fn apply_ordering(posts: &mut [Post], ordering: Option<&str>) {
        match ordering.unwrap_or("-created_at") {
            "created_at" => posts.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            "updated_at" => posts.sort_by(|a, b| a.updated_at.cmp(&b.updated_at)),
            "-updated_at" => posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
            "views_count" => posts.sort_by(|a, b| a.views_count.cmp(&b.views_count)),
            "-views_count" => posts.sort_by(|a, b| b.views_count.cmp(&a.views_count)),
            // Unknown orderings fall back to newest first
            _ => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }

    // ==================
    // Posts
    // ==================

    /// List posts. Anonymous callers and readers see published posts
    /// only; authors and admins see everything.
    pub fn list_posts(&self, ctx: &AccessContext, query: &PostQuery) -> BlogResult<Vec<PostSummary>> {
        let mut posts = self.posts.all()?;

        if !ctx.is_author() {
            posts.retain(|p| p.status == PostStatus::Published);
        } else if let Some(status) = query.status {
            posts.retain(|p| p.status == status);
        }

        if let Some(category_id) = query.category {
            posts.retain(|p| p.category_id == Some(category_id));
        }
        if let Some(author_id) = query.author {
            posts.retain(|p| p.author_id == author_id);
        }
        if let Some(ref needle) = query.search {
            posts.retain(|p| Self::matches_search(p, needle));
        }

        Self::apply_ordering(&mut posts, query.ordering.as_deref());

        self.post_summaries(&posts)
    }

    /// Create a post. Requires an authoring role. A post created with
    /// published status gets `published_at` stamped and a `post_created`
    /// event broadcast after the write commits.
    pub fn create_post(
        &self,
        ctx: &AccessContext,
        request: CreatePostRequest,
    ) -> BlogResult<PostView> {
        let author = self.require_author(ctx)?;

        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(BlogError::ValidationFailed("title is required".to_string()));
        }
        if title.chars().count() > 200 {
            return Err(BlogError::ValidationFailed(
                "title must be at most 200 characters".to_string(),
            ));
        }
        if request.content.trim().is_empty() {
            return Err(BlogError::ValidationFailed(
                "content is required".to_string(),
            ));
        }

        let slug = slugify(&title);
        if slug.is_empty() {
            return Err(BlogError::ValidationFailed(
                "title must contain at least one alphanumeric character".to_string(),
            ));
        }

        if let Some(category_id) = request.category_id {
            if self.categories.find_by_id(category_id)?.is_none() {
                return Err(BlogError::CategoryNotFound);
            }
        }

        let excerpt = match request.excerpt {
            Some(excerpt) if !excerpt.trim().is_empty() => excerpt,
            _ => Post::derive_excerpt(&request.content),
        };

        let status = request.status.unwrap_or_default();
        let now = Utc::now();

        let post = Post {
            id: 0,
            title,
            slug,
            content: request.content,
            excerpt,
            author_id: author.id,
            status,
            category_id: request.category_id,
            featured_image: request.featured_image.unwrap_or_default(),
            tags: request.tags.unwrap_or_default(),
            views_count: 0,
            created_at: now,
            updated_at: now,
            published_at: (status == PostStatus::Published).then_some(now),
        };

        let post = self.posts.create(post)?;

        if post.status == PostStatus::Published {
            self.events
                .post_created(post.id, &post.title, &author.username, post.created_at);
        }

        self.post_view(&post)
    }

    /// Fetch a post by slug and count the view. Drafts and archived
    /// posts are only visible to their owner or an admin.
    pub fn get_post_by_slug(&self, ctx: &AccessContext, slug: &str) -> BlogResult<PostView> {
        let mut post = self
            .posts
            .find_by_slug(slug)?
            .ok_or(BlogError::PostNotFound)?;

        if post.status != PostStatus::Published && !ctx.can_manage(post.author_id) {
            return Err(BlogError::PostNotFound);
        }

        post.views_count += 1;
        self.posts.update(&post)?;

        self.post_view(&post)
    }

    /// Update a post. Owner or admin only. A status change to published
    /// stamps `published_at` if it was never set.
    pub fn update_post(
        &self,
        ctx: &AccessContext,
        slug: &str,
        request: UpdatePostRequest,
    ) -> BlogResult<PostView> {
        let mut post = self
            .posts
            .find_by_slug(slug)?
            .ok_or(BlogError::PostNotFound)?;

        if !ctx.can_manage(post.author_id) {
            return Err(BlogError::NotOwner);
        }

        if let Some(title) = request.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(BlogError::ValidationFailed("title is required".to_string()));
            }
            // The slug stays stable so existing links keep working
            post.title = title;
        }
        if let Some(content) = request.content {
            post.content = content;
        }
        if let Some(excerpt) = request.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(category_id) = request.category_id {
            if self.categories.find_by_id(category_id)?.is_none() {
                return Err(BlogError::CategoryNotFound);
            }
            post.category_id = Some(category_id);
        }
        if let Some(featured_image) = request.featured_image {
            post.featured_image = featured_image;
        }
        if let Some(tags) = request.tags {
            post.tags = tags;
        }
        if let Some(status) = request.status {
            post.status = status;
            if status == PostStatus::Published && post.published_at.is_none() {
                post.published_at = Some(Utc::now());
            }
        }

        post.updated_at = Utc::now();
        self.posts.update(&post)?;

        self.post_view(&post)
    }

    /// Delete a post and its comments. Owner or admin only.
    pub fn delete_post(&self, ctx: &AccessContext, slug: &str) -> BlogResult<()> {
        let post = self
            .posts
            .find_by_slug(slug)?
            .ok_or(BlogError::PostNotFound)?;

        if !ctx.can_manage(post.author_id) {
            return Err(BlogError::NotOwner);
        }

        self.comments.delete_by_post(post.id)?;
        self.posts.delete(post.id)
    }

    /// Publish a draft. Only the post's own author sees the post here;
    /// anyone else gets a 404 rather than a hint the draft exists. A
    /// `post_published` event is broadcast after the write commits.
    pub fn publish_post(&self, ctx: &AccessContext, id: u64) -> BlogResult<PostView> {
        let user = self.require_user(ctx)?;

        let mut post = self.posts.find_by_id(id)?.ok_or(BlogError::PostNotFound)?;
        if post.author_id != user.id {
            return Err(BlogError::PostNotFound);
        }

        if post.status != PostStatus::Draft {
            return Err(BlogError::NotADraft);
        }

        let now = Utc::now();
        post.status = PostStatus::Published;
        post.published_at = Some(now);
        post.updated_at = now;
        self.posts.update(&post)?;

        self.events
            .post_published(post.id, &post.title, &user.username, now);

        self.post_view(&post)
    }

    /// Archive a published post. Author only, mirroring publish.
    pub fn archive_post(&self, ctx: &AccessContext, id: u64) -> BlogResult<PostView> {
        let user = self.require_user(ctx)?;

        let mut post = self.posts.find_by_id(id)?.ok_or(BlogError::PostNotFound)?;
        if post.author_id != user.id {
            return Err(BlogError::PostNotFound);
        }

        if post.status != PostStatus::Published {
            return Err(BlogError::NotPublished);
        }

        post.status = PostStatus::Archived;
        post.updated_at = Utc::now();
        self.posts.update(&post)?;

        self.post_view(&post)
    }

    /// All of the caller's posts, any status
    pub fn my_posts(&self, ctx: &AccessContext) -> BlogResult<Vec<PostSummary>> {
        let user = self.require_user(ctx)?;
        let mut posts = self.posts.all()?;
        posts.retain(|p| p.author_id == user.id);
        self.post_summaries(&posts)
    }

    /// The caller's drafts
    pub fn my_drafts(&self, ctx: &AccessContext) -> BlogResult<Vec<PostSummary>> {
        let user = self.require_user(ctx)?;
        let mut posts = self.posts.all()?;
        posts.retain(|p| p.author_id == user.id && p.status == PostStatus::Draft);
        self.post_summaries(&posts)
    }

    /// An author's public profile with their published posts
    pub fn posts_by_author(&self, author_id: Uuid) -> BlogResult<AuthorPosts> {
        let author = self.user_by_id(author_id)?;

        let mut posts = self.posts.all()?;
        posts.retain(|p| p.author_id == author_id && p.status == PostStatus::Published);

        Ok(AuthorPosts {
            author: AuthorSummary::from(&author),
            posts: self.post_summaries(&posts)?,
        })
    }

    /// Published posts matching a search phrase in title, body, or tags
    pub fn search_posts(&self, q: &str) -> BlogResult<Vec<PostSummary>> {
        let mut posts = self.posts.all()?;
        posts.retain(|p| p.status == PostStatus::Published && Self::matches_search(p, q));
        self.post_summaries(&posts)
    }

    /// Published posts carrying a featured image
    pub fn featured_posts(&self) -> BlogResult<Vec<PostSummary>> {
        let mut posts = self.posts.all()?;
        posts.retain(|p| p.status == PostStatus::Published && !p.featured_image.is_empty());
        self.post_summaries(&posts)
    }

    /// Most-viewed published posts
    pub fn trending_posts(&self) -> BlogResult<Vec<PostSummary>> {
        let mut posts = self.posts.all()?;
        posts.retain(|p| p.status == PostStatus::Published);
        posts.sort_by(|a, b| b.views_count.cmp(&a.views_count));
        posts.truncate(TRENDING_LIMIT);
        self.post_summaries(&posts)
    }

    /// Site-wide counters
    pub fn blog_stats(&self) -> BlogResult<BlogStats> {
        let posts = self.posts.all()?;
        let comments = self.comments.all()?;
        let categories = self.categories.all()?;

        Ok(BlogStats {
            total_posts: posts.len() as u64,
            published_posts: posts
                .iter()
                .filter(|p| p.status == PostStatus::Published)
                .count() as u64,
            draft_posts: posts
                .iter()
                .filter(|p| p.status == PostStatus::Draft)
                .count() as u64,
            total_views: posts.iter().map(|p| p.views_count).sum(),
            total_comments: comments.iter().filter(|c| c.is_approved).count() as u64,
            total_categories: categories.len() as u64,
        })
    }

    /// One author's counters
    pub fn author_stats(&self, user_id: Uuid) -> BlogResult<AuthorStats> {
        let user = self.user_by_id(user_id)?;

        let posts = self.posts.all()?;
        let own: Vec<&Post> = posts.iter().filter(|p| p.author_id == user_id).collect();

        let mut total_comments = 0u64;
        for post in &own {
            total_comments += self
                .comments
                .find_by_post(post.id)?
                .iter()
                .filter(|c| c.is_approved)
                .count() as u64;
        }

        Ok(AuthorStats {
            total_posts: own.len() as u64,
            published_posts: own
                .iter()
                .filter(|p| p.status == PostStatus::Published)
                .count() as u64,
            draft_posts: own
                .iter()
                .filter(|p| p.status == PostStatus::Draft)
                .count() as u64,
            total_views: own.iter().map(|p| p.views_count).sum(),
            total_comments,
            role: user.role,
        })
    }

    // ==================
    // Categories
    // ==================

    /// All categories
    pub fn list_categories(&self) -> BlogResult<Vec<Category>> {
        self.categories.all()
    }

    /// Create a category. Requires an authoring role.
    pub fn create_category(
        &self,
        ctx: &AccessContext,
        request: CreateCategoryRequest,
    ) -> BlogResult<Category> {
        self.require_author(ctx)?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(BlogError::ValidationFailed("name is required".to_string()));
        }

        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(BlogError::ValidationFailed(
                "name must contain at least one alphanumeric character".to_string(),
            ));
        }

        self.categories.create(Category {
            id: 0,
            name,
            slug,
            description: request.description.unwrap_or_default(),
            created_at: Utc::now(),
        })
    }

    /// Fetch a category by slug
    pub fn get_category(&self, slug: &str) -> BlogResult<Category> {
        self.categories
            .find_by_slug(slug)?
            .ok_or(BlogError::CategoryNotFound)
    }

    /// Update a category. Requires an authoring role. The slug stays
    /// stable even when the name changes.
    pub fn update_category(
        &self,
        ctx: &AccessContext,
        slug: &str,
        request: UpdateCategoryRequest,
    ) -> BlogResult<Category> {
        self.require_author(ctx)?;

        let mut category = self.get_category(slug)?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(BlogError::ValidationFailed("name is required".to_string()));
            }
            category.name = name;
        }
        if let Some(description) = request.description {
            category.description = description;
        }

        self.categories.update(&category)?;
        Ok(category)
    }

    /// Delete a category. Admin only; posts in it are detached, not
    /// deleted.
    pub fn delete_category(&self, ctx: &AccessContext, slug: &str) -> BlogResult<()> {
        if ctx.user_id.is_none() {
            return Err(BlogError::AuthenticationRequired);
        }
        if !ctx.is_admin() {
            return Err(BlogError::NotOwner);
        }

        let category = self.get_category(slug)?;

        for mut post in self.posts.all()? {
            if post.category_id == Some(category.id) {
                post.category_id = None;
                self.posts.update(&post)?;
            }
        }

        self.categories.delete(category.id)
    }

    /// Published posts in a category
    pub fn posts_by_category(&self, slug: &str) -> BlogResult<Vec<PostSummary>> {
        let category = self.get_category(slug)?;

        let mut posts = self.posts.all()?;
        posts.retain(|p| {
            p.category_id == Some(category.id) && p.status == PostStatus::Published
        });
        self.post_summaries(&posts)
    }

    // ==================
    // Comments
    // ==================

    /// Approved comments on a post, oldest first
    pub fn comments_for_post(&self, post_id: u64) -> BlogResult<Vec<CommentView>> {
        if self.posts.find_by_id(post_id)?.is_none() {
            return Err(BlogError::PostNotFound);
        }

        self.comments
            .find_by_post(post_id)?
            .iter()
            .filter(|c| c.is_approved)
            .map(|c| self.comment_view(c))
            .collect()
    }

    /// Add a comment to a visible post. Any authenticated user may
    /// comment. A `comment_added` event is broadcast on the post's topic
    /// after the write commits.
    pub fn add_comment(
        &self,
        ctx: &AccessContext,
        post_id: u64,
        request: CreateCommentRequest,
    ) -> BlogResult<CommentView> {
        let user = self.require_user(ctx)?;

        let post = self
            .posts
            .find_by_id(post_id)?
            .ok_or(BlogError::PostNotFound)?;
        if post.status != PostStatus::Published && !ctx.can_manage(post.author_id) {
            return Err(BlogError::PostNotFound);
        }

        if request.content.trim().is_empty() {
            return Err(BlogError::ValidationFailed(
                "content is required".to_string(),
            ));
        }

        let now = Utc::now();
        let comment = self.comments.create(Comment {
            id: 0,
            post_id,
            author_id: user.id,
            content: request.content,
            is_approved: true,
            created_at: now,
            updated_at: now,
        })?;

        self.events.comment_added(
            comment.id,
            comment.post_id,
            &user.username,
            &comment.content,
            comment.created_at,
        );

        self.comment_view(&comment)
    }

    /// Fetch a single comment
    pub fn get_comment(&self, id: u64) -> BlogResult<CommentView> {
        let comment = self
            .comments
            .find_by_id(id)?
            .ok_or(BlogError::CommentNotFound)?;
        self.comment_view(&comment)
    }

    /// Edit a comment. Owner only.
    pub fn update_comment(
        &self,
        ctx: &AccessContext,
        id: u64,
        request: UpdateCommentRequest,
    ) -> BlogResult<CommentView> {
        let user = self.require_user(ctx)?;

        let mut comment = self
            .comments
            .find_by_id(id)?
            .ok_or(BlogError::CommentNotFound)?;

        if comment.author_id != user.id {
            return Err(BlogError::NotOwner);
        }

        if request.content.trim().is_empty() {
            return Err(BlogError::ValidationFailed(
                "content is required".to_string(),
            ));
        }

        comment.content = request.content;
        comment.updated_at = Utc::now();
        self.comments.update(&comment)?;

        self.comment_view(&comment)
    }

    /// Delete a comment. Owner or admin.
    pub fn delete_comment(&self, ctx: &AccessContext, id: u64) -> BlogResult<()> {
        let user = self.require_user(ctx)?;

        let comment = self
            .comments
            .find_by_id(id)?
            .ok_or(BlogError::CommentNotFound)?;

        if comment.author_id != user.id && !user.is_admin() {
            return Err(BlogError::NotOwner);
        }

        self.comments.delete(comment.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::crypto::PasswordPolicy;
    use crate::auth::user::InMemoryUserRepository;
    use crate::blog::category::InMemoryCategoryRepository;
    use crate::blog::comment::InMemoryCommentRepository;
    use crate::blog::post::InMemoryPostRepository;
    use crate::realtime::BroadcastRegistry;

    type TestService = BlogService<
        InMemoryPostRepository,
        InMemoryCategoryRepository,
        InMemoryCommentRepository,
        InMemoryUserRepository,
    >;

    fn test_service() -> (TestService, Arc<InMemoryUserRepository>) {
        let users = Arc::new(InMemoryUserRepository::new());
        let registry = Arc::new(BroadcastRegistry::default());
        let service = BlogService::new(
            InMemoryPostRepository::new(),
            InMemoryCategoryRepository::new(),
            InMemoryCommentRepository::new(),
            Arc::clone(&users),
            EventPublisher::new(registry),
        );
        (service, users)
    }

    fn make_user(users: &InMemoryUserRepository, username: &str, role: Role) -> User {
        let user = User::new(
            username.to_string(),
            format!("{}@example.com", username),
            "password123",
            role,
            &PasswordPolicy::default(),
        )
        .unwrap();
        users.create(&user).unwrap();
        user
    }

    fn create_request(title: &str, status: PostStatus) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            content: "Some body text".to_string(),
            excerpt: None,
            status: Some(status),
            category_id: None,
            featured_image: None,
            tags: None,
        }
    }

    #[test]
    fn test_create_post_derives_slug_and_excerpt() {
        let (service, users) = test_service();
        let author = make_user(&users, "alice", Role::Author);
        let ctx = AccessContext::authenticated(&author);

        let view = service
            .create_post(&ctx, create_request("Hello World!", PostStatus::Draft))
            .unwrap();

        assert_eq!(view.slug, "hello-world");
        assert_eq!(view.excerpt, "Some body text");
        assert_eq!(view.status, PostStatus::Draft);
        assert!(view.published_at.is_none());
        assert_eq!(view.author.username, "alice");
    }

    #[test]
    fn test_reader_cannot_create_posts() {
        let (service, users) = test_service();
        let reader = make_user(&users, "bob", Role::Reader);
        let ctx = AccessContext::authenticated(&reader);

        let result = service.create_post(&ctx, create_request("Nope", PostStatus::Draft));
        assert!(matches!(result, Err(BlogError::AuthorRoleRequired)));
    }

    #[test]
    fn test_published_create_stamps_published_at() {
        let (service, users) = test_service();
        let author = make_user(&users, "alice", Role::Author);
        let ctx = AccessContext::authenticated(&author);

        let view = service
            .create_post(&ctx, create_request("Live", PostStatus::Published))
            .unwrap();

        assert!(view.published_at.is_some());
    }

    #[test]
    fn test_anonymous_listing_hides_drafts() {
        let (service, users) = test_service();
        let author = make_user(&users, "alice", Role::Author);
        let ctx = AccessContext::authenticated(&author);

        service
            .create_post(&ctx, create_request("Draft", PostStatus::Draft))
            .unwrap();
        service
            .create_post(&ctx, create_request("Live", PostStatus::Published))
            .unwrap();

        let visible = service
            .list_posts(&AccessContext::anonymous(), &PostQuery::default())
            .unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Live");

        // The author sees both
        let own_view = service.list_posts(&ctx, &PostQuery::default()).unwrap();
        assert_eq!(own_view.len(), 2);
    }

    #[test]
    fn test_get_post_counts_views() {
        let (service, users) = test_service();
        let author = make_user(&users, "alice", Role::Author);
        let ctx = AccessContext::authenticated(&author);

        service
            .create_post(&ctx, create_request("Live", PostStatus::Published))
            .unwrap();

        let anon = AccessContext::anonymous();
        assert_eq!(service.get_post_by_slug(&anon, "live").unwrap().views_count, 1);
        assert_eq!(service.get_post_by_slug(&anon, "live").unwrap().views_count, 2);
    }

    #[test]
    fn test_draft_hidden_from_strangers() {
        let (service, users) = test_service();
        let author = make_user(&users, "alice", Role::Author);
        let other = make_user(&users, "carol", Role::Author);
        let ctx = AccessContext::authenticated(&author);

        service
            .create_post(&ctx, create_request("Secret", PostStatus::Draft))
            .unwrap();

        let result =
            service.get_post_by_slug(&AccessContext::authenticated(&other), "secret");
        assert!(matches!(result, Err(BlogError::PostNotFound)));

        // The owner can read it
        assert!(service.get_post_by_slug(&ctx, "secret").is_ok());
    }

    #[test]
    fn test_publish_requires_draft() {
        let (service, users) = test_service();
        let author = make_user(&users, "alice", Role::Author);
        let ctx = AccessContext::authenticated(&author);

        let view = service
            .create_post(&ctx, create_request("Live", PostStatus::Published))
            .unwrap();

        let result = service.publish_post(&ctx, view.id);
        assert!(matches!(result, Err(BlogError::NotADraft)));
    }

    #[test]
    fn test_publish_hides_other_authors_drafts() {
        let (service, users) = test_service();
        let author = make_user(&users, "alice", Role::Author);
        let other = make_user(&users, "carol", Role::Author);
        let ctx = AccessContext::authenticated(&author);

        let view = service
            .create_post(&ctx, create_request("Draft", PostStatus::Draft))
            .unwrap();

        let result = service.publish_post(&AccessContext::authenticated(&other), view.id);
        assert!(matches!(result, Err(BlogError::PostNotFound)));
    }

    #[test]
    fn test_archive_transition() {
        let (service, users) = test_service();
        let author = make_user(&users, "alice", Role::Author);
        let ctx = AccessContext::authenticated(&author);

        let draft = service
            .create_post(&ctx, create_request("Draft", PostStatus::Draft))
            .unwrap();
        assert!(matches!(
            service.archive_post(&ctx, draft.id),
            Err(BlogError::NotPublished)
        ));

        let live = service
            .create_post(&ctx, create_request("Live", PostStatus::Published))
            .unwrap();
        let archived = service.archive_post(&ctx, live.id).unwrap();
        assert_eq!(archived.status, PostStatus::Archived);
    }

    #[test]
    fn test_update_post_permission() {
        let (service, users) = test_service();
        let author = make_user(&users, "alice", Role::Author);
        let stranger = make_user(&users, "carol", Role::Author);
        let admin = make_user(&users, "root", Role::Admin);
        let ctx = AccessContext::authenticated(&author);

        service
            .create_post(&ctx, create_request("Mine", PostStatus::Published))
            .unwrap();

        let update = UpdatePostRequest {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };

        let result = service.update_post(
            &AccessContext::authenticated(&stranger),
            "mine",
            update.clone(),
        );
        assert!(matches!(result, Err(BlogError::NotOwner)));

        // Admins may edit anything; the slug survives a rename
        let view = service
            .update_post(&AccessContext::authenticated(&admin), "mine", update)
            .unwrap();
        assert_eq!(view.title, "Renamed");
        assert_eq!(view.slug, "mine");
    }

    #[test]
    fn test_delete_post_cascades_comments() {
        let (service, users) = test_service();
        let author = make_user(&users, "alice", Role::Author);
        let reader = make_user(&users, "bob", Role::Reader);
        let ctx = AccessContext::authenticated(&author);

        let view = service
            .create_post(&ctx, create_request("Live", PostStatus::Published))
            .unwrap();
        service
            .add_comment(
                &AccessContext::authenticated(&reader),
                view.id,
                CreateCommentRequest {
                    content: "First!".to_string(),
                },
            )
            .unwrap();

        service.delete_post(&ctx, "live").unwrap();
        assert!(matches!(
            service.comments_for_post(view.id),
            Err(BlogError::PostNotFound)
        ));
    }

    #[test]
    fn test_search_and_trending() {
        let (service, users) = test_service();
        let author = make_user(&users, "alice", Role::Author);
        let ctx = AccessContext::authenticated(&author);

        let mut rust_post = create_request("Learning Rust", PostStatus::Published);
        rust_post.tags = Some("rust, systems".to_string());
        service.create_post(&ctx, rust_post).unwrap();
        service
            .create_post(&ctx, create_request("Gardening", PostStatus::Published))
            .unwrap();

        let hits = service.search_posts("rust").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Learning Rust");

        // Trending ranks by views
        let anon = AccessContext::anonymous();
        service.get_post_by_slug(&anon, "gardening").unwrap();
        service.get_post_by_slug(&anon, "gardening").unwrap();
        let trending = service.trending_posts().unwrap();
        assert_eq!(trending[0].title, "Gardening");
    }

    #[test]
    fn test_category_lifecycle() {
        let (service, users) = test_service();
        let author = make_user(&users, "alice", Role::Author);
        let admin = make_user(&users, "root", Role::Admin);
        let ctx = AccessContext::authenticated(&author);

        let category = service
            .create_category(
                &ctx,
                CreateCategoryRequest {
                    name: "Technology".to_string(),
                    description: Some("Tech posts".to_string()),
                },
            )
            .unwrap();
        assert_eq!(category.slug, "technology");

        let mut post = create_request("Tech post", PostStatus::Published);
        post.category_id = Some(category.id);
        service.create_post(&ctx, post).unwrap();

        assert_eq!(service.posts_by_category("technology").unwrap().len(), 1);

        // Only admins delete; posts are detached
        assert!(matches!(
            service.delete_category(&ctx, "technology"),
            Err(BlogError::NotOwner)
        ));
        service
            .delete_category(&AccessContext::authenticated(&admin), "technology")
            .unwrap();

        let posts = service
            .list_posts(&AccessContext::anonymous(), &PostQuery::default())
            .unwrap();
        assert_eq!(posts[0].category_id, None);
    }

    #[test]
    fn test_comment_flow() {
        let (service, users) = test_service();
        let author = make_user(&users, "alice", Role::Author);
        let reader = make_user(&users, "bob", Role::Reader);
        let author_ctx = AccessContext::authenticated(&author);
        let reader_ctx = AccessContext::authenticated(&reader);

        let post = service
            .create_post(&author_ctx, create_request("Live", PostStatus::Published))
            .unwrap();

        // Anonymous cannot comment
        let result = service.add_comment(
            &AccessContext::anonymous(),
            post.id,
            CreateCommentRequest {
                content: "hi".to_string(),
            },
        );
        assert!(matches!(result, Err(BlogError::AuthenticationRequired)));

        let comment = service
            .add_comment(
                &reader_ctx,
                post.id,
                CreateCommentRequest {
                    content: "First!".to_string(),
                },
            )
            .unwrap();
        assert_eq!(comment.author.username, "bob");

        assert_eq!(service.comments_for_post(post.id).unwrap().len(), 1);

        // Only the owner edits
        let result = service.update_comment(
            &author_ctx,
            comment.id,
            UpdateCommentRequest {
                content: "edited".to_string(),
            },
        );
        assert!(matches!(result, Err(BlogError::NotOwner)));

        // Owner or admin deletes
        service.delete_comment(&reader_ctx, comment.id).unwrap();
        assert!(service.comments_for_post(post.id).unwrap().is_empty());
    }

    #[test]
    fn test_stats() {
        let (service, users) = test_service();
        let author = make_user(&users, "alice", Role::Author);
        let ctx = AccessContext::authenticated(&author);

        service
            .create_post(&ctx, create_request("Live", PostStatus::Published))
            .unwrap();
        service
            .create_post(&ctx, create_request("Draft", PostStatus::Draft))
            .unwrap();

        let stats = service.blog_stats().unwrap();
        assert_eq!(stats.total_posts, 2);
        assert_eq!(stats.published_posts, 1);
        assert_eq!(stats.draft_posts, 1);

        let author_stats = service.author_stats(author.id).unwrap();
        assert_eq!(author_stats.total_posts, 2);
        assert_eq!(author_stats.role, Role::Author);
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time("a few words"), "1 min read");

        let long = "word ".repeat(600);
        assert_eq!(reading_time(&long), "3 min read");
    }
}
