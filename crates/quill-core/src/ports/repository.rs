use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific lookups.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address (stored lowercase).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Batch lookup, used when expanding author references on post listings.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;

    /// All users, newest first.
    async fn list(&self) -> Result<Vec<User>, RepoError>;
}

/// Result of a like toggle: the acting user's new state and the new count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes: i64,
}

/// A tag value with its published-post usage count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

/// Post repository. Listings returning published posts are ordered by
/// publication time, newest first.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Published posts only.
    async fn list_published(&self) -> Result<Vec<Post>, RepoError>;

    /// Published posts referencing the category.
    async fn list_published_by_category(&self, category_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Published posts carrying the exact tag string.
    async fn list_published_by_tag(&self, tag: &str) -> Result<Vec<Post>, RepoError>;

    /// Every post regardless of status, newest first by creation.
    async fn list_all(&self) -> Result<Vec<Post>, RepoError>;

    /// Toggle `user_id`'s membership in the post's like set as a single
    /// atomic update: remove-if-present, add-if-absent. Concurrent toggles
    /// by the same user must never double-append.
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeOutcome, RepoError>;

    /// Atomically bump the view counter.
    async fn increment_views(&self, post_id: Uuid) -> Result<(), RepoError>;

    /// Distinct tags across published posts with usage counts, most used
    /// first.
    async fn list_tags(&self) -> Result<Vec<TagCount>, RepoError>;

    /// The `limit` most used tags across published posts.
    async fn popular_tags(&self, limit: u64) -> Result<Vec<TagCount>, RepoError>;

    /// Rename a tag across every post carrying it. Fails with
    /// `RepoError::NotFound` when no post carries `old`, and with
    /// `RepoError::Constraint` when `new` already exists on any post, in
    /// which case zero documents are modified. Returns the number of posts
    /// updated.
    async fn rename_tag(&self, old: &str, new: &str) -> Result<u64, RepoError>;

    /// Remove a tag from every post carrying it. Fails with
    /// `RepoError::NotFound` when no post carries it. Returns the number of
    /// posts updated.
    async fn remove_tag(&self, tag: &str) -> Result<u64, RepoError>;
}

/// A category joined with its derived aggregates: the published-post count
/// and the most recent publication among them.
#[derive(Debug, Clone)]
pub struct CategoryWithCount {
    pub category: Category,
    pub article_count: i64,
    pub latest_post_at: Option<DateTime<Utc>>,
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// Find a category by its slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// Find a category by its exact name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError>;

    /// Batch lookup, used when expanding category references on post
    /// listings.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError>;

    /// Every category with its derived aggregates, highest count first.
    /// Counts are recomputed per request, never stored.
    async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>, RepoError>;
}
