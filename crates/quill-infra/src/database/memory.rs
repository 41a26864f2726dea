//! In-memory repository implementations.
//!
//! Used as the fallback when no database is configured and as the
//! substitutable fake in handler tests. Each repository serializes access
//! through a single async RwLock, so read-modify-write operations such as
//! the like toggle are atomic with respect to each other. Data is lost on
//! process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Category, Post, PostStatus, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CategoryRepository, CategoryWithCount, LikeOutcome, PostRepository, TagCount,
    UserRepository,
};

/// Shared post table, also consulted by the category repository for its
/// derived aggregates.
pub type PostStore = Arc<RwLock<HashMap<Uuid, Post>>>;

// --- Users ---

#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        let clash = store.values().any(|existing| {
            existing.id != user.id
                && (existing.email == user.email || existing.username == user.username)
        });
        if clash {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let email = email.to_lowercase();
        Ok(self
            .store
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let mut users: Vec<User> = self.store.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

// --- Posts ---

pub struct InMemoryPostRepository {
    store: PostStore,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Handle to the underlying table, for wiring the category repository.
    pub fn store(&self) -> PostStore {
        Arc::clone(&self.store)
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn published_sorted(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    posts
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        self.store.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list_published(&self) -> Result<Vec<Post>, RepoError> {
        let posts = self
            .store
            .read()
            .await
            .values()
            .filter(|post| post.status == PostStatus::Published)
            .cloned()
            .collect();
        Ok(published_sorted(posts))
    }

    async fn list_published_by_category(&self, category_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let posts = self
            .store
            .read()
            .await
            .values()
            .filter(|post| {
                post.status == PostStatus::Published && post.categories.contains(&category_id)
            })
            .cloned()
            .collect();
        Ok(published_sorted(posts))
    }

    async fn list_published_by_tag(&self, tag: &str) -> Result<Vec<Post>, RepoError> {
        let posts = self
            .store
            .read()
            .await
            .values()
            .filter(|post| {
                post.status == PostStatus::Published && post.tags.iter().any(|t| t == tag)
            })
            .cloned()
            .collect();
        Ok(published_sorted(posts))
    }

    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self.store.read().await.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeOutcome, RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&post_id).ok_or(RepoError::NotFound)?;

        let liked = post.toggle_like(user_id);
        Ok(LikeOutcome {
            liked,
            likes: post.meta.likes.len() as i64,
        })
    }

    async fn increment_views(&self, post_id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&post_id).ok_or(RepoError::NotFound)?;
        post.meta.views += 1;
        Ok(())
    }

    async fn list_tags(&self) -> Result<Vec<TagCount>, RepoError> {
        Ok(tag_counts(&*self.store.read().await, None))
    }

    async fn popular_tags(&self, limit: u64) -> Result<Vec<TagCount>, RepoError> {
        Ok(tag_counts(&*self.store.read().await, Some(limit as usize)))
    }

    async fn rename_tag(&self, old: &str, new: &str) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;

        if !store.values().any(|post| post.tags.iter().any(|t| t == old)) {
            return Err(RepoError::NotFound);
        }
        if store.values().any(|post| post.tags.iter().any(|t| t == new)) {
            return Err(RepoError::Constraint(format!("tag '{new}' already exists")));
        }

        let mut modified = 0;
        for post in store.values_mut() {
            let mut touched = false;
            for tag in post.tags.iter_mut() {
                if tag == old {
                    *tag = new.to_string();
                    touched = true;
                }
            }
            if touched {
                modified += 1;
            }
        }
        Ok(modified)
    }

    async fn remove_tag(&self, tag: &str) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;

        let mut modified = 0;
        for post in store.values_mut() {
            let before = post.tags.len();
            post.tags.retain(|t| t != tag);
            if post.tags.len() != before {
                modified += 1;
            }
        }

        if modified == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(modified)
    }
}

fn tag_counts(store: &HashMap<Uuid, Post>, limit: Option<usize>) -> Vec<TagCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for post in store.values() {
        if post.status != PostStatus::Published {
            continue;
        }
        for tag in &post.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }

    let mut out: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));

    if let Some(limit) = limit {
        out.truncate(limit);
    }
    out
}

// --- Categories ---

pub struct InMemoryCategoryRepository {
    store: RwLock<HashMap<Uuid, Category>>,
    posts: PostStore,
}

impl InMemoryCategoryRepository {
    /// The posts handle is consulted for the derived per-category
    /// aggregates, mirroring the SQL join of the Postgres adapter.
    pub fn new(posts: PostStore) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            posts,
        }
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, category: Category) -> Result<Category, RepoError> {
        let mut store = self.store.write().await;

        let clash = store.values().any(|existing| {
            existing.id != category.id
                && (existing.name == category.name || existing.slug == category.slug)
        });
        if clash {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        store.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .find(|category| category.slug == slug)
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .find(|category| category.name == name)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }

    async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>, RepoError> {
        let categories = self.store.read().await;
        let posts = self.posts.read().await;

        let mut out: Vec<CategoryWithCount> = categories
            .values()
            .map(|category| {
                let published = posts
                    .values()
                    .filter(|post| {
                        post.status == PostStatus::Published
                            && post.categories.contains(&category.id)
                    })
                    .collect::<Vec<_>>();

                CategoryWithCount {
                    category: category.clone(),
                    article_count: published.len() as i64,
                    latest_post_at: published.iter().filter_map(|p| p.published_at).max(),
                }
            })
            .collect();

        out.sort_by(|a, b| {
            b.article_count
                .cmp(&a.article_count)
                .then_with(|| a.category.name.cmp(&b.category.name))
        });
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::ports::PostRepository as _;

    fn post_with_tags(status: PostStatus, tags: &[&str]) -> Post {
        Post::new(
            Uuid::new_v4(),
            "A Title".into(),
            String::new(),
            "enough content to be a post".into(),
            vec![],
            tags.iter().map(|t| t.to_string()).collect(),
            status,
            String::new(),
        )
    }

    #[tokio::test]
    async fn like_toggle_round_trips() {
        let repo = InMemoryPostRepository::new();
        let post = repo.save(post_with_tags(PostStatus::Published, &[])).await.unwrap();
        let user = Uuid::new_v4();

        let first = repo.toggle_like(post.id, user).await.unwrap();
        assert_eq!(first, LikeOutcome { liked: true, likes: 1 });

        let second = repo.toggle_like(post.id, user).await.unwrap();
        assert_eq!(second, LikeOutcome { liked: false, likes: 0 });
    }

    #[tokio::test]
    async fn concurrent_toggles_never_double_append() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let post = repo.save(post_with_tags(PostStatus::Published, &[])).await.unwrap();
        let user = Uuid::new_v4();

        let a = tokio::spawn({
            let repo = Arc::clone(&repo);
            async move { repo.toggle_like(post.id, user).await }
        });
        let b = tokio::spawn({
            let repo = Arc::clone(&repo);
            async move { repo.toggle_like(post.id, user).await }
        });
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let stored = repo.find_by_id(post.id).await.unwrap().unwrap();
        let occurrences = stored.meta.likes.iter().filter(|id| **id == user).count();
        assert!(occurrences <= 1, "duplicate like entries: {occurrences}");
    }

    #[tokio::test]
    async fn rename_tag_conflict_modifies_nothing() {
        let repo = InMemoryPostRepository::new();
        repo.save(post_with_tags(PostStatus::Published, &["rust", "web"]))
            .await
            .unwrap();
        repo.save(post_with_tags(PostStatus::Published, &["tokio"]))
            .await
            .unwrap();

        let err = repo.rename_tag("rust", "tokio").await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));

        let tags = repo.list_tags().await.unwrap();
        assert!(tags.iter().any(|t| t.tag == "rust" && t.count == 1));
    }

    #[tokio::test]
    async fn rename_missing_tag_is_not_found() {
        let repo = InMemoryPostRepository::new();
        repo.save(post_with_tags(PostStatus::Published, &["rust"]))
            .await
            .unwrap();

        assert!(matches!(
            repo.rename_tag("absent", "anything").await.unwrap_err(),
            RepoError::NotFound
        ));
    }

    #[tokio::test]
    async fn remove_tag_reports_affected_posts() {
        let repo = InMemoryPostRepository::new();
        repo.save(post_with_tags(PostStatus::Published, &["rust", "web"]))
            .await
            .unwrap();
        repo.save(post_with_tags(PostStatus::Draft, &["rust"]))
            .await
            .unwrap();

        assert_eq!(repo.remove_tag("rust").await.unwrap(), 2);
        assert!(matches!(
            repo.remove_tag("rust").await.unwrap_err(),
            RepoError::NotFound
        ));
    }

    #[tokio::test]
    async fn tag_counts_cover_published_only() {
        let repo = InMemoryPostRepository::new();
        repo.save(post_with_tags(PostStatus::Published, &["rust", "web"]))
            .await
            .unwrap();
        repo.save(post_with_tags(PostStatus::Published, &["rust"]))
            .await
            .unwrap();
        repo.save(post_with_tags(PostStatus::Draft, &["rust"]))
            .await
            .unwrap();

        let tags = repo.list_tags().await.unwrap();
        assert_eq!(tags[0].tag, "rust");
        assert_eq!(tags[0].count, 2);

        let top = repo.popular_tags(1).await.unwrap();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn category_counts_ignore_drafts() {
        let posts = InMemoryPostRepository::new();
        let categories = InMemoryCategoryRepository::new(posts.store());

        let category = categories
            .save(Category::new("Rust".into(), String::new(), None))
            .await
            .unwrap();

        let mut published = post_with_tags(PostStatus::Published, &[]);
        published.categories = vec![category.id];
        posts.save(published).await.unwrap();

        let mut draft = post_with_tags(PostStatus::Draft, &[]);
        draft.categories = vec![category.id];
        posts.save(draft).await.unwrap();

        let counts = categories.list_with_counts().await.unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].article_count, 1);
        assert!(counts[0].latest_post_at.is_some());
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.save(User::new("alice".into(), "a@example.com".into(), "h".into()))
            .await
            .unwrap();

        let err = repo
            .save(User::new("bob".into(), "a@example.com".into(), "h".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }
}
