use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slug::slugify;

const WORDS_PER_MINUTE: usize = 200;

/// Reading speed estimate derived from the body word count, rounded up.
pub fn read_time(content: &str) -> String {
    let words = content.split_whitespace().count();
    format!("{} min read", words.div_ceil(WORDS_PER_MINUTE))
}

/// Publication state of a post. Transitions are set directly from input;
/// there is no enforced state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl std::str::FromStr for PostStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "archived" => Ok(PostStatus::Archived),
            _ => Err(()),
        }
    }
}

/// Engagement counters embedded in a post.
///
/// `likes` holds each user id at most once; membership is what "liked"
/// means, there is no separate flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostMeta {
    pub likes: Vec<Uuid>,
    pub views: i64,
    pub comments: i64,
}

/// Search-engine metadata block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Post entity - an article on the platform.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    /// Derived from the title; recomputed only when the title changes.
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    /// Category references, in submission order.
    pub categories: Vec<Uuid>,
    /// Free-text tags, trimmed and deduplicated upstream.
    pub tags: Vec<String>,
    pub author_id: Uuid,
    pub status: PostStatus,
    /// Stamped once, on the transition to published.
    pub published_at: Option<DateTime<Utc>>,
    pub featured_image: String,
    pub read_time: String,
    pub featured: bool,
    pub meta: PostMeta,
    pub seo: Seo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post. Slug and read-time are derived here; a post
    /// created directly as published gets its timestamp at creation.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        author_id: Uuid,
        title: String,
        excerpt: String,
        content: String,
        categories: Vec<Uuid>,
        tags: Vec<String>,
        status: PostStatus,
        featured_image: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            slug: slugify(&title),
            read_time: read_time(&content),
            title,
            excerpt,
            content,
            categories,
            tags,
            author_id,
            status,
            published_at: (status == PostStatus::Published).then_some(now),
            featured_image,
            featured: false,
            meta: PostMeta::default(),
            seo: Seo::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Retitle the post. The slug follows the title, nothing else does.
    pub fn set_title(&mut self, title: String) {
        if title != self.title {
            self.slug = slugify(&title);
            self.title = title;
        }
    }

    /// Replace the body and refresh the derived read-time.
    pub fn set_content(&mut self, content: String) {
        self.read_time = read_time(&content);
        self.content = content;
    }

    /// Change publication status. The published timestamp is stamped on the
    /// first transition to published and kept on later transitions.
    pub fn set_status(&mut self, status: PostStatus) {
        if status == PostStatus::Published && self.published_at.is_none() {
            self.published_at = Some(Utc::now());
        }
        self.status = status;
    }

    /// Toggle `user_id`'s membership in the like set. Returns the new
    /// liked state.
    pub fn toggle_like(&mut self, user_id: Uuid) -> bool {
        if let Some(pos) = self.meta.likes.iter().position(|id| *id == user_id) {
            self.meta.likes.remove(pos);
            false
        } else {
            self.meta.likes.push(user_id);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post(status: PostStatus) -> Post {
        Post::new(
            Uuid::new_v4(),
            "Hello, World!".into(),
            "An excerpt".into(),
            "word ".repeat(250),
            vec![],
            vec!["rust".into()],
            status,
            String::new(),
        )
    }

    #[test]
    fn derives_slug_and_read_time() {
        let post = sample_post(PostStatus::Draft);
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.read_time, "2 min read");
        assert!(post.published_at.is_none());
    }

    #[test]
    fn published_at_creation_is_stamped() {
        let post = sample_post(PostStatus::Published);
        assert!(post.published_at.is_some());
    }

    #[test]
    fn slug_recomputed_only_on_title_change() {
        let mut post = sample_post(PostStatus::Draft);
        let slug = post.slug.clone();

        post.set_content("short body".into());
        assert_eq!(post.slug, slug);
        assert_eq!(post.read_time, "1 min read");

        post.set_title("A Different Title".into());
        assert_eq!(post.slug, "a-different-title");
    }

    #[test]
    fn publish_stamp_survives_round_trip() {
        let mut post = sample_post(PostStatus::Draft);
        post.set_status(PostStatus::Published);
        let stamped = post.published_at;
        assert!(stamped.is_some());

        post.set_status(PostStatus::Draft);
        post.set_status(PostStatus::Published);
        assert_eq!(post.published_at, stamped);
    }

    #[test]
    fn like_toggle_round_trips() {
        let mut post = sample_post(PostStatus::Published);
        let user = Uuid::new_v4();

        assert!(post.toggle_like(user));
        assert_eq!(post.meta.likes.len(), 1);

        assert!(!post.toggle_like(user));
        assert!(post.meta.likes.is_empty());
    }

    #[test]
    fn like_set_holds_each_user_once() {
        let mut post = sample_post(PostStatus::Published);
        let user = Uuid::new_v4();
        post.toggle_like(user);
        post.toggle_like(Uuid::new_v4());
        post.toggle_like(user);
        assert_eq!(
            post.meta.likes.iter().filter(|id| **id == user).count(),
            0
        );
    }

    #[test]
    fn read_time_rounds_up() {
        assert_eq!(read_time(&"w ".repeat(200)), "1 min read");
        assert_eq!(read_time(&"w ".repeat(201)), "2 min read");
        assert_eq!(read_time("a few words here"), "1 min read");
    }
}
