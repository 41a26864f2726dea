//! Data Transfer Objects - request/response types for the API.
//!
//! Request types carry their validation schema (`validator` derive); every
//! rule has an explicit message so a failed request reports the complete,
//! readable list of problems.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use quill_core::domain::{Category, Post, PostStatus, Role, Seo, SocialLinks, User};
use quill_core::ports::{CategoryWithCount, TagCount};

use crate::validation::deserialize_tags;

/// Slug-safe username charset.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]+$").expect("username regex"));

// --- Requests ---

/// POST /api/auth/signup
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(
        length(min = 3, max = 50, message = "username must be 3 to 50 characters"),
        regex(
            path = *USERNAME_RE,
            message = "username may only contain lowercase letters, digits, '-' and '_'"
        )
    )]
    pub username: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8 to 128 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub confirm_password: String,
}

/// POST /api/auth/login
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Social link block accepted on profile updates.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SocialLinksInput {
    #[validate(url(message = "twitter must be a valid URL"))]
    pub twitter: Option<String>,
    #[validate(url(message = "github must be a valid URL"))]
    pub github: Option<String>,
    #[validate(url(message = "website must be a valid URL"))]
    pub website: Option<String>,
}

impl From<SocialLinksInput> for SocialLinks {
    fn from(input: SocialLinksInput) -> Self {
        Self {
            twitter: input.twitter,
            github: input.github,
            website: input.website,
        }
    }
}

/// PUT /api/profile - partial update, absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    #[validate(
        length(min = 3, max = 50, message = "username must be 3 to 50 characters"),
        regex(
            path = *USERNAME_RE,
            message = "username may only contain lowercase letters, digits, '-' and '_'"
        )
    )]
    pub username: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 500, message = "bio must be at most 500 characters"))]
    pub bio: Option<String>,
    #[validate(url(message = "avatar must be a valid URL"))]
    pub avatar: Option<String>,
    #[validate(nested)]
    pub social: Option<SocialLinksInput>,
}

/// SEO block accepted on post create/update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SeoInput {
    #[validate(length(max = 70, message = "seo title must be at most 70 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 160, message = "seo description must be at most 160 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl From<SeoInput> for Seo {
    fn from(input: SeoInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            keywords: input.keywords,
        }
    }
}

/// POST/PUT /api/admin/posts - post create and update share one schema.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostPayload {
    #[validate(length(min = 3, max = 200, message = "title must be 3 to 200 characters"))]
    pub title: String,
    #[validate(length(max = 300, message = "excerpt must be at most 300 characters"))]
    #[serde(default)]
    pub excerpt: String,
    #[validate(length(min = 10, message = "content must be at least 10 characters"))]
    pub content: String,
    #[serde(default)]
    pub categories: Vec<Uuid>,
    /// Accepts a list of strings or one comma-separated string; normalized
    /// to a trimmed, deduplicated list.
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: PostStatus,
    #[validate(url(message = "featured_image must be a valid URL"))]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[validate(nested)]
    pub seo: Option<SeoInput>,
}

/// POST/PUT /api/admin/categories
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryPayload {
    #[validate(length(min = 2, max = 50, message = "name must be 2 to 50 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "description must be at most 500 characters"))]
    #[serde(default)]
    pub description: String,
    #[validate(url(message = "image must be a valid URL"))]
    pub image: Option<String>,
}

/// PATCH /api/admin/tags/{tag}
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TagRenameRequest {
    #[validate(length(min = 1, max = 50, message = "name must be 1 to 50 characters"))]
    pub name: String,
}

/// PUT /api/admin/users/{id} - role and account-state management.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AdminUserUpdateRequest {
    pub role: Option<Role>,
    pub locked: Option<bool>,
    pub verified: Option<bool>,
}

// --- Responses ---

/// Safe user field subset. The password hash is deliberately not part of
/// this type, so it cannot appear in any serialized response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar: String,
    pub bio: String,
    pub role: Role,
    pub social: SocialLinks,
    pub verified: bool,
    pub locked: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            role: user.role,
            social: user.social.clone(),
            verified: user.verified,
            locked: user.locked,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// Expanded author reference on post listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
}

impl From<&User> for AuthorRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

/// Expanded category reference on post listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for CategoryRef {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
        }
    }
}

/// Post summary on listings: references expanded, body omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListItem {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub author: Option<AuthorRef>,
    pub categories: Vec<CategoryRef>,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub featured_image: String,
    pub read_time: String,
    pub featured: bool,
    pub likes: i64,
    pub views: i64,
}

impl PostListItem {
    pub fn build(post: &Post, author: Option<AuthorRef>, categories: Vec<CategoryRef>) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            author,
            categories,
            tags: post.tags.clone(),
            status: post.status,
            published_at: post.published_at,
            featured_image: post.featured_image.clone(),
            read_time: post.read_time.clone(),
            featured: post.featured,
            likes: post.meta.likes.len() as i64,
            views: post.meta.views,
        }
    }
}

/// Full post representation for single-post fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub author: Option<AuthorRef>,
    pub categories: Vec<CategoryRef>,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub featured_image: String,
    pub read_time: String,
    pub featured: bool,
    pub likes: i64,
    pub views: i64,
    pub comments: i64,
    pub seo: Seo,
    pub created_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn build(post: &Post, author: Option<AuthorRef>, categories: Vec<CategoryRef>) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            author,
            categories,
            tags: post.tags.clone(),
            status: post.status,
            published_at: post.published_at,
            featured_image: post.featured_image.clone(),
            read_time: post.read_time.clone(),
            featured: post.featured,
            likes: post.meta.likes.len() as i64,
            views: post.meta.views,
            comments: post.meta.comments,
            seo: post.seo.clone(),
            created_at: post.created_at,
        }
    }
}

/// PATCH /api/posts/{id}/like result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub likes: i64,
}

/// Category representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            image: category.image.clone(),
            created_at: category.created_at,
        }
    }
}

/// Category with its derived aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWithCountResponse {
    #[serde(flatten)]
    pub category: CategoryResponse,
    pub article_count: i64,
    pub latest_post_at: Option<DateTime<Utc>>,
}

impl From<&CategoryWithCount> for CategoryWithCountResponse {
    fn from(entry: &CategoryWithCount) -> Self {
        Self {
            category: CategoryResponse::from(&entry.category),
            article_count: entry.article_count,
            latest_post_at: entry.latest_post_at,
        }
    }
}

/// GET /api/categories/{slug} - the category plus its published posts.
/// A category with zero published posts is still a 200 with an empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPostsResponse {
    pub category: CategoryResponse,
    pub articles: Vec<PostListItem>,
    pub count: i64,
}

/// A tag with its published-post usage count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCountResponse {
    pub tag: String,
    pub count: i64,
}

impl From<&TagCount> for TagCountResponse {
    fn from(entry: &TagCount) -> Self {
        Self {
            tag: entry.tag.clone(),
            count: entry.count,
        }
    }
}

/// GET /api/tags/{tag} - published posts carrying the tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagPostsResponse {
    pub tag: String,
    pub articles: Vec<PostListItem>,
    pub count: i64,
}

/// GET /api/admin/posts - every post, grouped by status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminPostsResponse {
    pub draft: Vec<PostListItem>,
    pub published: Vec<PostListItem>,
    pub archived: Vec<PostListItem>,
}

/// Bulk tag rename/delete result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkTagResponse {
    pub message: String,
    pub modified: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::collect_errors;

    fn signup(username: &str, password: &str, confirm: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: "user@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn short_username_is_reported() {
        let errors = signup("ab", "long-enough-pw", "long-enough-pw")
            .validate()
            .unwrap_err();
        let messages = collect_errors(&errors);
        assert!(
            messages.iter().any(|m| m.contains("username must be 3")),
            "missing username length message: {messages:?}"
        );
    }

    #[test]
    fn all_errors_reported_in_one_pass() {
        let request = SignupRequest {
            username: "AB".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            confirm_password: "different".to_string(),
        };
        let messages = collect_errors(&request.validate().unwrap_err());
        // username (length + charset), email, password, confirm_password
        assert!(messages.len() >= 4, "expected full pass, got {messages:?}");
    }

    #[test]
    fn password_mismatch_is_reported() {
        let errors = signup("alice", "long-enough-pw", "other-password")
            .validate()
            .unwrap_err();
        let messages = collect_errors(&errors);
        assert!(messages.iter().any(|m| m.contains("do not match")));
    }

    #[test]
    fn valid_signup_passes() {
        assert!(signup("alice_99", "long-enough-pw", "long-enough-pw")
            .validate()
            .is_ok());
    }

    #[test]
    fn nested_social_links_are_validated() {
        let request = ProfileUpdateRequest {
            social: Some(SocialLinksInput {
                twitter: Some("not a url".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let messages = collect_errors(&request.validate().unwrap_err());
        assert!(messages.iter().any(|m| m.contains("twitter")));
    }

    #[test]
    fn post_payload_tags_accept_both_shapes() {
        let from_string: PostPayload = serde_json::from_value(serde_json::json!({
            "title": "A valid title",
            "content": "content long enough to pass",
            "tags": "rust, web, rust"
        }))
        .unwrap();
        let from_list: PostPayload = serde_json::from_value(serde_json::json!({
            "title": "A valid title",
            "content": "content long enough to pass",
            "tags": ["rust", " web "]
        }))
        .unwrap();
        assert_eq!(from_string.tags, vec!["rust", "web"]);
        assert_eq!(from_list.tags, vec!["rust", "web"]);
    }
}
