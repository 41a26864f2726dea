//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod categories;
mod health;
mod posts;
mod profile;
mod tags;

use std::collections::{HashMap, HashSet};

use actix_web::web;
use uuid::Uuid;

use quill_core::domain::{Category, Post, User};
use quill_core::ports::{CategoryRepository, UserRepository};
use quill_shared::dto::{AuthorRef, CategoryRef, PostListItem, PostResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::signup))
                    .route("/login", web::post().to(auth::login))
                    .route("/logout", web::post().to(auth::logout)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_published))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}/like", web::patch().to(posts::toggle_like)),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(categories::list))
                    .route("/{slug}", web::get().to(categories::get_by_slug)),
            )
            .service(
                web::scope("/tags")
                    .route("", web::get().to(tags::list))
                    // registered before the catch-all tag segment
                    .route("/popular", web::get().to(tags::popular))
                    .route("/{tag}", web::get().to(tags::get_by_tag)),
            )
            .service(
                web::scope("/profile")
                    .route("", web::get().to(profile::get_profile))
                    .route("", web::put().to(profile::update_profile)),
            )
            .service(
                web::scope("/admin")
                    .route("/posts", web::get().to(admin::list_posts))
                    .route("/posts", web::post().to(admin::create_post))
                    .route("/posts/{id}", web::put().to(admin::update_post))
                    .route("/posts/{id}", web::delete().to(admin::delete_post))
                    .route("/categories", web::get().to(admin::list_categories))
                    .route("/categories", web::post().to(admin::create_category))
                    .route("/categories/{id}", web::put().to(admin::update_category))
                    .route("/categories/{id}", web::delete().to(admin::delete_category))
                    .route("/tags/{tag}", web::patch().to(admin::rename_tag))
                    .route("/tags/{tag}", web::delete().to(admin::delete_tag))
                    .route("/users", web::get().to(admin::list_users))
                    .route("/users/{id}", web::put().to(admin::update_user)),
            ),
    );
}

/// Parse a path identifier, rejecting malformed input before any storage
/// access.
pub(crate) fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("invalid id '{raw}'")))
}

/// Run a schema over an untrusted payload, collecting the full error list.
pub(crate) fn validate_payload<T: validator::Validate>(payload: &T) -> AppResult<()> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(quill_shared::collect_errors(&e)))
}

async fn reference_maps(
    state: &AppState,
    posts: &[Post],
) -> AppResult<(HashMap<Uuid, User>, HashMap<Uuid, Category>)> {
    let author_ids: Vec<Uuid> = posts
        .iter()
        .map(|post| post.author_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let category_ids: Vec<Uuid> = posts
        .iter()
        .flat_map(|post| post.categories.iter().copied())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let authors = state
        .users
        .find_by_ids(&author_ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();
    let categories = state
        .categories
        .find_by_ids(&category_ids)
        .await?
        .into_iter()
        .map(|category| (category.id, category))
        .collect();

    Ok((authors, categories))
}

/// Expand author and category references on a listing: one batched lookup
/// per referenced table, never per post.
pub(crate) async fn expand_posts(
    state: &AppState,
    posts: &[Post],
) -> AppResult<Vec<PostListItem>> {
    let (authors, categories) = reference_maps(state, posts).await?;

    Ok(posts
        .iter()
        .map(|post| {
            PostListItem::build(
                post,
                authors.get(&post.author_id).map(AuthorRef::from),
                post.categories
                    .iter()
                    .filter_map(|id| categories.get(id))
                    .map(CategoryRef::from)
                    .collect(),
            )
        })
        .collect())
}

/// Expand references on a single post.
pub(crate) async fn expand_post(state: &AppState, post: &Post) -> AppResult<PostResponse> {
    let (authors, categories) = reference_maps(state, std::slice::from_ref(post)).await?;

    Ok(PostResponse::build(
        post,
        authors.get(&post.author_id).map(AuthorRef::from),
        post.categories
            .iter()
            .filter_map(|id| categories.get(id))
            .map(CategoryRef::from)
            .collect(),
    ))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use quill_core::domain::{Role, User};
    use quill_core::ports::{BaseRepository, PasswordService, TokenService};
    use quill_infra::auth::{JwtConfig, JwtTokenService};

    use crate::state::AppState;

    pub(crate) const TEST_PASSWORD: &str = "correct-horse-battery";

    pub(crate) fn state() -> AppState {
        AppState::in_memory(Arc::new(JwtTokenService::new(JwtConfig {
            secret: "handler-test-secret".to_string(),
            expiration_days: 7,
        })))
    }

    /// Seed a user with the given role. Returns the stored user and a
    /// valid token for it.
    pub(crate) async fn seed_user(state: &AppState, username: &str, role: Role) -> (User, String) {
        let hash = state.passwords.hash(TEST_PASSWORD).unwrap();
        let mut user = User::new(
            username.to_string(),
            format!("{username}@example.com"),
            hash,
        );
        user.role = role;

        let user = state.users.save(user).await.unwrap();
        let token = state.tokens.issue(user.id, &user.email, user.role).unwrap();
        (user, token)
    }
}
