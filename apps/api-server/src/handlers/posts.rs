//! Public post routes: listing, single fetch, like toggle.

use actix_web::{HttpResponse, web};

use quill_core::DomainError;
use quill_core::domain::AUTHOR_TIER;
use quill_core::ports::{BaseRepository, PostRepository};
use quill_shared::dto::LikeResponse;

use crate::handlers::{expand_post, expand_posts, parse_id};
use crate::middleware::auth::AuthToken;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts
pub async fn list_published(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list_published().await?;
    let articles = expand_posts(&state, &posts).await?;

    Ok(HttpResponse::Ok().json(articles))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "post",
            id,
        })?;

    // Counted server-side so the number survives client caching.
    state.posts.increment_views(id).await?;

    let mut response = expand_post(&state, &post).await?;
    response.views += 1;

    Ok(HttpResponse::Ok().json(response))
}

/// PATCH /api/posts/{id}/like
///
/// Toggle semantics: membership of the acting user in the like set is
/// negated, atomically, by the repository.
pub async fn toggle_like(
    state: web::Data<AppState>,
    path: web::Path<String>,
    token: AuthToken,
) -> AppResult<HttpResponse> {
    // malformed ids are rejected before any storage access
    let id = parse_id(&path)?;

    let user = state.gate.authorize(token.as_deref(), AUTHOR_TIER).await?;

    let outcome = state.posts.toggle_like(id, user.id).await?;

    Ok(HttpResponse::Ok().json(LikeResponse {
        liked: outcome.liked,
        likes: outcome.likes,
    }))
}
