//! Public tag routes. Tags are plain strings on posts; everything here is
//! a derived aggregate.

use actix_web::{HttpResponse, web};

use quill_core::ports::PostRepository;
use quill_shared::dto::{TagCountResponse, TagPostsResponse};

use crate::handlers::expand_posts;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const POPULAR_TAG_LIMIT: u64 = 10;

/// GET /api/tags
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags = state.posts.list_tags().await?;
    let response: Vec<TagCountResponse> = tags.iter().map(TagCountResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/tags/popular
pub async fn popular(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags = state.posts.popular_tags(POPULAR_TAG_LIMIT).await?;
    let response: Vec<TagCountResponse> = tags.iter().map(TagCountResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/tags/{tag}
///
/// Like the category page, a tag nobody uses any more answers 200 with an
/// empty article list.
pub async fn get_by_tag(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let tag = path.into_inner();

    let posts = state.posts.list_published_by_tag(&tag).await?;
    let articles = expand_posts(&state, &posts).await?;

    Ok(HttpResponse::Ok().json(TagPostsResponse {
        tag,
        count: articles.len() as i64,
        articles,
    }))
}
