//! Public category routes.

use actix_web::{HttpResponse, web};

use quill_core::ports::{CategoryRepository, PostRepository};
use quill_shared::dto::{CategoryPostsResponse, CategoryResponse, CategoryWithCountResponse};

use crate::handlers::expand_posts;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/categories
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let entries = state.categories.list_with_counts().await?;
    let response: Vec<CategoryWithCountResponse> =
        entries.iter().map(CategoryWithCountResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/categories/{slug}
///
/// A category with zero published posts is still a 200: the category
/// exists, its article list is just empty.
pub async fn get_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    let category = state
        .categories
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category '{slug}' not found")))?;

    let posts = state.posts.list_published_by_category(category.id).await?;
    let articles = expand_posts(&state, &posts).await?;

    Ok(HttpResponse::Ok().json(CategoryPostsResponse {
        category: CategoryResponse::from(&category),
        count: articles.len() as i64,
        articles,
    }))
}
