//! Admin routes: post, category, tag and user management.
//!
//! Post mutation is ownership-or-admin: an author may edit or delete their
//! own posts, an admin anyone's. Everything else here is admin-only.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{ADMIN_ONLY, AUTHOR_TIER, Category, Post, PostStatus, Role, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    AuthError, BaseRepository, CategoryRepository, PostRepository, UserRepository,
};
use quill_shared::dto::{
    AdminPostsResponse, BulkTagResponse, CategoryPayload, CategoryResponse,
    CategoryWithCountResponse, PostPayload, TagRenameRequest, UserResponse,
};
use quill_shared::response::MessageBody;

use crate::handlers::{expand_post, expand_posts, parse_id, validate_payload};
use crate::middleware::auth::AuthToken;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn ensure_owner_or_admin(user: &User, owner_id: Uuid) -> AppResult<()> {
    if user.role != Role::Admin && user.id != owner_id {
        return Err(AuthError::InsufficientPermissions.into());
    }
    Ok(())
}

// --- Posts ---

/// GET /api/admin/posts
pub async fn list_posts(state: web::Data<AppState>, token: AuthToken) -> AppResult<HttpResponse> {
    state.gate.authorize(token.as_deref(), ADMIN_ONLY).await?;

    let posts = state.posts.list_all().await?;
    let items = expand_posts(&state, &posts).await?;

    let mut grouped = AdminPostsResponse::default();
    for item in items {
        match item.status {
            PostStatus::Draft => grouped.draft.push(item),
            PostStatus::Published => grouped.published.push(item),
            PostStatus::Archived => grouped.archived.push(item),
        }
    }

    Ok(HttpResponse::Ok().json(grouped))
}

/// POST /api/admin/posts
pub async fn create_post(
    state: web::Data<AppState>,
    token: AuthToken,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let user = state.gate.authorize(token.as_deref(), ADMIN_ONLY).await?;

    let req = body.into_inner();
    validate_payload(&req)?;

    let mut post = Post::new(
        user.id,
        req.title,
        req.excerpt,
        req.content,
        req.categories,
        req.tags,
        req.status,
        req.featured_image.unwrap_or_default(),
    );
    post.featured = req.featured;
    if let Some(seo) = req.seo {
        post.seo = seo.into();
    }

    let saved = state.posts.save(post).await?;
    let response = expand_post(&state, &saved).await?;

    Ok(HttpResponse::Created().json(response))
}

/// PUT /api/admin/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    token: AuthToken,
    path: web::Path<String>,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let user = state.gate.authorize(token.as_deref(), AUTHOR_TIER).await?;

    let mut post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "post",
            id,
        })?;
    ensure_owner_or_admin(&user, post.author_id)?;

    let req = body.into_inner();
    validate_payload(&req)?;

    post.set_title(req.title);
    post.set_content(req.content);
    post.set_status(req.status);
    post.excerpt = req.excerpt;
    post.categories = req.categories;
    post.tags = req.tags;
    post.featured = req.featured;
    if let Some(image) = req.featured_image {
        post.featured_image = image;
    }
    if let Some(seo) = req.seo {
        post.seo = seo.into();
    }
    post.updated_at = chrono::Utc::now();

    let saved = state.posts.save(post).await?;
    let response = expand_post(&state, &saved).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// DELETE /api/admin/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    token: AuthToken,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let user = state.gate.authorize(token.as_deref(), AUTHOR_TIER).await?;

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "post",
            id,
        })?;
    ensure_owner_or_admin(&user, post.author_id)?;

    state.posts.delete(id).await?;

    Ok(HttpResponse::Ok().json(MessageBody::new("Post deleted")))
}

// --- Categories ---

/// GET /api/admin/categories
pub async fn list_categories(
    state: web::Data<AppState>,
    token: AuthToken,
) -> AppResult<HttpResponse> {
    state.gate.authorize(token.as_deref(), ADMIN_ONLY).await?;

    let entries = state.categories.list_with_counts().await?;
    let response: Vec<CategoryWithCountResponse> =
        entries.iter().map(CategoryWithCountResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/admin/categories
pub async fn create_category(
    state: web::Data<AppState>,
    token: AuthToken,
    body: web::Json<CategoryPayload>,
) -> AppResult<HttpResponse> {
    state.gate.authorize(token.as_deref(), ADMIN_ONLY).await?;

    let req = body.into_inner();
    validate_payload(&req)?;

    if state.categories.find_by_name(&req.name).await?.is_some() {
        return Err(AppError::Conflict("Category already exists".to_string()));
    }

    let category = Category::new(req.name, req.description, req.image);
    let saved = state.categories.save(category).await?;

    Ok(HttpResponse::Created().json(CategoryResponse::from(&saved)))
}

/// PUT /api/admin/categories/{id}
pub async fn update_category(
    state: web::Data<AppState>,
    token: AuthToken,
    path: web::Path<String>,
    body: web::Json<CategoryPayload>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    state.gate.authorize(token.as_deref(), ADMIN_ONLY).await?;

    let mut category = state
        .categories
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "category",
            id,
        })?;

    let req = body.into_inner();
    validate_payload(&req)?;

    if req.name != category.name {
        if let Some(other) = state.categories.find_by_name(&req.name).await? {
            if other.id != category.id {
                return Err(AppError::Conflict("Category already exists".to_string()));
            }
        }
        // slug follows the name
        category.set_name(req.name);
    }
    category.description = req.description;
    if let Some(image) = req.image {
        category.image = image;
    }
    category.updated_at = chrono::Utc::now();

    let saved = state.categories.save(category).await?;

    Ok(HttpResponse::Ok().json(CategoryResponse::from(&saved)))
}

/// DELETE /api/admin/categories/{id}
pub async fn delete_category(
    state: web::Data<AppState>,
    token: AuthToken,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    state.gate.authorize(token.as_deref(), ADMIN_ONLY).await?;

    match state.categories.delete(id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(MessageBody::new("Category deleted"))),
        Err(RepoError::NotFound) => Err(DomainError::NotFound {
            entity_type: "category",
            id,
        }
        .into()),
        Err(e) => Err(e.into()),
    }
}

// --- Tags ---

/// PATCH /api/admin/tags/{tag}
///
/// Bulk rename across every post carrying the tag. "Tag does not exist"
/// (404) and "target name already in use" (409) are distinct failures;
/// neither modifies any document.
pub async fn rename_tag(
    state: web::Data<AppState>,
    token: AuthToken,
    path: web::Path<String>,
    body: web::Json<TagRenameRequest>,
) -> AppResult<HttpResponse> {
    state.gate.authorize(token.as_deref(), ADMIN_ONLY).await?;

    let tag = path.into_inner();
    let req = body.into_inner();
    validate_payload(&req)?;

    match state.posts.rename_tag(&tag, &req.name).await {
        Ok(modified) => Ok(HttpResponse::Ok().json(BulkTagResponse {
            message: format!("Tag '{tag}' renamed to '{}'", req.name),
            modified,
        })),
        Err(RepoError::NotFound) => Err(AppError::NotFound(format!("tag '{tag}' not found"))),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /api/admin/tags/{tag}
pub async fn delete_tag(
    state: web::Data<AppState>,
    token: AuthToken,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.gate.authorize(token.as_deref(), ADMIN_ONLY).await?;

    let tag = path.into_inner();

    match state.posts.remove_tag(&tag).await {
        Ok(modified) => Ok(HttpResponse::Ok().json(BulkTagResponse {
            message: format!("Tag '{tag}' deleted"),
            modified,
        })),
        Err(RepoError::NotFound) => Err(AppError::NotFound(format!("tag '{tag}' not found"))),
        Err(e) => Err(e.into()),
    }
}

// --- Users ---

/// GET /api/admin/users
pub async fn list_users(state: web::Data<AppState>, token: AuthToken) -> AppResult<HttpResponse> {
    state.gate.authorize(token.as_deref(), ADMIN_ONLY).await?;

    let users = state.users.list().await?;
    let response: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// PUT /api/admin/users/{id}
pub async fn update_user(
    state: web::Data<AppState>,
    token: AuthToken,
    path: web::Path<String>,
    body: web::Json<quill_shared::dto::AdminUserUpdateRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    state.gate.authorize(token.as_deref(), ADMIN_ONLY).await?;

    let mut user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "user",
            id,
        })?;

    let req = body.into_inner();
    validate_payload(&req)?;

    if let Some(role) = req.role {
        user.role = role;
    }
    if let Some(locked) = req.locked {
        user.locked = locked;
    }
    if let Some(verified) = req.verified {
        user.verified = verified;
    }
    user.updated_at = chrono::Utc::now();

    let saved = state.users.save(user).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&saved)))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, cookie::Cookie, test, web};
    use serde_json::{Value, json};

    use quill_core::domain::{Post, PostStatus, Role};
    use quill_core::ports::{BaseRepository, PostRepository};

    use crate::handlers::configure_routes;
    use crate::handlers::test_support::{seed_user, state};
    use crate::state::AppState;

    async fn seed_post(state: &AppState, author: uuid::Uuid, tags: &[&str]) -> Post {
        let post = Post::new(
            author,
            "Seeded Post".to_string(),
            String::new(),
            "long enough content here".to_string(),
            vec![],
            tags.iter().map(|t| t.to_string()).collect(),
            PostStatus::Published,
            String::new(),
        );
        state.posts.save(post).await.unwrap()
    }

    #[actix_web::test]
    async fn admin_routes_reject_author_tier_with_403() {
        let state = state();
        let (_, author_token) = seed_user(&state, "alice", Role::Author).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        // author token: identity is valid, role is not -> 403, never 401
        let req = test::TestRequest::get()
            .uri("/api/admin/users")
            .cookie(Cookie::new("token", author_token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 403);

        // no token at all -> 401
        let req = test::TestRequest::get().uri("/api/admin/users").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 401);
    }

    #[actix_web::test]
    async fn create_post_defaults_to_draft_without_publish_stamp() {
        let state = state();
        let (_, admin_token) = seed_user(&state, "root", Role::Admin).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/admin/posts")
            .cookie(Cookie::new("token", admin_token))
            .set_json(json!({
                "title": "My New Draft",
                "content": "long enough content here",
                "tags": "rust, drafts"
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 201);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "draft");
        assert_eq!(body["slug"], "my-new-draft");
        assert!(body["published_at"].is_null());
        assert_eq!(body["tags"], json!(["rust", "drafts"]));
    }

    #[actix_web::test]
    async fn create_published_post_is_stamped() {
        let state = state();
        let (_, admin_token) = seed_user(&state, "root", Role::Admin).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/admin/posts")
            .cookie(Cookie::new("token", admin_token))
            .set_json(json!({
                "title": "Shipped Immediately",
                "content": "long enough content here",
                "status": "published"
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 201);

        let body: Value = test::read_body_json(res).await;
        assert!(body["published_at"].is_string());
    }

    #[actix_web::test]
    async fn listing_groups_posts_by_status() {
        let state = state();
        let (admin, admin_token) = seed_user(&state, "root", Role::Admin).await;
        seed_post(&state, admin.id, &[]).await;

        let mut draft = Post::new(
            admin.id,
            "Unfinished".to_string(),
            String::new(),
            "long enough content here".to_string(),
            vec![],
            vec![],
            PostStatus::Draft,
            String::new(),
        );
        draft.featured = true;
        state.posts.save(draft).await.unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/admin/posts")
            .cookie(Cookie::new("token", admin_token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["published"].as_array().unwrap().len(), 1);
        assert_eq!(body["draft"].as_array().unwrap().len(), 1);
        assert_eq!(body["archived"].as_array().unwrap().len(), 0);
    }

    #[actix_web::test]
    async fn authors_may_edit_only_their_own_posts() {
        let state = state();
        let (owner, owner_token) = seed_user(&state, "owner", Role::Author).await;
        let (_, other_token) = seed_user(&state, "other", Role::Author).await;
        let post = seed_post(&state, owner.id, &[]).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let payload = json!({
            "title": "Retitled Post",
            "content": "still long enough content",
            "status": "published"
        });

        let req = test::TestRequest::put()
            .uri(&format!("/api/admin/posts/{}", post.id))
            .cookie(Cookie::new("token", other_token))
            .set_json(payload.clone())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 403);

        let req = test::TestRequest::put()
            .uri(&format!("/api/admin/posts/{}", post.id))
            .cookie(Cookie::new("token", owner_token))
            .set_json(payload)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["slug"], "retitled-post");
    }

    #[actix_web::test]
    async fn rename_tag_reports_modified_count() {
        let state = state();
        let (admin, admin_token) = seed_user(&state, "root", Role::Admin).await;
        seed_post(&state, admin.id, &["rust", "web"]).await;
        seed_post(&state, admin.id, &["rust"]).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::patch()
            .uri("/api/admin/tags/rust")
            .cookie(Cookie::new("token", admin_token))
            .set_json(json!({"name": "rustlang"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["modified"], 2);

        let tags = state.posts.list_tags().await.unwrap();
        assert!(tags.iter().any(|t| t.tag == "rustlang" && t.count == 2));
        assert!(!tags.iter().any(|t| t.tag == "rust"));
    }

    #[actix_web::test]
    async fn rename_tag_onto_existing_tag_conflicts() {
        let state = state();
        let (admin, admin_token) = seed_user(&state, "root", Role::Admin).await;
        seed_post(&state, admin.id, &["rust"]).await;
        seed_post(&state, admin.id, &["web"]).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::patch()
            .uri("/api/admin/tags/rust")
            .cookie(Cookie::new("token", admin_token))
            .set_json(json!({"name": "web"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 409);

        // zero documents modified
        let tags = state.posts.list_tags().await.unwrap();
        assert!(tags.iter().any(|t| t.tag == "rust" && t.count == 1));
        assert!(tags.iter().any(|t| t.tag == "web" && t.count == 1));
    }

    #[actix_web::test]
    async fn rename_missing_tag_is_404_and_delete_reports_count() {
        let state = state();
        let (admin, admin_token) = seed_user(&state, "root", Role::Admin).await;
        seed_post(&state, admin.id, &["rust"]).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::patch()
            .uri("/api/admin/tags/absent")
            .cookie(Cookie::new("token", admin_token.clone()))
            .set_json(json!({"name": "anything"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 404);

        let req = test::TestRequest::delete()
            .uri("/api/admin/tags/rust")
            .cookie(Cookie::new("token", admin_token.clone()))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["modified"], 1);

        let req = test::TestRequest::delete()
            .uri("/api/admin/tags/rust")
            .cookie(Cookie::new("token", admin_token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 404);
    }

    #[actix_web::test]
    async fn category_rename_rederives_slug() {
        let state = state();
        let (_, admin_token) = seed_user(&state, "root", Role::Admin).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/admin/categories")
            .cookie(Cookie::new("token", admin_token.clone()))
            .set_json(json!({"name": "Web Development"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 201);
        let created: Value = test::read_body_json(res).await;
        assert_eq!(created["slug"], "web-development");

        let id = created["id"].as_str().unwrap();
        let req = test::TestRequest::put()
            .uri(&format!("/api/admin/categories/{id}"))
            .cookie(Cookie::new("token", admin_token))
            .set_json(json!({"name": "Frontend Engineering"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
        let updated: Value = test::read_body_json(res).await;
        assert_eq!(updated["slug"], "frontend-engineering");
    }

    #[actix_web::test]
    async fn user_listing_is_safe_subset_and_update_changes_role() {
        let state = state();
        let (_, admin_token) = seed_user(&state, "root", Role::Admin).await;
        let (reader, _) = seed_user(&state, "reader", Role::User).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/admin/users")
            .cookie(Cookie::new("token", admin_token.clone()))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
        let body: Value = test::read_body_json(res).await;
        assert!(!body.to_string().contains("password"));

        let req = test::TestRequest::put()
            .uri(&format!("/api/admin/users/{}", reader.id))
            .cookie(Cookie::new("token", admin_token))
            .set_json(json!({"role": "author"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["role"], "author");
    }
}
