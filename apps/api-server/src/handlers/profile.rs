//! Profile routes: the acting user's own record, never anyone else's.

use actix_web::{HttpResponse, web};

use quill_core::domain::AUTHOR_TIER;
use quill_core::ports::{BaseRepository, UserRepository};
use quill_shared::dto::{ProfileUpdateRequest, UserResponse};

use crate::handlers::validate_payload;
use crate::middleware::auth::AuthToken;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/profile
pub async fn get_profile(state: web::Data<AppState>, token: AuthToken) -> AppResult<HttpResponse> {
    let user = state.gate.authorize(token.as_deref(), AUTHOR_TIER).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// PUT /api/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    token: AuthToken,
    body: web::Json<ProfileUpdateRequest>,
) -> AppResult<HttpResponse> {
    let mut user = state.gate.authorize(token.as_deref(), AUTHOR_TIER).await?;

    let req = body.into_inner();
    validate_payload(&req)?;

    if let Some(username) = req.username {
        if username != user.username {
            if let Some(other) = state.users.find_by_username(&username).await? {
                if other.id != user.id {
                    return Err(AppError::Conflict("Username already taken".to_string()));
                }
            }
            user.username = username;
        }
    }

    if let Some(email) = req.email {
        let email = email.to_lowercase();
        if email != user.email {
            if let Some(other) = state.users.find_by_email(&email).await? {
                if other.id != user.id {
                    return Err(AppError::Conflict("Email already registered".to_string()));
                }
            }
            user.email = email;
        }
    }

    if let Some(bio) = req.bio {
        user.bio = bio;
    }
    if let Some(avatar) = req.avatar {
        user.avatar = avatar;
    }
    if let Some(social) = req.social {
        user.social = social.into();
    }
    user.updated_at = chrono::Utc::now();

    let saved = state.users.save(user).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&saved)))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, cookie::Cookie, test, web};
    use serde_json::{Value, json};

    use quill_core::domain::Role;

    use crate::handlers::configure_routes;
    use crate::handlers::test_support::{seed_user, state};

    #[actix_web::test]
    async fn profile_requires_author_tier() {
        let state = state();
        let (_, reader_token) = seed_user(&state, "reader", Role::User).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/profile").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 401);

        let req = test::TestRequest::get()
            .uri("/api/profile")
            .cookie(Cookie::new("token", reader_token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 403);
    }

    #[actix_web::test]
    async fn update_applies_partial_fields() {
        let state = state();
        let (_, token) = seed_user(&state, "alice", Role::Author).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/api/profile")
            .cookie(Cookie::new("token", token))
            .set_json(json!({
                "bio": "systems & prose",
                "social": {"github": "https://github.com/alice"}
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["bio"], "systems & prose");
        assert_eq!(body["social"]["github"], "https://github.com/alice");
        // untouched fields survive
        assert_eq!(body["username"], "alice");
    }

    #[actix_web::test]
    async fn update_rejects_taken_username() {
        let state = state();
        seed_user(&state, "taken", Role::Author).await;
        let (_, token) = seed_user(&state, "alice", Role::Author).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/api/profile")
            .cookie(Cookie::new("token", token))
            .set_json(json!({"username": "taken"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 409);
    }

    #[actix_web::test]
    async fn update_rejects_invalid_avatar_url() {
        let state = state();
        let (_, token) = seed_user(&state, "alice", Role::Author).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/api/profile")
            .cookie(Cookie::new("token", token))
            .set_json(json!({"avatar": "not a url"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 400);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Validation Error");
    }
}
