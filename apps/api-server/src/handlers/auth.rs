//! Authentication handlers: signup, login, logout.

use actix_web::{HttpResponse, web};

use quill_core::domain::User;
use quill_core::ports::{
    AuthError, BaseRepository, PasswordService, TokenService, UserRepository,
};
use quill_shared::dto::{LoginRequest, SignupRequest, UserResponse};
use quill_shared::response::MessageBody;

use crate::handlers::validate_payload;
use crate::middleware::auth::{auth_cookie, clear_auth_cookie};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/signup
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_payload(&req)?;

    let email = req.email.to_lowercase();

    // Uniqueness checks before any write
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }
    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let password_hash = state.passwords.hash(&req.password)?;

    let user = User::new(req.username, email, password_hash);
    let saved = state.users.save(user).await?;

    let token = state.tokens.issue(saved.id, &saved.email, saved.role)?;

    Ok(HttpResponse::Created()
        .cookie(auth_cookie(
            token,
            state.tokens.ttl_seconds(),
            state.cookie_secure,
        ))
        .json(UserResponse::from(&saved)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_payload(&req)?;

    let mut user = state
        .users
        .find_by_email(&req.email.to_lowercase())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    // Locked accounts fail with the same generic message as bad
    // credentials; the response must not reveal the lock state.
    if user.locked {
        return Err(AuthError::InvalidCredentials.into());
    }

    let valid = state.passwords.verify(&req.password, &user.password_hash)?;
    if !valid {
        user.record_failed_login();
        state.users.save(user).await?;
        return Err(AuthError::InvalidCredentials.into());
    }

    user.record_login();
    let user = state.users.save(user).await?;

    let token = state.tokens.issue(user.id, &user.email, user.role)?;

    Ok(HttpResponse::Ok()
        .cookie(auth_cookie(
            token,
            state.tokens.ttl_seconds(),
            state.cookie_secure,
        ))
        .json(UserResponse::from(&user)))
}

/// POST /api/auth/logout
pub async fn logout(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok()
        .cookie(clear_auth_cookie(state.cookie_secure))
        .json(MessageBody::new("Logged out")))
}
