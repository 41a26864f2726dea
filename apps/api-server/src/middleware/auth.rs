//! Token extraction and the authorization gate.

use std::future::{Ready, ready};
use std::sync::Arc;

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header};

use quill_core::domain::{Role, User};
use quill_core::ports::{AuthError, BaseRepository, TokenService, UserRepository};

use super::error::AppError;

/// Name of the identity cookie.
pub const AUTH_COOKIE: &str = "token";

/// Raw token extractor: the HTTP-only cookie is the primary transport,
/// a Bearer header is accepted as fallback. Absence is not a rejection
/// here - whether a token is required is the authorization gate's call.
#[derive(Debug, Clone)]
pub struct AuthToken(pub Option<String>);

impl AuthToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequest for AuthToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .cookie(AUTH_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .or_else(|| {
                req.headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.strip_prefix("Bearer "))
                    .map(str::to_string)
            });

        ready(Ok(AuthToken(token)))
    }
}

/// The authorization gate every protected route goes through:
/// token -> claims -> stored user -> role membership.
#[derive(Clone)]
pub struct AuthGate {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
}

impl AuthGate {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<dyn TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Resolve the acting user and enforce role membership.
    ///
    /// 401 for a missing, invalid or expired token and for tokens whose
    /// subject no longer resolves to a live account; 403 only once the
    /// identity is established but the role is not in `allowed`. The
    /// returned record is what callers use for ownership checks.
    pub async fn authorize(&self, token: Option<&str>, allowed: &[Role]) -> Result<User, AppError> {
        let token = token.ok_or(AuthError::MissingAuth)?;
        let claims = self.tokens.verify(token)?;

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            // valid signature, but the account is gone: stale token
            .ok_or(AuthError::InvalidToken("unknown subject".to_string()))?;

        if user.locked {
            return Err(AuthError::InvalidToken("account locked".to_string()).into());
        }

        if !allowed.contains(&user.role) {
            return Err(AuthError::InsufficientPermissions.into());
        }

        Ok(user)
    }
}

/// Identity cookie: HTTP-only, strict same-site, secure in production.
pub fn auth_cookie(token: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(max_age_secs))
        .finish()
}

/// An empty, already-expired cookie of the same name clears the identity.
pub fn clear_auth_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::ZERO)
        .finish()
}
