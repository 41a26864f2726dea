//! Authentication and authorization ports.

use uuid::Uuid;

use crate::domain::Role;

/// Claims carried by an identity token.
///
/// The role here is the authorization source of truth for the request; the
/// gate re-loads the user record only to confirm the account still exists
/// and to hand callers the data for ownership checks.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

/// Token service trait for issuing and verifying identity tokens.
pub trait TokenService: Send + Sync {
    /// Issue a signed, time-boxed token for a user.
    fn issue(&self, user_id: Uuid, email: &str, role: Role) -> Result<String, AuthError>;

    /// Verify a token and decode its claims. Absence of a token is the
    /// caller's precondition, never an error of this function.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Token lifetime, for the cookie's Max-Age.
    fn ttl_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authentication token")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
