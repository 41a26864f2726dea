use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Avatar assigned to accounts that never uploaded one.
pub const DEFAULT_AVATAR: &str = "https://cdn.quill.dev/avatars/default.png";

/// Access tier of an account.
///
/// Routes authorize by explicit membership in an allowed set of roles,
/// never by comparing tiers numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Author,
    Admin,
}

/// Roles allowed on author-tier routes (profile, like toggle).
pub const AUTHOR_TIER: &[Role] = &[Role::Author, Role::Admin];

/// Roles allowed on admin routes.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Author => "author",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "author" => Ok(Role::Author),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// Optional links shown on an author's public profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// User entity - a reader, author or administrator account.
///
/// The password hash never leaves the server: client-facing representations
/// are built from the safe field subset (see `UserResponse` in quill-shared).
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Stored lowercase; lookups normalize before comparing.
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
    pub bio: String,
    pub role: Role,
    pub social: SocialLinks,
    pub verified: bool,
    pub locked: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub login_attempts: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    ///
    /// `password_hash` must already be hashed; the domain never sees
    /// plaintext credentials.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email: email.to_lowercase(),
            password_hash,
            avatar: DEFAULT_AVATAR.to_string(),
            bio: String::new(),
            role: Role::User,
            social: SocialLinks::default(),
            verified: false,
            locked: false,
            last_login_at: None,
            login_attempts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bookkeeping for a successful login: attempt counter resets and the
    /// last-login timestamp is stamped.
    pub fn record_login(&mut self) {
        self.login_attempts = 0;
        self.last_login_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Bookkeeping for a failed credential check.
    pub fn record_failed_login(&mut self) {
        self.login_attempts += 1;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_defaults() {
        let user = User::new("alice".into(), "Alice@Example.COM".into(), "hash".into());
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.avatar, DEFAULT_AVATAR);
        assert!(!user.locked);
        assert_eq!(user.login_attempts, 0);
    }

    #[test]
    fn login_bookkeeping() {
        let mut user = User::new("bob".into(), "bob@example.com".into(), "hash".into());
        user.record_failed_login();
        user.record_failed_login();
        assert_eq!(user.login_attempts, 2);

        user.record_login();
        assert_eq!(user.login_attempts, 0);
        assert!(user.last_login_at.is_some());
    }

    #[test]
    fn role_round_trip() {
        for role in [Role::User, Role::Author, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("superuser".parse::<Role>().is_err());
    }
}
