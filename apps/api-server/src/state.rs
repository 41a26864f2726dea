//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CategoryRepository, PasswordService, PostRepository, TokenService, UserRepository,
};
use quill_infra::auth::{Argon2PasswordService, JwtTokenService};
use quill_infra::database::{
    DatabaseConnection, InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository,
    PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;
use crate::middleware::auth::AuthGate;

type Repositories = (
    Arc<dyn UserRepository>,
    Arc<dyn PostRepository>,
    Arc<dyn CategoryRepository>,
);

/// Shared application state, built once at startup and injected into
/// handlers; nothing in here is mutated after construction.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub gate: AuthGate,
    pub cookie_secure: bool,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (users, posts, categories) = match &config.database {
            Some(db_config) => match DatabaseConnection::init(db_config).await {
                Ok(connection) => {
                    let conn = connection.conn;
                    (
                        Arc::new(PostgresUserRepository::new(conn.clone()))
                            as Arc<dyn UserRepository>,
                        Arc::new(PostgresPostRepository::new(conn.clone()))
                            as Arc<dyn PostRepository>,
                        Arc::new(PostgresCategoryRepository::new(conn))
                            as Arc<dyn CategoryRepository>,
                    )
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    memory_repositories()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                memory_repositories()
            }
        };

        let state = Self::assemble(
            users,
            posts,
            categories,
            Arc::new(JwtTokenService::from_env()),
            config.cookie_secure,
        );

        tracing::info!("Application state initialized");
        state
    }

    /// State backed entirely by in-memory repositories; the substitutable
    /// fake used by handler tests.
    pub fn in_memory(tokens: Arc<dyn TokenService>) -> Self {
        let (users, posts, categories) = memory_repositories();
        Self::assemble(users, posts, categories, tokens, false)
    }

    fn assemble(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        tokens: Arc<dyn TokenService>,
        cookie_secure: bool,
    ) -> Self {
        let gate = AuthGate::new(users.clone(), tokens.clone());
        Self {
            users,
            posts,
            categories,
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
            gate,
            cookie_secure,
        }
    }
}

fn memory_repositories() -> Repositories {
    let posts = InMemoryPostRepository::new();
    let categories = InMemoryCategoryRepository::new(posts.store());
    (
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(posts),
        Arc::new(categories),
    )
}
