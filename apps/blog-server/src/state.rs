//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CommentRepository, PasswordService, PostRepository, ProfileRepository, RateLimiter,
    TokenService, UserRepository,
};
use quill_core::service::{AccountService, BlogService};
use quill_infra::database::DatabaseConnections;
use quill_infra::{Argon2PasswordService, InMemoryRateLimiter, InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use quill_infra::database::{
    PostgresCommentRepository, PostgresPostRepository, PostgresProfileRepository,
    PostgresUserRepository,
};

use crate::config::AppConfig;

/// One implementation of every repository port.
struct Repositories {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            profiles: store.clone(),
            posts: store.clone(),
            comments: store,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(db: &DatabaseConnections) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(db.main.clone())),
            profiles: Arc::new(PostgresProfileRepository::new(db.main.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.main.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.main.clone())),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: BlogService,
    pub accounts: AccountService,
    pub tokens: Arc<dyn TokenService>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the state, connecting to PostgreSQL when configured.
    ///
    /// A missing or unreachable database falls back to the in-memory store.
    pub async fn new(config: &AppConfig) -> Self {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
            return Self::in_memory(config, Arc::new(InMemoryStore::new()));
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => Self::with_database(config, Arc::new(connections)),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::in_memory(config, Arc::new(InMemoryStore::new()))
            }
        }
    }

    #[cfg(feature = "postgres")]
    fn with_database(config: &AppConfig, db: Arc<DatabaseConnections>) -> Self {
        let repos = Repositories::postgres(&db);
        Self::assemble(config, repos, Some(db))
    }

    #[cfg(not(feature = "postgres"))]
    fn with_database(config: &AppConfig, _db: Arc<DatabaseConnections>) -> Self {
        Self::in_memory(config, Arc::new(InMemoryStore::new()))
    }

    /// State backed by the given in-memory store.
    pub fn in_memory(config: &AppConfig, store: Arc<InMemoryStore>) -> Self {
        Self::assemble(config, Repositories::in_memory(store), None)
    }

    fn assemble(
        config: &AppConfig,
        repos: Repositories,
        db: Option<Arc<DatabaseConnections>>,
    ) -> Self {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        let state = Self {
            blog: BlogService::new(repos.posts, repos.comments, repos.users.clone()),
            accounts: AccountService::new(repos.users, repos.profiles, passwords),
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            rate_limiter: Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone())),
            db,
        };

        tracing::info!(database = state.db.is_some(), "Application state initialized");
        state
    }
}
