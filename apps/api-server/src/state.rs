//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    AuthorRepository, Cache, CommentRepository, FollowRepository, GroupRepository, Mailer,
    PasswordService, PostRepository, TokenService,
};
use quill_core::services::{
    AccountService, FeedConfig, FeedService, FollowService, PublishingService,
};
use quill_infra::{Argon2PasswordService, InMemoryCache, InMemoryStore, JwtTokenService, LogMailer};

#[cfg(feature = "postgres")]
use migration::{DbErr, Migrator, MigratorTrait};
#[cfg(feature = "postgres")]
use quill_infra::database::{
    DatabaseConfig, DatabaseConnections, PostgresAuthorRepository, PostgresCommentRepository,
    PostgresFollowRepository, PostgresGroupRepository, PostgresPostRepository,
};
#[cfg(feature = "redis")]
use quill_infra::{RedisCache, RedisConfig};

use crate::config::AppConfig;

/// One handle per repository port, all backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub authors: Arc<dyn AuthorRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            authors: store.clone(),
            groups: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            follows: store,
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(connections: &DatabaseConnections) -> Self {
        let db = &connections.main;
        Self {
            authors: Arc::new(PostgresAuthorRepository::new(db.clone())),
            groups: Arc::new(PostgresGroupRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.clone())),
            follows: Arc::new(PostgresFollowRepository::new(db.clone())),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub feed: FeedService,
    pub follows: FollowService,
    pub publishing: PublishingService,
    pub accounts: AccountService,
    /// Group choices offered on the post form.
    pub groups: Arc<dyn GroupRepository>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the state from configuration, falling back to in-memory backends
    /// for anything that is not configured or not reachable.
    pub async fn new(config: &AppConfig) -> Self {
        let cache = Self::init_cache(config).await;

        #[cfg(feature = "postgres")]
        let (repos, db) = match &config.database {
            Some(db_config) => match connect_database(db_config, config.run_migrations).await {
                Ok(connections) => {
                    let repos = Repositories::postgres(&connections);
                    (repos, Some(Arc::new(connections)))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Database unavailable. Using in-memory store.");
                    (Repositories::in_memory(), None)
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
                (Repositories::in_memory(), None)
            }
        };

        #[cfg(not(feature = "postgres"))]
        let repos = {
            if config.database.is_some() {
                tracing::warn!("Built without postgres support; DATABASE_URL is ignored.");
            }
            Repositories::in_memory()
        };

        let state = Self::from_parts(
            repos,
            cache,
            Arc::new(JwtTokenService::new(config.jwt.clone())),
            Arc::new(Argon2PasswordService::with_config(&config.passwords)),
            Arc::new(LogMailer::new(config.mail_from.clone())),
            config.feed.clone(),
        );

        #[cfg(feature = "postgres")]
        let state = Self { db, ..state };

        tracing::info!("Application state initialized");
        state
    }

    /// Wire the services over already-built adapters.
    pub fn from_parts(
        repos: Repositories,
        cache: Arc<dyn Cache>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        mailer: Arc<dyn Mailer>,
        feed_config: FeedConfig,
    ) -> Self {
        let follows = FollowService::new(repos.authors.clone(), repos.follows.clone());

        let feed = FeedService::new(
            repos.authors.clone(),
            repos.groups.clone(),
            repos.posts.clone(),
            repos.comments.clone(),
            follows.clone(),
            cache,
            feed_config,
        );

        let publishing = PublishingService::new(
            repos.groups.clone(),
            repos.posts.clone(),
            repos.comments.clone(),
        );

        let accounts = AccountService::new(repos.authors.clone(), passwords, tokens, mailer);

        Self {
            feed,
            follows,
            publishing,
            accounts,
            groups: repos.groups,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    pub fn tokens(&self) -> &Arc<dyn TokenService> {
        self.accounts.tokens()
    }

    async fn init_cache(config: &AppConfig) -> Arc<dyn Cache> {
        #[cfg(feature = "redis")]
        if let Some(url) = &config.redis_url {
            match RedisCache::new(RedisConfig::from_env(url.clone())).await {
                Ok(cache) => return Arc::new(cache),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to connect to Redis. Using in-memory cache.");
                }
            }
        }

        #[cfg(not(feature = "redis"))]
        if config.redis_url.is_some() {
            tracing::warn!("Built without redis support; REDIS_URL is ignored.");
        }

        Arc::new(InMemoryCache::new())
    }
}

/// Open the pool and bring the schema up to date. A pool whose schema could
/// not be migrated is never handed to the repositories.
#[cfg(feature = "postgres")]
async fn connect_database(
    config: &DatabaseConfig,
    run_migrations: bool,
) -> Result<DatabaseConnections, DbErr> {
    let connections = DatabaseConnections::init(config).await?;
    if run_migrations {
        apply_migrations(&connections).await?;
    }
    Ok(connections)
}

#[cfg(feature = "postgres")]
async fn apply_migrations(connections: &DatabaseConnections) -> Result<(), DbErr> {
    Migrator::up(&connections.main, None).await?;
    tracing::info!("Database schema up to date");
    Ok(())
}

#[cfg(all(test, feature = "postgres"))]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_failed_migration_is_reported() {
        let connections = DatabaseConnections {
            main: MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        };

        assert!(apply_migrations(&connections).await.is_err());
    }
}
