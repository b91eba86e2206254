//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use quill_core::services::FeedConfig;
use quill_infra::{JwtConfig, PasswordHashConfig};
use quill_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Unset means the in-memory store.
    pub database: Option<DatabaseConfig>,
    /// Apply pending schema migrations when connecting.
    pub run_migrations: bool,
    /// Unset means the in-process feed cache.
    pub redis_url: Option<String>,
    pub feed: FeedConfig,
    pub jwt: JwtConfig,
    pub passwords: PasswordHashConfig,
    pub mail_from: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_or("DB_MAX_CONNECTIONS", 20),
            min_connections: parse_or("DB_MIN_CONNECTIONS", 2),
        });

        let feed = FeedConfig {
            cache_ttl: Duration::from_secs(parse_or(
                "FEED_CACHE_TTL_SECS",
                FeedConfig::default().cache_ttl.as_secs(),
            )),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080),
            database,
            run_migrations: parse_or("RUN_MIGRATIONS", true),
            redis_url: env::var("REDIS_URL").ok().filter(|u| !u.is_empty()),
            feed,
            jwt: JwtConfig::from_env(),
            passwords: PasswordHashConfig::from_env(),
            mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| "noreply@quill.local".to_string()),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
