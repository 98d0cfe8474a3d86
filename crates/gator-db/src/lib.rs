use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

pub mod feed_follows;
pub mod feeds;
pub mod posts;
pub mod users;

pub use feed_follows::{
    create_feed_follow, delete_feed_follow, list_feed_follows_for_user, FeedFollowDetailRow,
};
pub use feeds::{
    claim_next_feed, create_feed, create_feed_with_follow, get_feed_by_url,
    get_next_feed_to_fetch, list_feeds_with_creator, mark_feed_fetched, FeedRow,
    FeedWithCreatorRow,
};
pub use posts::{
    count_posts_for_feed, create_post, list_posts_for_user, CreatePostOutcome, NewPost,
    PostRow, PostWithFeedRow,
};
pub use users::{create_user, get_user_by_name, list_users, reset_users, UserRow};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

// Path relative to crates/gator-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &gator_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    /// A unique constraint rejected the write.
    #[error("duplicate value violates unique constraint {constraint}")]
    AlreadyExists { constraint: String },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    /// Convert a raw sqlx error, folding unique violations into
    /// [`DbError::AlreadyExists`].
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        match unique_violation_constraint(&err) {
            Some(constraint) => DbError::AlreadyExists { constraint },
            None => DbError::Sqlx(err),
        }
    }
}

/// Returns the violated constraint name when `err` is a Postgres unique violation.
fn unique_violation_constraint(err: &sqlx::Error) -> Option<String> {
    let db_err = err.as_database_error()?;
    if db_err.code().as_deref() != Some(UNIQUE_VIOLATION) {
        return None;
    }
    Some(db_err.constraint().unwrap_or("unknown").to_string())
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run all pending migrations against the pool.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
