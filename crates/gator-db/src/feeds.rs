//! Database operations for the `feeds` table.
//!
//! Feed selection for the fetch loop lives here too. The scheduler uses
//! [`claim_next_feed`], which picks and marks a feed in one statement.
//! [`get_next_feed_to_fetch`] runs the same selection without marking, for
//! the `feeds` listing.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `feeds` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub url: String,
    pub user_id: Uuid,
    /// `None` until the feed has been claimed by the fetch loop once.
    pub last_fetched_at: Option<DateTime<Utc>>,
}

/// A feed joined with the name of the user who added it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedWithCreatorRow {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub user_name: String,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

const FEED_COLUMNS: &str = "id, created_at, updated_at, name, url, user_id, last_fetched_at";

// Oldest fetch first; never-fetched feeds ahead of everything else.
const NEXT_FEED_ORDER: &str = "ORDER BY last_fetched_at ASC NULLS FIRST, created_at ASC, id ASC";

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts a feed owned by `user_id`.
///
/// # Errors
///
/// Returns [`DbError::AlreadyExists`] if the URL is already registered, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn create_feed(
    pool: &PgPool,
    name: &str,
    url: &str,
    user_id: Uuid,
) -> Result<FeedRow, DbError> {
    sqlx::query_as::<_, FeedRow>(&format!(
        "INSERT INTO feeds (id, name, url, user_id) VALUES ($1, $2, $3, $4) \
         RETURNING {FEED_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(url)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(DbError::from_write)
}

/// Inserts a feed and a follow for its owner in one transaction.
///
/// # Errors
///
/// Returns [`DbError::AlreadyExists`] if the URL is already registered, or
/// [`DbError::Sqlx`] if either insert or the commit fails. Nothing is
/// written on error.
pub async fn create_feed_with_follow(
    pool: &PgPool,
    name: &str,
    url: &str,
    user_id: Uuid,
) -> Result<FeedRow, DbError> {
    let mut tx = pool.begin().await?;

    let feed = sqlx::query_as::<_, FeedRow>(&format!(
        "INSERT INTO feeds (id, name, url, user_id) VALUES ($1, $2, $3, $4) \
         RETURNING {FEED_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(url)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(DbError::from_write)?;

    sqlx::query("INSERT INTO feed_follows (id, user_id, feed_id) VALUES ($1, $2, $3)")
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(feed.id)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from_write)?;

    tx.commit().await?;
    Ok(feed)
}

/// Sets `last_fetched_at` on a feed. The timestamp never moves backwards.
///
/// The fetch loop goes through [`claim_next_feed`] instead; this is for
/// seeding fetch order in tests.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no feed has this id, or [`DbError::Sqlx`]
/// if the update fails.
pub async fn mark_feed_fetched(
    pool: &PgPool,
    id: Uuid,
    fetched_at: DateTime<Utc>,
) -> Result<FeedRow, DbError> {
    sqlx::query_as::<_, FeedRow>(&format!(
        "UPDATE feeds \
         SET last_fetched_at = GREATEST(last_fetched_at, $2), updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {FEED_COLUMNS}"
    ))
    .bind(id)
    .bind(fetched_at)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Selects the least recently fetched feed and marks it fetched at
/// `fetched_at`, atomically.
///
/// Rows locked by a concurrent claim are skipped, so two callers never
/// receive the same feed from one round of claims. Returns `None` when there
/// are no feeds (or all are currently locked).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails.
pub async fn claim_next_feed(
    pool: &PgPool,
    fetched_at: DateTime<Utc>,
) -> Result<Option<FeedRow>, DbError> {
    let row = sqlx::query_as::<_, FeedRow>(&format!(
        "UPDATE feeds \
         SET last_fetched_at = GREATEST(last_fetched_at, $1), updated_at = NOW() \
         WHERE id = ( \
             SELECT id FROM feeds {NEXT_FEED_ORDER} LIMIT 1 FOR UPDATE SKIP LOCKED \
         ) \
         RETURNING {FEED_COLUMNS}"
    ))
    .bind(fetched_at)
    .fetch_optional(pool)
    .await?;

    if let Some(feed) = &row {
        tracing::debug!(feed = %feed.url, "claimed feed for fetching");
    }

    Ok(row)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns the feed that [`claim_next_feed`] would pick, without marking it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_next_feed_to_fetch(pool: &PgPool) -> Result<Option<FeedRow>, DbError> {
    let row = sqlx::query_as::<_, FeedRow>(&format!(
        "SELECT {FEED_COLUMNS} FROM feeds {NEXT_FEED_ORDER} LIMIT 1"
    ))
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns a feed by its URL, or `None` if not registered.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_feed_by_url(pool: &PgPool, url: &str) -> Result<Option<FeedRow>, DbError> {
    let row = sqlx::query_as::<_, FeedRow>(&format!(
        "SELECT {FEED_COLUMNS} FROM feeds WHERE url = $1"
    ))
    .bind(url)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns every feed with the name of the user who added it, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_feeds_with_creator(pool: &PgPool) -> Result<Vec<FeedWithCreatorRow>, DbError> {
    let rows = sqlx::query_as::<_, FeedWithCreatorRow>(
        "SELECT f.id, f.name, f.url, u.name AS user_name, f.last_fetched_at \
         FROM feeds f \
         JOIN users u ON u.id = f.user_id \
         ORDER BY f.created_at, f.id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
