//! Database operations for the `feed_follows` join table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A follow joined with the user and feed names.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedFollowDetailRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub feed_id: Uuid,
    pub user_name: String,
    pub feed_name: String,
    pub feed_url: String,
}

/// Makes `user_id` follow `feed_id`.
///
/// # Errors
///
/// Returns [`DbError::AlreadyExists`] if the pair is already followed, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn create_feed_follow(
    pool: &PgPool,
    user_id: Uuid,
    feed_id: Uuid,
) -> Result<FeedFollowDetailRow, DbError> {
    sqlx::query_as::<_, FeedFollowDetailRow>(
        "WITH inserted AS ( \
             INSERT INTO feed_follows (id, user_id, feed_id) VALUES ($1, $2, $3) \
             RETURNING id, created_at, user_id, feed_id \
         ) \
         SELECT i.id, i.created_at, i.user_id, i.feed_id, \
                u.name AS user_name, f.name AS feed_name, f.url AS feed_url \
         FROM inserted i \
         JOIN users u ON u.id = i.user_id \
         JOIN feeds f ON f.id = i.feed_id",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(feed_id)
    .fetch_one(pool)
    .await
    .map_err(DbError::from_write)
}

/// Returns the feeds `user_id` follows, in the order they were followed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_feed_follows_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<FeedFollowDetailRow>, DbError> {
    let rows = sqlx::query_as::<_, FeedFollowDetailRow>(
        "SELECT ff.id, ff.created_at, ff.user_id, ff.feed_id, \
                u.name AS user_name, f.name AS feed_name, f.url AS feed_url \
         FROM feed_follows ff \
         JOIN users u ON u.id = ff.user_id \
         JOIN feeds f ON f.id = ff.feed_id \
         WHERE ff.user_id = $1 \
         ORDER BY ff.created_at, ff.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Removes the follow between `user_id` and the feed at `feed_url`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the user does not follow that feed, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_feed_follow(
    pool: &PgPool,
    user_id: Uuid,
    feed_url: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "DELETE FROM feed_follows ff \
         USING feeds f \
         WHERE ff.feed_id = f.id AND ff.user_id = $1 AND f.url = $2",
    )
    .bind(user_id)
    .bind(feed_url)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
