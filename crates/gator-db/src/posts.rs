//! Database operations for the `posts` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const POSTS_URL_CONSTRAINT: &str = "posts_url_key";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_at: DateTime<Utc>,
    pub feed_id: Uuid,
}

/// A post joined with the name of the feed it came from.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostWithFeedRow {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_at: DateTime<Utc>,
    pub feed_name: String,
}

/// Fields needed to insert a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub url: String,
    /// `None` when the feed item carried no description.
    pub description: Option<String>,
    pub published_at: DateTime<Utc>,
    pub feed_id: Uuid,
}

/// Result of [`create_post`]. A URL collision is not an error.
#[derive(Debug, Clone)]
pub enum CreatePostOutcome {
    Created(PostRow),
    AlreadyExists,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Inserts a post unless one with the same URL already exists.
///
/// # Errors
///
/// Returns [`DbError::AlreadyExists`] for a unique violation other than the
/// URL (e.g. an id collision), or [`DbError::Sqlx`] if the insert fails.
pub async fn create_post(pool: &PgPool, post: &NewPost) -> Result<CreatePostOutcome, DbError> {
    let result = sqlx::query_as::<_, PostRow>(
        "INSERT INTO posts (id, title, url, description, published_at, feed_id) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT ON CONSTRAINT posts_url_key DO NOTHING \
         RETURNING id, created_at, updated_at, title, url, description, published_at, feed_id",
    )
    .bind(Uuid::new_v4())
    .bind(&post.title)
    .bind(&post.url)
    .bind(post.description.as_deref())
    .bind(post.published_at)
    .bind(post.feed_id)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some(row)) => Ok(CreatePostOutcome::Created(row)),
        Ok(None) => Ok(CreatePostOutcome::AlreadyExists),
        Err(err) => match DbError::from_write(err) {
            DbError::AlreadyExists { constraint } if constraint == POSTS_URL_CONSTRAINT => {
                Ok(CreatePostOutcome::AlreadyExists)
            }
            other => Err(other),
        },
    }
}

/// Returns the newest posts from feeds `user_id` follows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_posts_for_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<PostWithFeedRow>, DbError> {
    let rows = sqlx::query_as::<_, PostWithFeedRow>(
        "SELECT p.id, p.title, p.url, p.description, p.published_at, f.name AS feed_name \
         FROM posts p \
         JOIN feeds f ON f.id = p.feed_id \
         JOIN feed_follows ff ON ff.feed_id = p.feed_id \
         WHERE ff.user_id = $1 \
         ORDER BY p.published_at DESC, p.id \
         LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Counts the posts stored for one feed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_posts_for_feed(pool: &PgPool, feed_id: Uuid) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE feed_id = $1")
        .bind(feed_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}
