//! Database operations for the `users` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
}

/// Inserts a new user.
///
/// # Errors
///
/// Returns [`DbError::AlreadyExists`] if the name is taken, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn create_user(pool: &PgPool, name: &str) -> Result<UserRow, DbError> {
    sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (id, name) VALUES ($1, $2) \
         RETURNING id, created_at, updated_at, name",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(DbError::from_write)
}

/// Returns the user with the given name, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_user_by_name(pool: &PgPool, name: &str) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, created_at, updated_at, name FROM users WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all users ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_users(pool: &PgPool) -> Result<Vec<UserRow>, DbError> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, created_at, updated_at, name FROM users ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes every user. Feeds, follows and posts go with them via cascades.
///
/// Returns the number of users removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn reset_users(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM users").execute(pool).await?;
    Ok(result.rows_affected())
}
