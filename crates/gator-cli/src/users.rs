//! User and session command handlers.

use anyhow::{bail, Context};
use gator_core::{AppConfig, Session, SessionError, SessionFile};
use gator_db::DbError;
use sqlx::PgPool;

/// Resolve the session file's current user to a [`Session`].
///
/// # Errors
///
/// Returns [`SessionError::NoCurrentUser`] if nobody is logged in, or
/// [`SessionError::UnknownUser`] if the recorded user no longer exists.
pub(crate) async fn current_session(
    pool: &PgPool,
    session_file: &SessionFile,
) -> anyhow::Result<Session> {
    let name = session_file.require_user_name()?;
    let user = gator_db::get_user_by_name(pool, name)
        .await?
        .ok_or_else(|| SessionError::UnknownUser(name.to_string()))?;

    Ok(Session {
        user_id: user.id,
        user_name: user.name,
    })
}

pub(crate) async fn run_register(
    pool: &PgPool,
    config: &AppConfig,
    session_file: &mut SessionFile,
    name: &str,
) -> anyhow::Result<()> {
    let user = match gator_db::create_user(pool, name).await {
        Ok(user) => user,
        Err(DbError::AlreadyExists { .. }) => bail!("user '{name}' is already registered"),
        Err(e) => return Err(e).context("failed to create user"),
    };

    session_file.set_user(&config.session_path, &user.name)?;
    tracing::debug!(user_id = %user.id, "registered user");
    println!("created user {}", user.name);
    Ok(())
}

pub(crate) async fn run_login(
    pool: &PgPool,
    config: &AppConfig,
    session_file: &mut SessionFile,
    name: &str,
) -> anyhow::Result<()> {
    let Some(user) = gator_db::get_user_by_name(pool, name).await? else {
        bail!("user '{name}' not found");
    };

    session_file.set_user(&config.session_path, &user.name)?;
    println!("current user set to {}", user.name);
    Ok(())
}

pub(crate) async fn run_reset(pool: &PgPool) -> anyhow::Result<()> {
    let removed = gator_db::reset_users(pool)
        .await
        .context("failed to reset database")?;
    println!("database reset: removed {removed} users");
    Ok(())
}

pub(crate) async fn run_users(pool: &PgPool, session_file: &SessionFile) -> anyhow::Result<()> {
    let users = gator_db::list_users(pool).await?;
    let current = session_file.current_user_name.as_deref();

    for user in &users {
        if Some(user.name.as_str()) == current {
            println!("* {} (current)", user.name);
        } else {
            println!("* {}", user.name);
        }
    }
    Ok(())
}
