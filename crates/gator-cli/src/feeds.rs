//! Feed, follow and browse command handlers.
//!
//! All of these except `feeds` act on behalf of the logged-in user and take
//! the [`Session`] resolved in `main`.

use anyhow::{bail, Context};
use gator_core::Session;
use gator_db::{DbError, FeedWithCreatorRow};
use sqlx::PgPool;

pub(crate) async fn run_addfeed(
    pool: &PgPool,
    session: &Session,
    name: &str,
    url: &str,
) -> anyhow::Result<()> {
    let feed = match gator_db::create_feed_with_follow(pool, name, url, session.user_id).await {
        Ok(feed) => feed,
        Err(DbError::AlreadyExists { .. }) => bail!("a feed for {url} is already registered"),
        Err(e) => return Err(e).context("failed to add feed"),
    };

    println!(
        "added feed {} ({}) for {}",
        feed.name, feed.url, session.user_name
    );
    Ok(())
}

pub(crate) async fn run_feeds(pool: &PgPool) -> anyhow::Result<()> {
    let feeds = gator_db::list_feeds_with_creator(pool).await?;
    if feeds.is_empty() {
        println!("no feeds registered");
        return Ok(());
    }

    let next_id = gator_db::get_next_feed_to_fetch(pool).await?.map(|f| f.id);
    for feed in &feeds {
        println!("{}", feed_line(feed, next_id == Some(feed.id)));
    }
    Ok(())
}

pub(crate) fn feed_line(feed: &FeedWithCreatorRow, next: bool) -> String {
    let fetched = feed.last_fetched_at.map_or_else(
        || "never fetched".to_string(),
        |t| format!("fetched {}", t.format("%Y-%m-%d %H:%M UTC")),
    );
    let marker = if next { " (next to fetch)" } else { "" };
    format!(
        "* {} ({}) added by {}, {fetched}{marker}",
        feed.name, feed.url, feed.user_name
    )
}

pub(crate) async fn run_follow(pool: &PgPool, session: &Session, url: &str) -> anyhow::Result<()> {
    let Some(feed) = gator_db::get_feed_by_url(pool, url).await? else {
        bail!("no feed registered for {url}; add it with `gator addfeed`");
    };

    let follow = match gator_db::create_feed_follow(pool, session.user_id, feed.id).await {
        Ok(follow) => follow,
        Err(DbError::AlreadyExists { .. }) => bail!("already following {url}"),
        Err(e) => return Err(e).context("failed to follow feed"),
    };

    println!("{} now follows {}", follow.user_name, follow.feed_name);
    Ok(())
}

pub(crate) async fn run_following(pool: &PgPool, session: &Session) -> anyhow::Result<()> {
    let follows = gator_db::list_feed_follows_for_user(pool, session.user_id).await?;

    println!("{} is following:", session.user_name);
    for follow in &follows {
        println!("* {} ({})", follow.feed_name, follow.feed_url);
    }
    Ok(())
}

pub(crate) async fn run_unfollow(
    pool: &PgPool,
    session: &Session,
    url: &str,
) -> anyhow::Result<()> {
    match gator_db::delete_feed_follow(pool, session.user_id, url).await {
        Ok(()) => {
            println!("{} unfollowed {url}", session.user_name);
            Ok(())
        }
        Err(DbError::NotFound) => bail!("{} is not following {url}", session.user_name),
        Err(e) => Err(e).context("failed to unfollow feed"),
    }
}

pub(crate) async fn run_browse(pool: &PgPool, session: &Session, limit: i64) -> anyhow::Result<()> {
    let posts = gator_db::list_posts_for_user(pool, session.user_id, limit).await?;
    if posts.is_empty() {
        println!("no posts yet; follow some feeds and run `gator agg`");
        return Ok(());
    }

    for post in &posts {
        println!();
        println!("Title: {}", post.title);
        println!("Blog: {}", post.feed_name);
        if let Some(description) = &post.description {
            println!("Description: {description}");
        }
        println!("Link: {}", post.url);
        println!("Published: {}", post.published_at.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}
