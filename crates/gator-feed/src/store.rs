use std::future::Future;

use chrono::{DateTime, Utc};
use gator_db::{CreatePostOutcome, DbError, FeedRow, NewPost};
use sqlx::PgPool;

/// Persistence operations the scheduler and ingestor need.
///
/// Implemented for [`PgPool`]; tests substitute an in-memory store.
pub trait FeedStore: Send + Sync {
    /// Atomically pick the feed most in need of a fetch and stamp its
    /// `last_fetched_at` with `now`. `None` when there are no feeds.
    fn claim_next_feed(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<FeedRow>, DbError>> + Send;

    /// Insert a post, reporting a duplicate URL as
    /// [`CreatePostOutcome::AlreadyExists`].
    fn create_post(
        &self,
        post: &NewPost,
    ) -> impl Future<Output = Result<CreatePostOutcome, DbError>> + Send;
}

impl FeedStore for PgPool {
    async fn claim_next_feed(&self, now: DateTime<Utc>) -> Result<Option<FeedRow>, DbError> {
        gator_db::claim_next_feed(self, now).await
    }

    async fn create_post(&self, post: &NewPost) -> Result<CreatePostOutcome, DbError> {
        gator_db::create_post(self, post).await
    }
}
