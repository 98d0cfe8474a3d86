//! Turning parsed feed items into stored posts.

use chrono::Utc;
use gator_db::{CreatePostOutcome, NewPost};
use uuid::Uuid;

use crate::error::FeedError;
use crate::parse::{unescape_html, ParsedFeed, ParsedFeedItem};
use crate::store::FeedStore;
use crate::time::normalize_pub_date;

/// Per-item tally of one [`ingest_feed`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub created: usize,
    pub already_existed: usize,
    pub skipped_bad_date: usize,
    pub skipped_missing_link: usize,
    pub failed: usize,
}

impl IngestReport {
    /// Number of items that were looked at.
    #[must_use]
    pub fn total(&self) -> usize {
        self.created
            + self.already_existed
            + self.skipped_bad_date
            + self.skipped_missing_link
            + self.failed
    }
}

/// Map a raw item description to what gets stored.
///
/// An empty string means no description; anything else, including
/// whitespace, is kept with HTML entities resolved.
#[must_use]
pub fn normalize_description(raw: Option<&str>) -> Option<String> {
    match raw {
        None | Some("") => None,
        Some(text) => Some(unescape_html(text)),
    }
}

/// Build the post to insert for `item`.
///
/// # Errors
///
/// - [`FeedError::MissingLink`] if the item has no link, since the link is
///   the post's identity.
/// - [`FeedError::TimeParse`] if `pubDate` is missing or unrecognised.
pub fn build_post(feed_id: Uuid, item: &ParsedFeedItem) -> Result<NewPost, FeedError> {
    if item.link.is_empty() {
        return Err(FeedError::MissingLink {
            title: item.title.clone(),
        });
    }

    let published_at = normalize_pub_date(&item.pub_date)?.with_timezone(&Utc);

    Ok(NewPost {
        title: item.title.clone(),
        url: item.link.clone(),
        description: normalize_description(item.description.as_deref()),
        published_at,
        feed_id,
    })
}

/// Store every item of `feed` as a post belonging to `feed_id`.
///
/// Never fails: a bad item or a storage error is logged and the remaining
/// items are still processed. Posts whose URL is already stored count as
/// `already_existed`, so re-ingesting the same document is a no-op.
pub async fn ingest_feed<S: FeedStore>(
    store: &S,
    feed_id: Uuid,
    feed: &ParsedFeed,
) -> IngestReport {
    let mut report = IngestReport::default();

    for item in &feed.items {
        let post = match build_post(feed_id, item) {
            Ok(post) => post,
            Err(FeedError::MissingLink { title }) => {
                tracing::warn!(%feed_id, title = %title, "ingest: skipping item without a link");
                report.skipped_missing_link += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(%feed_id, url = %item.link, error = %e, "ingest: skipping item");
                report.skipped_bad_date += 1;
                continue;
            }
        };

        match store.create_post(&post).await {
            Ok(CreatePostOutcome::Created(row)) => {
                tracing::debug!(%feed_id, post_id = %row.id, url = %row.url, "ingest: post created");
                report.created += 1;
            }
            Ok(CreatePostOutcome::AlreadyExists) => {
                tracing::debug!(%feed_id, url = %post.url, "ingest: post already stored");
                report.already_existed += 1;
            }
            Err(e) => {
                tracing::error!(%feed_id, url = %post.url, error = %e, "ingest: failed to store post");
                report.failed += 1;
            }
        }
    }

    report
}
