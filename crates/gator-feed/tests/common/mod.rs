//! In-memory [`FeedStore`] shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use gator_db::{CreatePostOutcome, DbError, FeedRow, NewPost, PostRow};
use gator_feed::FeedStore;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    feeds: Vec<FeedRow>,
    posts: Vec<PostRow>,
    claims: Vec<Uuid>,
    failing_urls: HashSet<String>,
}

/// Mirrors the Postgres store: claims pick the oldest `last_fetched_at`
/// (never-fetched first) and posts are unique by URL.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("store mutex poisoned")
    }

    /// Adds a feed. Feeds added later get a later `created_at`.
    pub fn add_feed(&self, name: &str, url: &str, last_fetched_at: Option<DateTime<Utc>>) -> Uuid {
        let mut inner = self.lock();
        let base = DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let offset = i64::try_from(inner.feeds.len()).unwrap();
        let created_at = base + Duration::seconds(offset);
        let id = Uuid::new_v4();

        inner.feeds.push(FeedRow {
            id,
            created_at,
            updated_at: created_at,
            name: name.to_string(),
            url: url.to_string(),
            user_id: Uuid::new_v4(),
            last_fetched_at,
        });
        id
    }

    pub fn feed(&self, id: Uuid) -> FeedRow {
        self.lock()
            .feeds
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .expect("unknown feed id")
    }

    /// Feed ids in the order they were claimed.
    pub fn claims(&self) -> Vec<Uuid> {
        self.lock().claims.clone()
    }

    pub fn posts(&self) -> Vec<PostRow> {
        self.lock().posts.clone()
    }

    pub fn post_by_url(&self, url: &str) -> Option<PostRow> {
        self.lock().posts.iter().find(|p| p.url == url).cloned()
    }

    /// Makes `create_post` fail with a storage error for `url`.
    pub fn fail_post(&self, url: &str) {
        self.lock().failing_urls.insert(url.to_string());
    }
}

impl FeedStore for MemoryStore {
    async fn claim_next_feed(&self, now: DateTime<Utc>) -> Result<Option<FeedRow>, DbError> {
        let mut inner = self.lock();

        // Option orders None before Some, matching NULLS FIRST.
        let Some(feed) = inner
            .feeds
            .iter_mut()
            .min_by_key(|f| (f.last_fetched_at, f.created_at, f.id))
        else {
            return Ok(None);
        };

        feed.last_fetched_at = Some(feed.last_fetched_at.map_or(now, |prev| prev.max(now)));
        feed.updated_at = now;
        let claimed = feed.clone();
        inner.claims.push(claimed.id);
        Ok(Some(claimed))
    }

    async fn create_post(&self, post: &NewPost) -> Result<CreatePostOutcome, DbError> {
        let mut inner = self.lock();

        if inner.failing_urls.contains(&post.url) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        if inner.posts.iter().any(|p| p.url == post.url) {
            return Ok(CreatePostOutcome::AlreadyExists);
        }

        let now = Utc::now();
        let row = PostRow {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            title: post.title.clone(),
            url: post.url.clone(),
            description: post.description.clone(),
            published_at: post.published_at,
            feed_id: post.feed_id,
        };
        inner.posts.push(row.clone());
        Ok(CreatePostOutcome::Created(row))
    }
}

/// An RSS document with one item per `(link, pub_date)` pair.
pub fn rss_document(title: &str, items: &[(&str, &str)]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\"?>\n<rss version=\"2.0\"><channel>\
         <title>{title}</title><link>https://example.com/</link>\
         <description>test feed</description>"
    );
    for (link, pub_date) in items {
        xml.push_str(&format!(
            "<item><title>Post {link}</title><link>{link}</link>\
             <pubDate>{pub_date}</pubDate><description>about {link}</description></item>"
        ));
    }
    xml.push_str("</channel></rss>");
    xml
}
