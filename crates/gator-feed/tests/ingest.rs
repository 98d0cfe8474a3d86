//! Ingestion against the in-memory store.

mod common;

use chrono::{TimeZone, Utc};
use common::{rss_document, MemoryStore};
use gator_feed::{ingest_feed, parse_feed, IngestReport, ParsedFeed, ParsedFeedItem};

const GOOD_DATE: &str = "Wed, 01 Jan 2025 10:00:00 +0000";

fn item(link: &str, pub_date: &str, description: Option<&str>) -> ParsedFeedItem {
    ParsedFeedItem {
        title: format!("Post {link}"),
        link: link.to_string(),
        pub_date: pub_date.to_string(),
        description: description.map(str::to_string),
    }
}

fn feed_of(items: Vec<ParsedFeedItem>) -> ParsedFeed {
    ParsedFeed {
        items,
        ..ParsedFeed::default()
    }
}

#[tokio::test]
async fn reingesting_the_same_feed_creates_no_duplicates() {
    let store = MemoryStore::default();
    let feed_id = store.add_feed("blog", "https://blog.example.com/rss", None);
    let xml = rss_document(
        "blog",
        &[
            ("https://blog.example.com/1", GOOD_DATE),
            ("https://blog.example.com/2", "Mon, 21 Oct 2024 08:30:00 +0200"),
        ],
    );
    let parsed = parse_feed(xml.as_bytes()).unwrap();

    let first = ingest_feed(&store, feed_id, &parsed).await;
    assert_eq!(first.created, 2);
    assert_eq!(store.posts().len(), 2);

    let second = ingest_feed(&store, feed_id, &parsed).await;
    assert_eq!(
        second,
        IngestReport {
            already_existed: 2,
            ..IngestReport::default()
        }
    );
    assert_eq!(store.posts().len(), 2);
}

#[tokio::test]
async fn one_unparseable_date_skips_only_that_item() {
    let store = MemoryStore::default();
    let feed_id = store.add_feed("blog", "https://blog.example.com/rss", None);
    let parsed = feed_of(vec![
        item("https://x/1", GOOD_DATE, None),
        item("https://x/2", "Wed, 01 Jan 2025 10:00:00 GMT", None),
        item("https://x/3", GOOD_DATE, None),
    ]);

    let report = ingest_feed(&store, feed_id, &parsed).await;

    assert_eq!(report.created, 2);
    assert_eq!(report.skipped_bad_date, 1);
    assert_eq!(report.total(), 3);
    assert!(store.post_by_url("https://x/2").is_none());
    assert!(store.post_by_url("https://x/3").is_some());
}

#[tokio::test]
async fn empty_description_is_absent_and_whitespace_is_present() {
    let store = MemoryStore::default();
    let feed_id = store.add_feed("blog", "https://blog.example.com/rss", None);
    let parsed = feed_of(vec![
        item("https://x/empty", GOOD_DATE, Some("")),
        item("https://x/blank", GOOD_DATE, Some("   ")),
        item("https://x/missing", GOOD_DATE, None),
    ]);

    ingest_feed(&store, feed_id, &parsed).await;

    assert_eq!(store.post_by_url("https://x/empty").unwrap().description, None);
    assert_eq!(
        store
            .post_by_url("https://x/blank")
            .unwrap()
            .description
            .as_deref(),
        Some("   ")
    );
    assert_eq!(store.post_by_url("https://x/missing").unwrap().description, None);
}

#[tokio::test]
async fn storage_error_does_not_stop_remaining_items() {
    let store = MemoryStore::default();
    let feed_id = store.add_feed("blog", "https://blog.example.com/rss", None);
    store.fail_post("https://x/1");
    let parsed = feed_of(vec![
        item("https://x/1", GOOD_DATE, None),
        item("https://x/2", GOOD_DATE, None),
    ]);

    let report = ingest_feed(&store, feed_id, &parsed).await;

    assert_eq!(report.failed, 1);
    assert_eq!(report.created, 1);
    assert!(store.post_by_url("https://x/2").is_some());
}

#[tokio::test]
async fn item_without_link_is_skipped() {
    let store = MemoryStore::default();
    let feed_id = store.add_feed("blog", "https://blog.example.com/rss", None);
    let parsed = feed_of(vec![
        item("", GOOD_DATE, None),
        item("https://x/ok", GOOD_DATE, None),
    ]);

    let report = ingest_feed(&store, feed_id, &parsed).await;

    assert_eq!(report.skipped_missing_link, 1);
    assert_eq!(report.created, 1);
}

#[tokio::test]
async fn stored_post_carries_feed_and_utc_time() {
    let store = MemoryStore::default();
    let feed_id = store.add_feed("blog", "https://blog.example.com/rss", None);
    let parsed = feed_of(vec![item(
        "https://x/1",
        "Mon, 21 Oct 2024 08:30:00 +0200",
        Some("&lt;b&gt;bold&lt;/b&gt;"),
    )]);

    ingest_feed(&store, feed_id, &parsed).await;

    let post = store.post_by_url("https://x/1").unwrap();
    assert_eq!(post.feed_id, feed_id);
    assert_eq!(post.title, "Post https://x/1");
    assert_eq!(
        post.published_at,
        Utc.with_ymd_and_hms(2024, 10, 21, 6, 30, 0).unwrap()
    );
    assert_eq!(post.description.as_deref(), Some("<b>bold</b>"));
}

#[tokio::test]
async fn mismatched_weekday_is_still_ingested() {
    let store = MemoryStore::default();
    let feed_id = store.add_feed("blog", "https://blog.example.com/rss", None);
    let parsed = feed_of(vec![item(
        "https://x/thursday",
        "Thu, 01 Jan 2025 10:00:00 +0000",
        None,
    )]);

    let report = ingest_feed(&store, feed_id, &parsed).await;

    assert_eq!(report.created, 1);
    assert_eq!(
        store.post_by_url("https://x/thursday").unwrap().published_at,
        Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
    );
}
