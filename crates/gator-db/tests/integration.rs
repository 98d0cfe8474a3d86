//! Offline unit tests for gator-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use gator_core::AppConfig;
use gator_db::{FeedRow, NewPost, PoolConfig};
use uuid::Uuid;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: Some("postgres://example".to_string()),
        log_level: "info".to_string(),
        session_path: PathBuf::from("/tmp/.gatorconfig.json"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        fetch_timeout_secs: 10,
        user_agent: "ua".to_string(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`FeedRow`] has all expected fields
/// with the correct types. No database required.
#[test]
fn feed_row_has_expected_fields() {
    let row = FeedRow {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        name: "Boot.dev Blog".to_string(),
        url: "https://blog.boot.dev/index.xml".to_string(),
        user_id: Uuid::new_v4(),
        last_fetched_at: None,
    };

    assert_eq!(row.name, "Boot.dev Blog");
    assert!(row.last_fetched_at.is_none());
}

#[test]
fn new_post_distinguishes_absent_and_blank_descriptions() {
    let feed_id = Uuid::new_v4();
    let published_at = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
    let absent = NewPost {
        title: "A".to_string(),
        url: "https://example.com/a".to_string(),
        description: None,
        published_at,
        feed_id,
    };
    let blank = NewPost {
        description: Some("   ".to_string()),
        ..absent.clone()
    };

    assert_ne!(absent, blank);
}
