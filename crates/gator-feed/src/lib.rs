//! Feed polling and ingestion.
//!
//! [`Scheduler`] claims one feed per tick through a [`FeedStore`], fetches it
//! with [`FeedClient`], parses it with [`parse_feed`] and hands the result to
//! [`ingest_feed`].

pub mod client;
pub mod error;
pub mod ingest;
pub mod parse;
pub mod scheduler;
pub mod store;
pub mod time;

pub use client::{FeedClient, DEFAULT_USER_AGENT, RSS_CONTENT_TYPE};
pub use error::FeedError;
pub use ingest::{build_post, ingest_feed, normalize_description, IngestReport};
pub use parse::{parse_feed, ChannelInfo, ParsedFeed, ParsedFeedItem};
pub use scheduler::{Scheduler, TickOutcome};
pub use store::FeedStore;
pub use time::normalize_pub_date;
