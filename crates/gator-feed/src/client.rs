//! HTTP client for fetching RSS documents.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;

use crate::error::FeedError;

/// Value sent in the `Accept` header.
pub const RSS_CONTENT_TYPE: &str = "application/rss+xml";

pub const DEFAULT_USER_AGENT: &str = "gator/0.1 (+feed-aggregator)";

/// Fetches feed documents over HTTP.
///
/// A single client is shared by every tick so connections are pooled.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    /// Creates a client whose requests give up after `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, FeedError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// GETs `url` and returns the raw body.
    ///
    /// A response that declares a non-XML `Content-Type` is rejected; a
    /// response without one is accepted and left to the parser.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Http`] on network failure or timeout.
    /// - [`FeedError::UnexpectedStatus`] for a non-2xx status.
    /// - [`FeedError::UnexpectedContentType`] for an HTML, JSON, … response.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, RSS_CONTENT_TYPE)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type = String::from_utf8_lossy(content_type.as_bytes()).into_owned();
            if !content_type.to_ascii_lowercase().contains("xml") {
                return Err(FeedError::UnexpectedContentType {
                    content_type,
                    url: url.to_string(),
                });
            }
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
