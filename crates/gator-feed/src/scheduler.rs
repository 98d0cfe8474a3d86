//! The `agg` polling loop.
//!
//! Each tick claims the least recently fetched feed, fetches and parses it,
//! and ingests its items. Every failure is contained to the tick it happens
//! in; only the shutdown future ends the loop.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::client::FeedClient;
use crate::ingest::{ingest_feed, IngestReport};
use crate::parse::parse_feed;
use crate::store::FeedStore;

/// What a single [`Scheduler::tick`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// There were no feeds to claim.
    Idle,
    /// The store could not claim a feed.
    ClaimFailed,
    FetchFailed { feed_id: Uuid },
    ParseFailed { feed_id: Uuid },
    Ingested { feed_id: Uuid, report: IngestReport },
}

impl TickOutcome {
    /// The feed this tick claimed, if any.
    #[must_use]
    pub fn feed_id(&self) -> Option<Uuid> {
        match self {
            TickOutcome::Idle | TickOutcome::ClaimFailed => None,
            TickOutcome::FetchFailed { feed_id }
            | TickOutcome::ParseFailed { feed_id }
            | TickOutcome::Ingested { feed_id, .. } => Some(*feed_id),
        }
    }
}

pub struct Scheduler<S> {
    store: S,
    client: FeedClient,
}

impl<S: FeedStore> Scheduler<S> {
    pub fn new(store: S, client: FeedClient) -> Self {
        Self { store, client }
    }

    /// Process one feed.
    ///
    /// The feed's `last_fetched_at` is advanced when it is claimed, before
    /// the fetch, so a feed that keeps failing still rotates to the back of
    /// the queue.
    pub async fn tick(&self) -> TickOutcome {
        let feed = match self.store.claim_next_feed(Utc::now()).await {
            Ok(Some(feed)) => feed,
            Ok(None) => {
                tracing::info!("scheduler: no feeds to fetch");
                return TickOutcome::Idle;
            }
            Err(e) => {
                tracing::error!(error = %e, "scheduler: failed to claim next feed");
                return TickOutcome::ClaimFailed;
            }
        };

        tracing::info!(feed = %feed.name, url = %feed.url, "scheduler: fetching feed");

        let body = match self.client.fetch(&feed.url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(feed = %feed.name, url = %feed.url, error = %e, "scheduler: fetch failed");
                return TickOutcome::FetchFailed { feed_id: feed.id };
            }
        };

        let parsed = match parse_feed(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(feed = %feed.name, url = %feed.url, error = %e, "scheduler: parse failed");
                return TickOutcome::ParseFailed { feed_id: feed.id };
            }
        };

        let report = ingest_feed(&self.store, feed.id, &parsed).await;
        tracing::info!(
            feed = %feed.name,
            items = report.total(),
            created = report.created,
            already_existed = report.already_existed,
            skipped = report.skipped_bad_date + report.skipped_missing_link,
            failed = report.failed,
            "scheduler: feed ingested"
        );

        TickOutcome::Ingested {
            feed_id: feed.id,
            report,
        }
    }

    /// Tick immediately and then every `every` until `shutdown` resolves.
    ///
    /// `shutdown` is only checked between ticks, so a tick that has started
    /// always runs to completion. Ticks that fall behind are skipped rather
    /// than bunched up.
    ///
    /// # Panics
    ///
    /// Panics if `every` is zero.
    pub async fn run<F>(&self, every: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        tracing::info!(interval = ?every, "scheduler: collecting feeds");

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                _ = ticker.tick() => {}
            }
            self.tick().await;
        }

        tracing::info!("scheduler: stopped");
    }
}
