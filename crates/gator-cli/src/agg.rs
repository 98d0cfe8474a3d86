//! The `agg` command: run the feed scheduler until interrupted.

use std::time::Duration;

use gator_core::AppConfig;
use gator_feed::{FeedClient, Scheduler};
use sqlx::PgPool;

pub(crate) async fn run_agg(
    pool: PgPool,
    config: &AppConfig,
    every: Duration,
) -> anyhow::Result<()> {
    let client = FeedClient::new(config.fetch_timeout_secs, &config.user_agent)?;
    println!("Collecting feeds every {every:?}");

    Scheduler::new(pool, client)
        .run(every, shutdown_signal())
        .await;
    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM. A handler that cannot be
/// installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping after the current tick");
}
