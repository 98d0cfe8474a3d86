mod agg;
mod feeds;
mod users;

use std::time::Duration;

use clap::{Parser, Subcommand};
use gator_core::SessionFile;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gator")]
#[command(about = "RSS feed aggregator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a user and log in as it
    Register { name: String },
    /// Switch the current user
    Login { name: String },
    /// Delete every user, with their feeds, follows and posts
    Reset,
    /// List registered users
    Users,
    /// Fetch feeds forever, one per interval
    Agg {
        /// Time between fetches, e.g. 30s, 1m30s, 2h
        #[arg(value_parser = gator_core::parse_interval)]
        interval: Duration,
    },
    /// Register a feed and follow it
    Addfeed { name: String, url: String },
    /// List every registered feed
    Feeds,
    /// Follow an already registered feed
    Follow { url: String },
    /// List the feeds the current user follows
    Following,
    /// Stop following a feed
    Unfollow { url: String },
    /// Show the newest posts from followed feeds
    Browse {
        /// Number of posts to show
        #[arg(default_value_t = 2, value_parser = clap::value_parser!(i64).range(1..))]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = gator_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(session = %config.session_path.display(), "configuration loaded");

    let mut session_file = SessionFile::load(&config.session_path)?;
    let database_url = config.resolve_database_url(&session_file)?;
    let pool_config = gator_db::PoolConfig::from_app_config(&config);
    let pool = gator_db::connect_pool(&database_url, pool_config).await?;
    gator_db::run_migrations(&pool).await?;

    match cli.command {
        Commands::Register { name } => {
            users::run_register(&pool, &config, &mut session_file, &name).await?;
        }
        Commands::Login { name } => {
            users::run_login(&pool, &config, &mut session_file, &name).await?;
        }
        Commands::Reset => users::run_reset(&pool).await?,
        Commands::Users => users::run_users(&pool, &session_file).await?,
        Commands::Agg { interval } => agg::run_agg(pool, &config, interval).await?,
        Commands::Addfeed { name, url } => {
            let session = users::current_session(&pool, &session_file).await?;
            feeds::run_addfeed(&pool, &session, &name, &url).await?;
        }
        Commands::Feeds => feeds::run_feeds(&pool).await?,
        Commands::Follow { url } => {
            let session = users::current_session(&pool, &session_file).await?;
            feeds::run_follow(&pool, &session, &url).await?;
        }
        Commands::Following => {
            let session = users::current_session(&pool, &session_file).await?;
            feeds::run_following(&pool, &session).await?;
        }
        Commands::Unfollow { url } => {
            let session = users::current_session(&pool, &session_file).await?;
            feeds::run_unfollow(&pool, &session, &url).await?;
        }
        Commands::Browse { limit } => {
            let session = users::current_session(&pool, &session_file).await?;
            feeds::run_browse(&pool, &session, limit).await?;
        }
    }

    Ok(())
}
