//! TuneMatch presence & compatibility server - Main entry point
//!
//! Tracks which users are online and what they are listening to, enriches
//! stored favorites against the public catalog, and scores music
//! compatibility between users.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tunematch_common::db::{init_db, SqliteAccountStore};
use tunematch_common::model::Provider;
use tunematch_server::api::{create_router, AppContext};
use tunematch_server::config::{self, Config};
use tunematch_server::poller::{ListeningStatusPoller, ProviderSource};
use tunematch_server::registry::PresenceRegistry;
use tunematch_server::services::{DeezerClient, SpotifyClient, TasteEnricher};

/// Command-line arguments for tunematch-server
#[derive(Parser, Debug)]
#[command(name = "tunematch-server")]
#[command(about = "Presence and compatibility server for TuneMatch")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "TUNEMATCH_PORT")]
    port: u16,

    /// Path to the SQLite database (falls back to TUNEMATCH_DB, then
    /// tunematch.toml, then ./tunematch.db)
    #[arg(short, long)]
    database: Option<String>,

    /// Seconds between listening-status polls
    #[arg(long, default_value_t = config::DEFAULT_POLL_INTERVAL_SECS)]
    poll_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunematch_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(
        "Starting TuneMatch server v{} on port {}",
        env!("CARGO_PKG_VERSION"),
        args.port
    );

    let db_path = config::resolve_database_path(args.database.as_deref(), "TUNEMATCH_DB")
        .context("Failed to resolve database path")?;
    info!("Database path: {}", db_path.display());

    let mut config = Config::new(args.port, db_path);
    config.poll_interval = Duration::from_secs(args.poll_interval_secs);

    let pool = init_db(&config.database)
        .await
        .context("Failed to open database")?;
    info!("✓ Connected to database");

    let store: Arc<dyn tunematch_common::db::AccountStore> =
        Arc::new(SqliteAccountStore::new(pool));
    let registry = Arc::new(PresenceRegistry::new(100));

    let spotify = Arc::new(SpotifyClient::new(config.request_timeout)?);
    let deezer = Arc::new(DeezerClient::new(config.request_timeout)?);

    let enricher = Arc::new(TasteEnricher::new(
        store.clone(),
        deezer,
        spotify.clone(),
    ));

    // Background listening-status poller
    let poller = ListeningStatusPoller::new(
        registry.clone(),
        store.clone(),
        vec![ProviderSource {
            provider: Provider::Spotify,
            client: spotify,
        }],
    );
    tokio::spawn(poller.run(config.poll_interval));

    // Build the application router
    let ctx = AppContext {
        registry,
        store,
        enricher,
    };
    let app = create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
