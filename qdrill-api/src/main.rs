//! qdrill-api - drill and practice plan service
//!
//! Serves the drill and practice plan endpoints over HTTP, backed by a SQLite
//! database in the root folder.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use qdrill_common::config::{load_toml_config, resolve_settings, CliOverrides};
use qdrill_common::db::init_database;
use qdrill_api::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for qdrill-api
#[derive(Parser, Debug)]
#[command(name = "qdrill-api")]
#[command(about = "Drill and practice plan API service")]
#[command(version)]
struct Args {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(short, long, env = "QDRILL_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(short, long)]
    bind_addr: Option<String>,

    /// Reject skill levels outside Beginner/Intermediate/Advanced/Expert
    #[arg(long)]
    enforce_skill_levels: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = load_toml_config(args.config.as_deref())?;

    // RUST_LOG wins over the config file level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting QDrill API (qdrill-api) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let cli = CliOverrides {
        root_folder: args.root_folder,
        bind_addr: args.bind_addr,
        api_base_url: None,
        enforce_skill_levels: args.enforce_skill_levels,
    };
    let settings = resolve_settings(&cli, &toml_config);
    info!("Root folder: {}", settings.root_folder.display());
    if settings.rules.enforce_skill_levels {
        info!("Skill level vocabulary enforced");
    }

    let db_path = settings.database_path();
    let pool = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database {}: {}", db_path.display(), e);
            return Err(e).context("Failed to initialize database");
        }
    };

    let app = build_router(AppState::new(pool, settings.rules));

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.bind_addr))?;
    info!("qdrill-api listening on http://{}", settings.bind_addr);
    info!("Health check: http://{}/health", settings.bind_addr);

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
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
