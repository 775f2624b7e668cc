//! lcx-rs (Response Store) - survey submission backend
//!
//! Stores validated survey responses in SQLite and serves them to the
//! dashboard. Creates its root folder and database on first run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lcx_common::config::{load_toml_config_or_default, RootFolderInitializer};
use lcx_common::events::EventBus;
use lcx_rs::config::{StoreConfig, StoreOverrides};
use lcx_rs::{build_router, import, AppState, EVENT_BUS_CAPACITY};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for lcx-rs
#[derive(Parser, Debug)]
#[command(name = "lcx-rs")]
#[command(about = "Response store for the LCX attendee survey")]
#[command(version)]
struct Args {
    /// Address to listen on [env: LCX_BIND]
    #[arg(short, long)]
    bind: Option<String>,

    /// Folder holding lcx.db [env: LCX_ROOT_FOLDER]
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Database file, overriding the root folder [env: LCX_DB_PATH]
    #[arg(long)]
    database: Option<PathBuf>,

    /// Config file [env: LCX_CONFIG]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Legacy JSON export to import when the store is empty [env: LCX_IMPORT_FILE]
    #[arg(long)]
    import: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_filter_reloading();
    let log_filter = subscriber.reload_handle();
    subscriber.init();

    info!(
        "Starting LCX Response Store (lcx-rs) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let toml = load_toml_config_or_default(args.config.as_deref());

    // RUST_LOG wins over the config file
    if std::env::var_os("RUST_LOG").is_none() {
        let level = toml.logging.level_or_default();
        match EnvFilter::try_new(&level) {
            Ok(filter) => {
                if let Err(e) = log_filter.reload(filter) {
                    warn!("Failed to apply log level '{}': {}", level, e);
                }
            }
            Err(e) => warn!("Ignoring log level '{}': {}", level, e),
        }
    }

    let config = StoreConfig::resolve(
        StoreOverrides {
            root_folder: args.root_folder,
            db_path: args.database,
            bind: args.bind,
            import_file: args.import,
        },
        &toml,
    )?;

    RootFolderInitializer::new(config.root_folder.clone()).ensure_directory_exists()?;
    info!("Database path: {}", config.db_path.display());

    let pool = match lcx_common::db::init_database(&config.db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    if let Some(path) = &config.import_file {
        import::import_if_empty(&pool, path)
            .await
            .with_context(|| format!("Import of {} failed", path.display()))?;
    }

    let state = AppState::new(pool, EventBus::new(EVENT_BUS_CAPACITY));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("lcx-rs listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

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
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
