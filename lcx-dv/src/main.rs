//! lcx-dv (Dashboard View) - live attendee dashboard
//!
//! `watch` polls the response store and prints the aggregate views after
//! every refresh. `submit` validates a profile file and posts it.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use lcx_common::config::load_toml_config_or_default;
use lcx_common::{summarize, validate, AggregationOptions, CandidateResponse, SkillAttribution};
use lcx_dv::{
    render_summary, DashboardConfig, DashboardOverrides, RefreshLoop, StoreClient,
    SUBMIT_FAILURE_NOTICE,
};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for lcx-dv
#[derive(Parser, Debug)]
#[command(name = "lcx-dv")]
#[command(about = "Live dashboard for the LCX attendee survey")]
#[command(version)]
struct Cli {
    /// Config file [env: LCX_CONFIG]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Refresh and print the dashboard until Ctrl+C
    Watch {
        #[command(flatten)]
        store: StoreArgs,

        /// Refresh interval in milliseconds [env: LCX_REFRESH_MS]
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Per-request timeout in milliseconds [env: LCX_TIMEOUT_MS]
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Skill ranking: "every" or "primary" [env: LCX_SKILL_ATTRIBUTION]
        #[arg(long)]
        skills: Option<SkillAttribution>,
    },
    /// Validate a profile JSON file and submit it
    Submit {
        /// Profile in the survey's JSON shape, without `id`
        file: PathBuf,

        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Response store base URL [env: LCX_STORE_URL]
    #[arg(long)]
    store_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_filter_reloading();
    let log_filter = subscriber.reload_handle();
    subscriber.init();

    info!(
        "Starting LCX Dashboard View (lcx-dv) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();
    let toml = load_toml_config_or_default(cli.config.as_deref());

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

    match cli.command {
        Command::Watch {
            store,
            interval_ms,
            timeout_ms,
            skills,
        } => {
            let config = DashboardConfig::resolve(
                DashboardOverrides {
                    store_url: store.store_url,
                    refresh_interval_ms: interval_ms,
                    request_timeout_ms: timeout_ms,
                    skill_attribution: skills,
                },
                &toml,
            )?;
            watch(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Submit { file, store } => {
            let config = DashboardConfig::resolve(
                DashboardOverrides {
                    store_url: store.store_url,
                    ..DashboardOverrides::default()
                },
                &toml,
            )?;
            submit(&config, &file).await
        }
    }
}

async fn watch(config: DashboardConfig) -> Result<()> {
    let client = StoreClient::new(&config.store_url, config.request_timeout)
        .context("Failed to create store client")?;
    info!("Watching {}", client.base_url());

    let options = AggregationOptions {
        skill_attribution: config.skill_attribution,
        ..AggregationOptions::default()
    };

    let handle = RefreshLoop::new(Arc::new(client), config.refresh_interval).spawn();
    let mut snapshots = handle.subscribe();

    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let summary = summarize(&snapshot.responses, &options);
                println!("{}", render_summary(&summary, &snapshot));
            }
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    error!("Failed to listen for Ctrl+C: {}", e);
                }
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

async fn submit(config: &DashboardConfig, file: &Path) -> Result<ExitCode> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let candidate: CandidateResponse = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON profile", file.display()))?;

    let submission = match validate(&candidate) {
        Ok(submission) => submission,
        Err(errors) => {
            eprintln!("The profile has {} invalid field(s):", errors.len());
            for (field, message) in errors.iter() {
                eprintln!("  {}: {}", field, message);
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    let client = StoreClient::new(&config.store_url, config.request_timeout)
        .context("Failed to create store client")?;

    match client.submit(&submission).await {
        Ok(stored) => {
            println!("Submitted profile #{} ({})", stored.id, stored.name);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Submission to {} failed: {}", client.base_url(), e);
            eprintln!("{}", SUBMIT_FAILURE_NOTICE);
            Ok(ExitCode::FAILURE)
        }
    }
}
