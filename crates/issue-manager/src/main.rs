//! issue-manager - Closes inactive issues and pull requests
//!
//! This is the main entry point. It wires together:
//! - Settings (CLI flags and action inputs)
//! - Policy configuration
//! - The GitHub tracker
//! - Decision engine and run orchestration

use anyhow::{Context, Result};
use clap::Parser;
use issue_manager_core::{DecisionEngine, RunOrchestrator};
use issue_manager_github::{DEFAULT_API_BASE, GithubTracker};
use issue_manager_tracker_api::Tracker;
use issue_manager_util::{is_mock_time_active, now};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod event;
mod settings;

use settings::Settings;

/// issue-manager - Close inactive issues and pull requests by label
#[derive(Parser, Debug)]
#[command(name = "issue-manager")]
#[command(
    about = "Close inactive issues and pull requests according to per-label policies",
    long_about = None
)]
pub struct Args {
    /// Inline JSON policy configuration
    #[arg(long, env = "INPUT_CONFIG")]
    config: Option<String>,

    /// Policy configuration file (.json or .toml), overrides --config
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: String,

    /// API token
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Webhook payload of the triggering event
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Name of the triggering event
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    event_name: Option<String>,

    /// API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_BASE)]
    api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    /// Log the actions that would be taken without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "issue-manager starting");

    let settings = Settings::from_args(&args)?;

    if is_mock_time_active() {
        warn!(now = %now(), "Mock time is active");
    }

    let owner = settings.owner().to_string();
    let github = GithubTracker::new(settings.github).context("Failed to create GitHub client")?;
    info!(repo = %github.repo(), "GitHub client ready");
    let tracker: Arc<dyn Tracker> = Arc::new(github);

    let engine = DecisionEngine::new(settings.policies, Some(owner));
    let orchestrator = RunOrchestrator::new(tracker, engine, settings.mode);

    let summary = orchestrator
        .run(settings.trigger, now())
        .await
        .context("Run failed")?;

    info!(
        evaluated = summary.evaluated,
        skipped = summary.skipped,
        closed = summary.closed,
        reminded = summary.reminded,
        labels_removed = summary.labels_removed,
        "Finished"
    );

    Ok(())
}
