//! automanage - lifecycle policy evaluation for a resource fleet
//!
//! This is the main entry point for one evaluation cycle.
//! It wires together all the components:
//! - Configuration loading
//! - Resource inventory
//! - Core engine
//! - Concurrent action dispatch

mod executor;
mod inventory;

use anyhow::{Context, Result};
use automanage_api::ActionRequest;
use automanage_config::{Settings, load_config};
use automanage_core::CoreEngine;
use automanage_host_api::{ActionExecutor, Dispatched, ResourceProvider, dispatch};
use automanage_util::{
    AUTOMANAGE_CONFIG_ENV, default_config_path, format_datetime_full, parse_wall_clock,
};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::executor::NdjsonExecutor;
use crate::inventory::JsonInventory;

/// automanage - apply lifecycle policy tags to a fleet of resources
#[derive(Parser, Debug)]
#[command(name = "automanage")]
#[command(about = "Apply lifecycle policy tags to a fleet of resources", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/automanage/config.toml)
    #[arg(short, long, env = AUTOMANAGE_CONFIG_ENV)]
    config: Option<PathBuf>,

    /// JSON resource inventory
    #[arg(short, long)]
    inventory: PathBuf,

    /// Evaluate as of this wall-clock time in the configured timezone
    #[arg(long, value_name = "YYYY-MM-DD HH:MM:SS")]
    at: Option<String>,

    /// Report actions without carrying them out
    #[arg(long)]
    dry_run: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Load the configured settings. A missing file at the default location
/// means built-in defaults; an explicit path must exist.
fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path();
            if !path.exists() {
                info!(config_path = %path.display(), "No configuration file, using defaults");
                return Ok(Settings::default());
            }
            path
        }
    };

    let settings = load_config(&path)
        .with_context(|| format!("Failed to load config from {:?}", path))?;

    info!(
        config_path = %path.display(),
        timezone = settings.timezone.name(),
        "Configuration loaded"
    );

    Ok(settings)
}

/// Outcome counts from dispatching one cycle's requests
#[derive(Debug, Default)]
struct DispatchSummary {
    executed: usize,
    skipped: usize,
    failed: usize,
}

/// Dispatch every request on its own task. Failures are logged per resource
/// and never stop the other requests.
async fn dispatch_all(
    executor: Arc<dyn ActionExecutor>,
    requests: Vec<ActionRequest>,
) -> DispatchSummary {
    let mut tasks = JoinSet::new();
    for request in requests {
        let executor = executor.clone();
        tasks.spawn(async move {
            let outcome = dispatch(executor.as_ref(), &request).await;
            (request, outcome)
        });
    }

    let mut summary = DispatchSummary::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(Dispatched::Executed))) => summary.executed += 1,
            Ok((_, Ok(Dispatched::Skipped))) => summary.skipped += 1,
            Ok((request, Err(e))) => {
                error!(
                    resource_id = %request.resource_id,
                    action = %request.action,
                    error = %e,
                    "Action failed"
                );
                summary.failed += 1;
            }
            Err(e) => {
                error!(error = %e, "Dispatch task failed");
                summary.failed += 1;
            }
        }
    }

    summary
}

async fn run(args: Args) -> Result<ExitCode> {
    let mut settings = load_settings(args.config.as_deref())?;
    if args.dry_run {
        settings.dry_run = true;
    }

    let at = match &args.at {
        Some(wall_clock) => parse_wall_clock(wall_clock, &settings.timezone)
            .with_context(|| format!("Invalid --at value {:?}", wall_clock))?,
        None => Utc::now(),
    };

    let provider = JsonInventory::new(&args.inventory);
    let resources = provider
        .list_resources()
        .await
        .with_context(|| format!("Failed to list resources from {:?}", provider.path()))?;

    let dry_run = settings.dry_run;
    let engine = CoreEngine::new(settings);

    info!(
        at = %format_datetime_full(&at.with_timezone(&engine.settings().timezone)),
        resources = resources.len(),
        "Starting evaluation cycle"
    );

    let report = engine.evaluate_fleet(&resources, at);
    let actions = report.action_counts();

    let executor: Arc<dyn ActionExecutor> = Arc::new(NdjsonExecutor::new(std::io::stdout(), dry_run));
    let summary = dispatch_all(executor, report.requests).await;

    info!(
        cycle_id = %report.cycle_id,
        untagged = report.untagged,
        actions = ?actions,
        executed = summary.executed,
        skipped = summary.skipped,
        failed = summary.failed,
        dry_run,
        "Cycle complete"
    );

    if summary.failed > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    init_logging(&args.log_level, args.log_format);

    info!(version = env!("CARGO_PKG_VERSION"), "automanage starting");

    run(args).await
}
