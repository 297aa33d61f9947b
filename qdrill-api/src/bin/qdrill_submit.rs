//! qdrill-submit - send drill and practice plan JSON files to a qdrill-api service
//!
//! Payloads are checked locally before upload; field errors are printed one
//! per line and the process exits non-zero.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qdrill_api::client::{ApiClient, ClientError};
use qdrill_common::config::{load_toml_config, resolve_api_base_url};
use qdrill_common::ValidationRules;
use serde_json::Value;
use tracing::info;

/// Command-line arguments for qdrill-submit
#[derive(Parser, Debug)]
#[command(name = "qdrill-submit")]
#[command(about = "Submit drills and practice plans to a QDrill API service")]
#[command(version)]
struct Args {
    /// Service base URL (falls back to QDRILL_API_BASE_URL, then config.toml)
    #[arg(long)]
    base_url: Option<String>,

    /// Path to config.toml
    #[arg(short, long, env = "QDRILL_CONFIG")]
    config: Option<PathBuf>,

    /// Reject skill levels outside the controlled vocabulary before sending
    #[arg(long)]
    enforce_skill_levels: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a drill from a JSON file
    Drill { file: PathBuf },
    /// Create a practice plan from a JSON file
    Plan { file: PathBuf },
    /// Print a stored practice plan with its schedule
    ShowPlan { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();
    let toml_config = load_toml_config(args.config.as_deref())?;
    let base_url = resolve_api_base_url(args.base_url.as_deref(), &toml_config);
    let rules = ValidationRules {
        enforce_skill_levels: args.enforce_skill_levels
            || toml_config.enforce_skill_levels.unwrap_or(false),
    };
    info!("Using API at {}", base_url);

    let client = ApiClient::new(base_url).with_rules(rules);

    let output = match args.command {
        Command::Drill { file } => {
            let payload = read_payload(&file)?;
            let drill = client.create_drill(&payload).await.map_err(report)?;
            serde_json::to_string_pretty(&drill)?
        }
        Command::Plan { file } => {
            let payload = read_payload(&file)?;
            let plan = client.create_practice_plan(&payload).await.map_err(report)?;
            serde_json::to_string_pretty(&plan)?
        }
        Command::ShowPlan { id } => {
            let plan = client.get_practice_plan(id).await.map_err(report)?;
            serde_json::to_string_pretty(&plan)?
        }
    };

    println!("{}", output);
    Ok(())
}

fn read_payload(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Print field errors one per line before failing
fn report(err: ClientError) -> anyhow::Error {
    if let ClientError::Validation(errors) = &err {
        for path in errors.paths() {
            for message in errors.get(path).unwrap_or_default() {
                eprintln!("{}: {}", path, message);
            }
        }
        return anyhow::anyhow!("{} invalid field(s)", errors.len());
    }
    anyhow::Error::new(err)
}

