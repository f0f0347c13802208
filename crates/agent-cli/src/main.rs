//! Command-line interface for the staged stock analysis orchestrator
//!
//! Reads an analysis request from a JSON file, runs the full or quick
//! pipeline with the default stock team, and prints the result.
//!
//! ```bash
//! agent-cli --input crates/agent-cli/fixtures/aapl.json
//! agent-cli --input request.json --quick --timeout-secs 10 --json
//! ```

mod render;

use agent_stock::{StockConfig, register_default_team};
use agent_workflow::{AnalysisRequest, Orchestrator, OrchestratorConfig};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "agent-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Staged multi-agent stock analysis", long_about = None)]
struct Args {
    /// Path to the analysis request (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Run the quick pipeline (core analysts and one decision)
    #[arg(short, long)]
    quick: bool,

    /// Per-agent timeout in seconds (overrides AGENT_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the full result as JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    agent_utils::init_tracing_with(&agent_utils::Config::from_env());

    let args = Args::parse();
    let request = load_request(&args.input)?;
    let orchestrator = build_orchestrator(args.timeout_secs)?;

    info!(
        subject = %request.subject_id,
        quick = args.quick,
        "Running analysis"
    );

    if args.quick {
        let result = orchestrator.run_quick_analysis(request).await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", render::quick_report(&result));
        }
    } else {
        let result = orchestrator.run_full_analysis(request).await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", render::full_report(&result));
        }
    }

    Ok(())
}

fn load_request(path: &Path) -> Result<AnalysisRequest> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid analysis request in {}", path.display()))
}

fn build_orchestrator(timeout_secs: Option<u64>) -> Result<Orchestrator> {
    let mut config = OrchestratorConfig::default().with_env()?;
    if let Some(secs) = timeout_secs {
        config.agent_timeout = Duration::from_secs(secs);
    }

    let builder = Orchestrator::builder().config(config);
    let orchestrator =
        register_default_team(builder, Arc::new(StockConfig::default())).build()?;
    Ok(orchestrator)
}
