//! Test case runner
//!
//! Lists the registered test cases for selection tooling, or runs one of them
//! under an overall timeout.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::timeout;

use orchestrator::HarnessSettings;
use shared::{logging, ProcessId};
use tester::TestScenarios;

#[derive(Parser)]
#[command(name = "tester")]
#[command(about = "Runs crash-harness test cases by name")]
struct Args {
    /// Print `name<TAB>tags` for every test case and exit
    #[arg(long)]
    list: bool,

    /// Test case to run
    #[arg(long, default_value = "crash_ior")]
    scenario: String,

    /// JSON harness settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Test timeout in seconds
    #[arg(long, default_value = "1800")]
    timeout_secs: u64,

    /// Enable verbose tracing output
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.list {
        for entry in TestScenarios::entries() {
            println!("{}", entry.listing());
        }
        return Ok(());
    }

    // .env is optional
    let _ = dotenv::dotenv();

    ProcessId::init_tester();
    logging::init_tracing_with_level(Some(if args.verbose { "debug" } else { "info" }));

    tracing::info!("🧪 Starting test case runner");
    tracing::info!("Scenario: {}, Timeout: {}s", args.scenario, args.timeout_secs);

    let settings = HarnessSettings::load(args.config.as_deref()).context("loading harness settings")?;
    let scenarios = TestScenarios::new(settings);

    let test_result = timeout(
        Duration::from_secs(args.timeout_secs),
        scenarios.run_scenario(&args.scenario),
    )
    .await;

    match test_result {
        Ok(Ok(())) => {
            tracing::info!("✅ Test scenario '{}' completed successfully", args.scenario);
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::error!("❌ Test scenario '{}' failed: {:#}", args.scenario, e);
            Err(e)
        }
        Err(_) => {
            tracing::error!(
                "⏰ Test scenario '{}' timed out after {}s",
                args.scenario,
                args.timeout_secs
            );
            bail!("Test timeout")
        }
    }
}
