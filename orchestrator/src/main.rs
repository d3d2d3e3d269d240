//! Main entry point for the orchestrator binary
//!
//! `fault-config` writes a fault-injection artifact; `crash` runs the crash
//! scenarios against a pool with the real workload and status services.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tokio::signal;

use orchestrator::{
    services::{DmgStatusSource, RealWorkloadController, TokioClock},
    CrashOrchestrator, FaultCatalog, FaultConfigCompiler, HarnessSettings, OrchestratorError, OrchestratorResult,
    ScenarioKind, SequenceReport,
};
use shared::{logging, process_debug, process_info, FaultRule, ProcessId};

/// Crash-consistency harness for the storage cluster
#[derive(Parser)]
#[command(name = "orchestrator")]
#[command(about = "Compiles fault-injection configs and runs IOR crash scenarios")]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write `fi.yaml` for the storage engine
    FaultConfig(FaultConfigArgs),
    /// Run the crash scenario sequence (or one scenario)
    Crash(CrashArgs),
}

#[derive(ClapArgs)]
pub struct FaultConfigArgs {
    /// Directory the artifact is written to (created if missing)
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Catalog fault to include; repeatable
    #[arg(long = "fault")]
    pub faults: Vec<String>,

    /// Ad-hoc rule as ID:PROBABILITY:INTERVAL:MAX_FAULTS
    #[arg(long)]
    pub extra: Option<FaultRule>,

    /// Seed for the engine's fault-injection RNG
    #[arg(long)]
    pub seed: Option<String>,
}

#[derive(ClapArgs)]
pub struct CrashArgs {
    /// JSON settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Pool label or UUID (overrides settings and environment)
    #[arg(long)]
    pub pool: Option<String>,

    /// Container label or UUID (overrides settings and environment)
    #[arg(long)]
    pub container: Option<String>,

    /// Run a single scenario: write, read or final
    #[arg(long)]
    pub scenario: Option<ScenarioKind>,

    /// Write a JSON run report here
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> OrchestratorResult<()> {
    // Parse command line arguments
    let args = Args::parse();

    // .env is optional
    let _ = dotenv::dotenv();

    // Initialize process ID singleton for orchestrator
    ProcessId::init_orchestrator();
    logging::init_tracing_with_level(Some(&args.log_level));

    match args.command {
        Command::FaultConfig(fault_args) => write_fault_config(fault_args),
        Command::Crash(crash_args) => run_crash(crash_args).await,
    }
}

fn write_fault_config(args: FaultConfigArgs) -> OrchestratorResult<()> {
    let catalog = FaultCatalog::builtin();
    let mut compiler = FaultConfigCompiler::new(&catalog);
    if let Some(seed) = args.seed {
        compiler = compiler.with_seed(seed);
    }

    let names: Vec<&str> = args.faults.iter().map(String::as_str).collect();
    let rule_names = (!names.is_empty()).then_some(names.as_slice());

    let path = compiler.compile(&args.output_dir, rule_names, args.extra)?;
    println!("{}", path.display());
    Ok(())
}

async fn run_crash(args: CrashArgs) -> OrchestratorResult<()> {
    let mut settings = HarnessSettings::load(args.config.as_deref())?;
    if let Some(pool) = args.pool {
        settings.target.pool = pool;
    }
    if let Some(container) = args.container {
        settings.target.container = container;
    }
    settings.validate()?;

    logging::log_startup(ProcessId::current(), &format!("crash scenarios against {}", settings.target));
    process_debug!(ProcessId::current(), "Crash timing: {:?}", settings.crash);

    let workload = RealWorkloadController::new(settings.ior.clone()).with_grace_period(settings.crash.stop_grace);
    let status = DmgStatusSource::new(settings.dmg.clone());
    let orchestrator = CrashOrchestrator::new(workload, status, TokioClock, settings.target, settings.crash);

    let run = async {
        let (report, result) = match args.scenario {
            Some(kind) => {
                let mut report = SequenceReport::begin();
                let result = match orchestrator.run_scenario(kind).await {
                    Ok(outcome) => {
                        report.record(outcome);
                        Ok(())
                    }
                    Err(e) => {
                        report.record_failure(&e);
                        Err(e)
                    }
                };
                report.finish();
                (report, result)
            }
            None => orchestrator.execute_sequence().await,
        };

        if let Some(ref path) = args.report {
            report.write_json(path)?;
            process_info!(ProcessId::current(), "📋 Report written to {}", path.display());
        }
        result
    };

    let interrupted = async {
        if let Err(err) = signal::ctrl_c().await {
            logging::log_error(ProcessId::current(), "Signal handling", &err);
            std::future::pending::<()>().await;
        }
    };

    // Workloads still running are killed when the controller drops on return
    tokio::select! {
        result = run => {
            if result.is_ok() {
                logging::log_success(ProcessId::current(), "Crash scenarios passed");
            }
            result
        }
        () = interrupted => {
            logging::log_shutdown(ProcessId::current(), "Received Ctrl+C signal");
            Err(OrchestratorError::Interrupted {
                signal: "SIGINT".to_string(),
            })
        }
    }
}
