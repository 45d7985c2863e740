use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use cbs_planner::adapters::outbound::{
    init_combined_logger, init_noop_logger, BuiltinScenarios, FilesystemScenarioSource,
    PlanRenderer, ScenarioCatalog,
};
use cbs_planner::application::{PlanningService, SolveOutcome, SolveReport, EXIT_USAGE};
use cbs_planner::domains::mapf::{Plan, Scenario, ScenarioSource};
use cbs_planner::Config;

/// Conflict-based multi-agent path planning on grids
#[derive(Parser)]
#[command(name = "cbs-planner")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "CBS_PLANNER_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true, env = "CBS_PLANNER_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a built-in or on-disk scenario
    Run(RunArgs),
    /// List the scenarios that `run --scenario` accepts
    List,
}

#[derive(Args)]
struct RunArgs {
    /// Scenario name, looked up on disk first, then among the built-ins
    #[arg(short, long, conflicts_with = "file")]
    scenario: Option<String>,

    /// Scenario file to solve
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Print every timestep of the plan
    #[arg(long)]
    render: bool,

    /// Print the solve report as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_USAGE)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_logging(&level)?;
    info!("Configuration loaded");

    let catalog: Arc<dyn ScenarioSource> = Arc::new(ScenarioCatalog::new(vec![
        Arc::new(FilesystemScenarioSource::new(config.scenarios.data_dir.clone())),
        Arc::new(BuiltinScenarios::new()),
    ]));

    match cli.command {
        Commands::List => {
            for name in catalog.list_scenarios()? {
                println!("{}", name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run(args) => {
            let logger = if args.json {
                init_noop_logger()
            } else {
                init_combined_logger(config.logging.file.as_deref(), &level)
            };
            let service = PlanningService::new(catalog, logger.clone(), config.solver);

            let scenario = match &args.file {
                Some(path) => FilesystemScenarioSource::load_file(path)?,
                None => {
                    let name = args
                        .scenario
                        .as_deref()
                        .unwrap_or(&config.scenarios.default_scenario);
                    service.load_scenario(name)?
                }
            };

            let solving = scenario.clone();
            let report = tokio::task::spawn_blocking(move || service.solve(&solving))
                .await
                .context("solver task panicked")??;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let render = args.render || config.output.render_timesteps;
                print_report(&scenario, &report, render, &logger);
            }

            Ok(ExitCode::from(report.exit_code()))
        }
    }
}

fn print_report(
    scenario: &Scenario,
    report: &SolveReport,
    render: bool,
    logger: &cbs_planner::DynLogger,
) {
    let renderer = PlanRenderer::new(&scenario.grid);
    let print_paths = |plan: &Plan| {
        for line in renderer.describe_paths(plan) {
            println!("{}", line);
        }
    };

    match &report.outcome {
        SolveOutcome::Solved { plan } => {
            println!(
                "Solved '{}' in {} ms: makespan {}, sum of costs {}, {} replans",
                report.scenario,
                report.elapsed_ms,
                plan.makespan(),
                plan.sum_of_costs(),
                report.replans
            );
            println!(
                "Constraints: {} from conflicts, {} from parked goals; {} wait-for edges",
                report.stats.conflict_constraints,
                report.stats.goal_constraints,
                report.stats.wait_for_edges
            );
            print_paths(plan);
            if render {
                renderer.narrate(plan, logger);
            }
        }
        SolveOutcome::Failed { error, best_effort } => {
            println!("No plan for '{}': {}", report.scenario, error);
            let agents = error.agents();
            if !agents.is_empty() {
                let names: Vec<String> = agents.iter().map(|a| a.to_string()).collect();
                println!("Agents involved: {}", names.join(", "));
            }
            if let Some(plan) = best_effort {
                println!("Best-effort paths (not conflict free):");
                print_paths(plan);
            }
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    // `log` records belong to the fast_log file sink, so no LogTracer here.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install tracing subscriber")?;
    Ok(())
}
