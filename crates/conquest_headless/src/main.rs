//! Headless purchase planner runner.
//!
//! # Usage
//!
//! ```bash
//! # Plan one pass and print it as JSON
//! cargo run -p conquest_headless -- plan --scenario strip.ron --player 1 --seed 7
//!
//! # Plan every computer player over many seeds
//! cargo run -p conquest_headless -- batch --scenario strip.ron --runs 500 --output results/strip.json
//!
//! # Check a scenario file
//! cargo run -p conquest_headless -- validate --scenario strip.ron
//! ```
//!
//! Plans go to stdout; logs go to stderr and follow `RUST_LOG`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use conquest_core::player::PlayerId;
use conquest_headless::{
    batch::{run_batch, BatchConfig},
    runner::plan_to_json,
    scenario::Scenario,
    validate::validate_scenario,
};

#[derive(Parser)]
#[command(name = "conquest_headless")]
#[command(about = "Headless computer-player purchase planner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan one pass for a player
    Plan {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Player id to plan for
        #[arg(short, long)]
        player: u32,

        /// Seed overriding the scenario's planner seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Plan every computer player over a range of seeds
    Batch {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Passes per player
        #[arg(short, long, default_value = "100")]
        runs: u32,

        /// Starting seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Maximum parallel passes (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output JSON file
        #[arg(short, long, default_value = "results/batch.json")]
        output: PathBuf,
    },

    /// Check a scenario file
    Validate {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr (stdout is for plans)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Plan {
            scenario,
            player,
            seed,
        } => cmd_plan(&scenario, PlayerId(player), seed),
        Commands::Batch {
            scenario,
            runs,
            seed,
            parallel,
            output,
        } => cmd_batch(&scenario, runs, seed, parallel, &output),
        Commands::Validate { scenario } => cmd_validate(&scenario),
    }
}

fn load_or_exit(path: &Path) -> Scenario {
    match Scenario::load(path) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to load scenario: {e}");
            std::process::exit(1);
        }
    }
}

/// Plan one pass and print it
fn cmd_plan(path: &Path, player: PlayerId, seed: Option<u64>) {
    let scenario = load_or_exit(path);
    match plan_to_json(&scenario, player, seed) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Planning failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Run a batch and save the statistics
fn cmd_batch(path: &Path, runs: u32, seed: u64, parallel: u32, output: &Path) {
    let scenario = load_or_exit(path);
    let config = BatchConfig {
        runs,
        seed_start: seed,
        parallel,
    };
    let results = run_batch(&scenario, config);

    eprintln!("Batch '{}': {} passes", results.scenario, results.plans.len());
    for (player, summary) in &results.players {
        eprintln!(
            "  player#{player}: mean {:.1} units, {:.1} PUs",
            summary.mean_units, summary.mean_spent
        );
        for (unit_type, frequency) in &summary.frequencies {
            eprintln!("    {unit_type:<12} {:>5.1}%", frequency * 100.0);
        }
    }

    if let Err(e) = results.save(output) {
        eprintln!("Failed to save results: {e}");
        std::process::exit(1);
    }
    eprintln!("Results saved to {}", output.display());

    if !results.errors.is_empty() {
        eprintln!("{} passes failed", results.errors.len());
        std::process::exit(1);
    }
}

/// Validate a scenario
fn cmd_validate(path: &Path) {
    let scenario = load_or_exit(path);
    match validate_scenario(&scenario) {
        Ok(report) => {
            eprintln!(
                "OK: {} players ({} AI), {} territories, {} unit types",
                report.players, report.ai_players, report.territories, report.unit_types
            );
            for warning in &report.warnings {
                eprintln!("WARN: {warning}");
            }
        }
        Err(e) => {
            eprintln!("FAIL: {e}");
            std::process::exit(1);
        }
    }
}
