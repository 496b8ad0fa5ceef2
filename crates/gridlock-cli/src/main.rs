//! Gridlock CLI.
//!
//! Wires a contention session from command-line parameters, narrates it
//! through the fmt subscriber, and prints a per-node summary at exit.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use gridlock::prelude::*;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "gridlock")]
#[command(version)]
#[command(about = "Simulate resource contention and detect deadlocks")]
struct Cli {
    /// Number of processes contending for resources
    #[arg(short = 'n', long = "processes", default_value = "5")]
    processes: u32,

    /// Number of resources in the shared pool
    #[arg(short = 'm', long = "resources", default_value = "3")]
    resources: u32,

    /// RNG seed for reproducible runs
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Wall-clock budget per process, in seconds
    #[arg(long = "run-secs", default_value = "60")]
    run_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    let config = SimConfig {
        process_count: cli.processes,
        resource_count: cli.resources,
        seed: cli.seed,
        run_for: Duration::from_secs(cli.run_secs),
        ..SimConfig::default()
    };

    let report = Simulation::new(config)?.run()?;

    println!("\n=== Simulation Complete ===");
    println!(
        "processes: {}, resources: {}, elapsed: {:.1?}",
        cli.processes, cli.resources, report.elapsed
    );
    println!(
        "  {:>7} {:>11} {:>7} {:>7} {:>9}",
        "process", "termination", "passes", "rounds", "forwarded"
    );
    for outcome in &report.outcomes {
        let termination = match outcome.termination {
            Termination::Budget => "budget",
            Termination::Deadlock => "harakiri",
        };
        println!(
            "  {:>7} {:>11} {:>7} {:>7} {:>9}",
            outcome.pid,
            termination,
            outcome.passes,
            outcome.rounds_initiated,
            outcome.probes_forwarded
        );
    }
    if report.deadlock_count() == 0 {
        println!("no deadlock was confirmed during this run");
    }

    Ok(())
}
