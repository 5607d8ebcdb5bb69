//! KINMEN CLI - Command-line driver for the wargame engine
//!
//! Commands:
//! - simulate: Play AI-vs-AI games in parallel
//! - inspect: Show a unit's movement and threat ranges
//! - forecast: Preview an attack
//! - turn: Play the red response to a blue end-turn and save

mod forecast;
mod inspect;
mod scenario_args;
mod simulate;
mod turn_cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kinmen")]
#[command(about = "Kinmen hex wargame engine driver")]
struct Cli {
    /// RNG seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play AI-vs-AI games
    Simulate(simulate::SimulateArgs),
    /// Show reachable hexes and attack targets for a unit
    Inspect(inspect::InspectArgs),
    /// Preview combat between two units
    Forecast(forecast::ForecastArgs),
    /// End blue's turn, let red answer, save a snapshot
    Turn(turn_cmd::TurnArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Simulate(args) => simulate::run(args, cli.seed),
        Commands::Inspect(args) => inspect::run(args),
        Commands::Forecast(args) => forecast::run(args, cli.seed),
        Commands::Turn(args) => turn_cmd::run(args, cli.seed),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
