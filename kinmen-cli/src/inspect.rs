//! Inspect command - movement and threat ranges for one unit

use anyhow::{Context, Result};
use clap::Args;

use kinmen_core::{GameConfig, Hex};

use crate::scenario_args::ScenarioArgs;

#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Unit id
    #[arg(long)]
    pub unit: String,
}

pub fn run(args: InspectArgs) -> Result<()> {
    let scenario = args.scenario.load()?;
    let game = scenario
        .into_game(GameConfig::default())
        .context("Scenario rejected by the engine")?;

    let unit = game
        .unit(&args.unit)
        .with_context(|| format!("No unit with id {}", args.unit))?;
    println!(
        "{} ({}, {} {}) at {}  hp {}/{}  mov {}",
        unit.id, unit.name, unit.faction, unit.level, unit.position, unit.stats.hp, unit.stats.max_hp, unit.stats.mov
    );

    let reach = game
        .compute_reachable(&args.unit)
        .with_context(|| format!("No unit with id {}", args.unit))?;
    println!("\nReachable ({} hexes, search order):", reach.len());
    for (hex, cost) in reach.iter() {
        println!("  {:<10} cost {}", hex.to_string(), cost);
    }

    let mut targets: Vec<(Hex, String)> = game
        .compute_attackable(&args.unit)
        .with_context(|| format!("No unit with id {}", args.unit))?
        .into_iter()
        .collect();
    targets.sort();

    println!("\nAttackable ({}):", targets.len());
    for (hex, id) in targets {
        println!("  {:<10} {}", hex.to_string(), id);
    }
    Ok(())
}
