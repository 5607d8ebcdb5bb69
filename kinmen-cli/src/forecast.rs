//! Forecast command - preview one attack without resolving it

use anyhow::{Context, Result};
use clap::Args;

use kinmen_core::GameConfig;

use crate::scenario_args::ScenarioArgs;

#[derive(Args)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Attacking unit id
    #[arg(long)]
    pub attacker: String,

    /// Defending unit id
    #[arg(long)]
    pub defender: String,

    /// Output the forecast as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ForecastArgs, seed: Option<u64>) -> Result<()> {
    let scenario = args.scenario.load()?;
    let mut config = GameConfig::default();
    config.seed = seed;
    let mut game = scenario
        .into_game(config)
        .context("Scenario rejected by the engine")?;

    let forecast = game
        .forecast(&args.attacker, &args.defender)
        .with_context(|| format!("Cannot forecast {} -> {}", args.attacker, args.defender))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(());
    }

    let distance = match (game.unit(&args.attacker), game.unit(&args.defender)) {
        (Some(a), Some(d)) => a.position.distance_to(d.position),
        _ => 0,
    };
    println!("{} -> {}", args.attacker, args.defender);
    println!("  Hit chance:      {:.0}%", forecast.hit_chance * 100.0);
    println!("  Expected damage: {}", forecast.expected_damage);
    println!("  Terrain bonus:   +{}", forecast.defender_terrain_bonus);
    if distance > 1 {
        println!("  (not adjacent: {} hexes apart)", distance);
    }
    Ok(())
}
