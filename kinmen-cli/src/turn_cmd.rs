//! Turn command - hand blue's turn to the red AI and save the result
//!
//! Resumes from a snapshot when given one. The red response is printed as
//! one JSON event per line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use kinmen_core::{Faction, GameConfig, Snapshot};

use crate::scenario_args::ScenarioArgs;

#[derive(Args)]
pub struct TurnArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Where to write the snapshot after red has played
    #[arg(long, value_name = "FILE")]
    pub save: PathBuf,

    /// Snapshot to resume from
    #[arg(long, value_name = "FILE")]
    pub resume: Option<PathBuf>,
}

pub fn run(args: TurnArgs, seed: Option<u64>) -> Result<()> {
    let scenario = args.scenario.load()?;
    let mut config = GameConfig::default().with_ai_factions(&[Faction::Red]);
    config.seed = seed;
    let mut game = scenario
        .into_game(config)
        .context("Scenario rejected by the engine")?;

    if let Some(path) = &args.resume {
        let snapshot = Snapshot::load(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        game.restore(snapshot)
            .with_context(|| format!("Snapshot does not fit the scenario: {}", path.display()))?;
    }
    game.drain_events();

    let change = match game.active_faction() {
        Faction::Blue => game.request_end_turn(),
        Faction::Red => game.run_ai_turn(),
    };

    for event in game.drain_events() {
        println!("{}", serde_json::to_string(&event)?);
    }

    game.serialize()
        .save(&args.save)
        .with_context(|| format!("Failed to write snapshot: {}", args.save.display()))?;

    tracing::info!(
        "Turn {}: {} to act, saved to {}",
        change.turn,
        change.active,
        args.save.display()
    );
    Ok(())
}
