//! Simulate command - AI-vs-AI games on one scenario
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games(), report_results()
//! - Level 3: play_single_game(), compute_statistics()
//! - Level 4: formatting utilities

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

use kinmen_core::{Faction, Game, GameConfig, GameEvent, Scenario};

use crate::scenario_args::ScenarioArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Full turns (blue + red) per game
    #[arg(long, default_value = "20")]
    pub turns: u32,

    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Chance the AI skips its best option
    #[arg(long, default_value = "0.1")]
    pub blunder_chance: f64,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Units left on one side at the end of a game
#[derive(Clone, Debug, Default, Serialize)]
struct ForceRecord {
    units: usize,
    hp: i32,
}

/// Result of a single game
#[derive(Clone, Debug, Serialize)]
struct GameRecord {
    game_number: usize,
    seed: u64,
    turns: u32,
    winner: Option<Faction>,
    attacks: usize,
    hits: usize,
    destroyed: usize,
    blue: ForceRecord,
    red: ForceRecord,
}

/// Aggregated results
#[derive(Clone, Debug, Serialize)]
struct SimulationResults {
    total_games: usize,
    blue_wins: usize,
    red_wins: usize,
    undecided: usize,
    avg_turns: f32,
    games: Vec<GameRecord>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run simulate command
pub fn run(args: SimulateArgs, seed: Option<u64>) -> Result<()> {
    let scenario = args.scenario.load()?;

    tracing::info!(
        "Simulating {} games of up to {} turns ({} units, {} hexes)",
        args.games,
        args.turns,
        scenario.units.len(),
        scenario.map.len()
    );

    let records = play_games(&scenario, &args, seed.unwrap_or(42))?;
    let results = compute_statistics(records);

    report_results(&results, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games in parallel, one seed per game
fn play_games(scenario: &Scenario, args: &SimulateArgs, base_seed: u64) -> Result<Vec<GameRecord>> {
    let progress = if args.json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(args.games as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games")
                .context("Invalid progress template")?
                .progress_chars("=>-"),
        );
        pb
    };

    let records = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let seed = base_seed.wrapping_add(i as u64);
            let record = play_single_game(scenario, args, i + 1, seed);
            progress.inc(1);
            record
        })
        .collect::<Result<Vec<_>>>()?;

    progress.finish_and_clear();
    Ok(records)
}

fn report_results(results: &SimulationResults, args: &SimulateArgs) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        print_text_results(results);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_single_game(scenario: &Scenario, args: &SimulateArgs, game_number: usize, seed: u64) -> Result<GameRecord> {
    let mut config = GameConfig::default()
        .with_seed(seed)
        .with_ai_factions(&Faction::ALL);
    config.ai = config.ai.with_blunder_chance(args.blunder_chance);

    let mut game = scenario
        .clone()
        .into_game(config)
        .with_context(|| format!("Game {} could not start", game_number))?;

    let (mut attacks, mut hits, mut destroyed) = (0, 0, 0);
    while game.turn() <= args.turns && game.state().surviving_factions().len() == 2 {
        game.run_ai_turn();
        for event in game.drain_events() {
            match event {
                GameEvent::Attack(outcome) => {
                    attacks += 1;
                    if outcome.hit {
                        hits += 1;
                    }
                }
                GameEvent::UnitDestroyed { .. } => destroyed += 1,
                _ => {}
            }
        }
    }

    let survivors = game.state().surviving_factions();
    let winner = match survivors.as_slice() {
        [only] => Some(*only),
        _ => None,
    };
    let turns = game.turn().min(args.turns);

    tracing::debug!("Game {}: winner {:?} after {} turns", game_number, winner, turns);

    Ok(GameRecord {
        game_number,
        seed,
        turns,
        winner,
        attacks,
        hits,
        destroyed,
        blue: force_record(&game, Faction::Blue),
        red: force_record(&game, Faction::Red),
    })
}

fn compute_statistics(games: Vec<GameRecord>) -> SimulationResults {
    let wins = |f: Faction| games.iter().filter(|g| g.winner == Some(f)).count();
    let blue_wins = wins(Faction::Blue);
    let red_wins = wins(Faction::Red);

    let total_turns: u32 = games.iter().map(|g| g.turns).sum();
    let avg_turns = if games.is_empty() {
        0.0
    } else {
        total_turns as f32 / games.len() as f32
    };

    SimulationResults {
        total_games: games.len(),
        blue_wins,
        red_wins,
        undecided: games.len() - blue_wins - red_wins,
        avg_turns,
        games,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn force_record(game: &Game, faction: Faction) -> ForceRecord {
    game.state()
        .units_of(faction)
        .fold(ForceRecord::default(), |mut acc, u| {
            acc.units += 1;
            acc.hp += u.stats.hp;
            acc
        })
}

fn percent(part: usize, total: usize) -> f32 {
    if total > 0 {
        part as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

fn print_text_results(results: &SimulationResults) {
    let total = results.total_games;

    println!("\n=== Simulation Results ===");
    println!("Total games: {}", total);
    println!("Blue wins:   {} ({:.1}%)", results.blue_wins, percent(results.blue_wins, total));
    println!("Red wins:    {} ({:.1}%)", results.red_wins, percent(results.red_wins, total));
    println!("Undecided:   {} ({:.1}%)", results.undecided, percent(results.undecided, total));
    println!("Avg turns:   {:.1}", results.avg_turns);

    println!("\n  #  seed        turns  winner  attacks  hits  kills  blue(u/hp)  red(u/hp)");
    for g in &results.games {
        let winner = g.winner.map_or_else(|| "-".to_string(), |f| f.to_string());
        println!(
            "{:>3}  {:<10}  {:>5}  {:<6}  {:>7}  {:>4}  {:>5}  {:>4}/{:<5}  {:>3}/{:<5}",
            g.game_number,
            g.seed,
            g.turns,
            winner,
            g.attacks,
            g.hits,
            g.destroyed,
            g.blue.units,
            g.blue.hp,
            g.red.units,
            g.red.hp
        );
    }
}
