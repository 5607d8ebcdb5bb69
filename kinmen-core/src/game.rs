//! Engine facade: validated actions over a map and a game state
//!
//! Every `request_*` either applies fully or returns an [`ActionError`]
//! with nothing changed. Each action also lands in the event log.

use crate::ai::{AiConfig, AiController, AiReport};
use crate::combat::{self, CombatForecast, CombatOutcome};
use crate::error::{ActionError, ActionResult, LoadError};
use crate::events::GameEvent;
use crate::hex::Hex;
use crate::map::Map;
use crate::reach::{self, ReachableSet};
use crate::state::{GameState, Snapshot};
use crate::turn::TurnChange;
use crate::unit::{Faction, StatKind, Unit, UnitId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Engine settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// RNG seed for reproducible games (None = entropy)
    pub seed: Option<u64>,
    /// Factions whose turns the engine plays itself after a handoff
    pub ai_factions: Vec<Faction>,
    pub ai: AiConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            ai_factions: vec![Faction::Red],
            ai: AiConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_ai_factions(mut self, factions: &[Faction]) -> Self {
        self.ai_factions = factions.to_vec();
        self
    }
}

/// A running game
pub struct Game {
    map: Map,
    state: GameState,
    config: GameConfig,
    rng: ChaCha8Rng,
    events: Vec<GameEvent>,
}

impl Game {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Start a new game at turn 1 with blue to act
    pub fn new(map: Map, units: Vec<Unit>, config: GameConfig) -> Result<Self, LoadError> {
        if map.is_empty() {
            return Err(LoadError::EmptyMap);
        }
        let state = GameState::new(units);
        state.check_invariants(&map)?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut game = Self {
            map,
            state,
            config,
            rng,
            events: Vec::new(),
        };
        game.record(GameEvent::TurnStarted {
            turn: 1,
            faction: Faction::Blue,
        });
        Ok(game)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn turn(&self) -> u32 {
        self.state.turn()
    }

    pub fn active_faction(&self) -> Faction {
        self.state.active_faction()
    }

    pub fn units(&self) -> &[Unit] {
        self.state.units()
    }

    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.state.unit(id)
    }

    pub fn is_ai_controlled(&self, faction: Faction) -> bool {
        self.config.ai_factions.contains(&faction)
    }

    /// Event log since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn parts(&mut self) -> (&Map, &GameState, &mut ChaCha8Rng) {
        (&self.map, &self.state, &mut self.rng)
    }

    pub(crate) fn record(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Landing hexes for a unit, `None` for an unknown id
    pub fn compute_reachable(&self, unit_id: &str) -> Option<ReachableSet> {
        let unit = self.state.unit(unit_id)?;
        Some(reach::reachable(&self.map, self.state.units(), unit))
    }

    /// Enemies a unit could strike this action, keyed by their hex
    pub fn compute_attackable(&self, unit_id: &str) -> Option<FxHashMap<Hex, UnitId>> {
        let unit = self.state.unit(unit_id)?;
        Some(reach::attackable(&self.map, self.state.units(), unit))
    }

    /// Combat preview; draws a damage factor but changes no unit
    pub fn forecast(&mut self, attacker_id: &str, defender_id: &str) -> ActionResult<CombatForecast> {
        let attacker = self.lookup(attacker_id)?.stats;
        let defender = self.lookup(defender_id)?;
        let bonus = self.map.defense_bonus(defender.position);
        let defender = defender.stats;
        Ok(combat::forecast(&attacker, &defender, bonus, &mut self.rng))
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    /// Move a unit to a hex in its landing set; returns the path cost
    pub fn request_move(&mut self, unit_id: &str, target: Hex) -> ActionResult<u32> {
        let result = self.try_move(unit_id, target);
        self.note_rejection(&result);
        result
    }

    fn try_move(&mut self, unit_id: &str, target: Hex) -> ActionResult<u32> {
        let idx = self.active_unit(unit_id)?;
        let unit = &self.state.units()[idx];
        if unit.status.moved {
            return Err(ActionError::AlreadyMoved(unit.id.clone()));
        }

        let landing = reach::reachable(&self.map, self.state.units(), unit);
        let cost = match landing.cost(target) {
            Some(cost) if target != unit.position => cost,
            _ => {
                return Err(ActionError::Unreachable {
                    unit: unit.id.clone(),
                    target,
                })
            }
        };

        let unit = self.state.unit_mut_at(idx);
        let from = unit.position;
        unit.position = target;
        unit.status.moved = true;
        let id = unit.id.clone();

        tracing::debug!("{} moved {} -> {} (cost {})", id, from, target, cost);
        self.record(GameEvent::UnitMoved {
            unit: id,
            from,
            to: target,
            cost,
        });
        self.debug_check();
        Ok(cost)
    }

    /// Attack an adjacent enemy
    pub fn request_attack(&mut self, attacker_id: &str, defender_id: &str) -> ActionResult<CombatOutcome> {
        let result = self.try_attack(attacker_id, defender_id);
        self.note_rejection(&result);
        result
    }

    fn try_attack(&mut self, attacker_id: &str, defender_id: &str) -> ActionResult<CombatOutcome> {
        let a_idx = self.active_unit(attacker_id)?;
        let d_idx = self
            .state
            .unit_index(defender_id)
            .ok_or_else(|| ActionError::UnknownUnit(defender_id.to_string()))?;

        let attacker = &self.state.units()[a_idx];
        let defender = &self.state.units()[d_idx];
        if attacker.status.acted {
            return Err(ActionError::AlreadyActed(attacker.id.clone()));
        }
        if !attacker.is_enemy_of(defender) {
            return Err(ActionError::FriendlyTarget {
                unit: attacker.id.clone(),
                target: defender.id.clone(),
            });
        }
        if attacker.position.distance_to(defender.position) > 1 {
            return Err(ActionError::OutOfRange {
                unit: attacker.id.clone(),
                target: defender.id.clone(),
            });
        }

        let attacker_stats = attacker.stats;
        let attacker_id = attacker.id.clone();
        let bonus = self.map.defense_bonus(defender.position);

        let outcome = {
            let defender = self.state.unit_mut_at(d_idx);
            combat::strike(&attacker_id, &attacker_stats, defender, bonus, &mut self.rng)
        };
        self.state.unit_mut_at(a_idx).spend();

        if outcome.hit {
            tracing::info!(
                "{} hit {} for {} (hp {} left, terrain +{})",
                outcome.attacker,
                outcome.defender,
                outcome.damage,
                outcome.defender_hp,
                bonus
            );
        } else {
            tracing::info!("{} missed {}", outcome.attacker, outcome.defender);
        }
        self.record(GameEvent::Attack(outcome.clone()));

        if outcome.destroyed {
            self.state.remove_at(d_idx);
            tracing::info!("{} destroyed", outcome.defender);
            self.record(GameEvent::UnitDestroyed {
                unit: outcome.defender.clone(),
            });
        }
        self.debug_check();
        Ok(outcome)
    }

    /// Give up a unit's remaining actions this turn
    pub fn request_wait(&mut self, unit_id: &str) -> ActionResult<()> {
        let result = self.try_wait(unit_id);
        self.note_rejection(&result);
        result
    }

    fn try_wait(&mut self, unit_id: &str) -> ActionResult<()> {
        let idx = self.active_unit(unit_id)?;
        let unit = self.state.unit_mut_at(idx);
        if unit.status.acted {
            return Err(ActionError::AlreadyActed(unit.id.clone()));
        }
        unit.spend();
        let id = unit.id.clone();
        tracing::debug!("{} waits", id);
        self.record(GameEvent::UnitWaited { unit: id });
        Ok(())
    }

    /// End the active faction's turn. When the incoming faction is
    /// AI-controlled it plays its turn here and hands back before returning.
    pub fn request_end_turn(&mut self) -> TurnChange {
        let change = self.end_turn();
        if self.is_ai_controlled(change.active) {
            self.run_ai_turn()
        } else {
            change
        }
    }

    /// Let the AI play the active faction's turn, then end it
    pub fn run_ai_turn(&mut self) -> TurnChange {
        let report = self.run_ai();
        let pause = self.config.ai.handoff_pause();
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
        tracing::info!(
            "{} AI done: {} attacks, {} moves, {} waits",
            report.faction,
            report.attacks,
            report.moves,
            report.waits
        );
        self.end_turn()
    }

    /// Run the AI for the active faction without ending the turn
    pub fn run_ai(&mut self) -> AiReport {
        let controller = AiController::new(self.config.ai.clone());
        controller.run(self)
    }

    fn end_turn(&mut self) -> TurnChange {
        let change = self.state.end_turn();
        tracing::info!("Turn {}: {} to act", change.turn, change.active);
        self.record(GameEvent::TurnStarted {
            turn: change.turn,
            faction: change.active,
        });
        change
    }

    // ========================================================================
    // EDITOR
    // ========================================================================

    /// Change one stat; a unit edited down to 0 hp leaves the roster
    pub fn edit_stat(&mut self, unit_id: &str, stat: StatKind, value: i32) -> ActionResult<()> {
        let idx = self.lookup_index(unit_id)?;
        let unit = self.state.unit_mut_at(idx);
        unit.set_stat(stat, value);
        let destroyed = unit.is_destroyed();
        let id = unit.id.clone();

        tracing::info!("{} {:?} set to {}", id, stat, value);
        self.record(GameEvent::StatEdited {
            unit: id.clone(),
            stat,
            value,
        });
        if destroyed {
            self.state.remove_at(idx);
            self.record(GameEvent::UnitDestroyed { unit: id });
        }
        Ok(())
    }

    /// Delete a unit outright
    pub fn remove_unit(&mut self, unit_id: &str) -> ActionResult<Unit> {
        let idx = self.lookup_index(unit_id)?;
        let unit = self.state.remove_at(idx);
        self.record(GameEvent::UnitRemoved { unit: unit.id.clone() });
        Ok(unit)
    }

    // ========================================================================
    // SAVE / RESTORE
    // ========================================================================

    /// Flat snapshot of turn, active faction and roster; the map is excluded
    pub fn serialize(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Replace the state with a snapshot, validated against the current map
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<(), LoadError> {
        if snapshot.turn == 0 {
            return Err(LoadError::InvalidTurn);
        }
        let state = GameState::from_snapshot(snapshot);
        state.check_invariants(&self.map)?;
        self.state = state;
        tracing::info!(
            "Restored turn {}, {} to act, {} units",
            self.state.turn(),
            self.state.active_faction(),
            self.state.units().len()
        );
        Ok(())
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn lookup_index(&self, unit_id: &str) -> ActionResult<usize> {
        self.state
            .unit_index(unit_id)
            .ok_or_else(|| ActionError::UnknownUnit(unit_id.to_string()))
    }

    fn lookup(&self, unit_id: &str) -> ActionResult<&Unit> {
        self.state
            .unit(unit_id)
            .ok_or_else(|| ActionError::UnknownUnit(unit_id.to_string()))
    }

    /// Index of a unit that belongs to the active faction
    fn active_unit(&self, unit_id: &str) -> ActionResult<usize> {
        let idx = self.lookup_index(unit_id)?;
        let unit = &self.state.units()[idx];
        let active = self.state.active_faction();
        if unit.faction != active {
            return Err(ActionError::NotYourTurn {
                unit: unit.id.clone(),
                faction: unit.faction,
                active,
            });
        }
        Ok(idx)
    }

    fn note_rejection<T>(&mut self, result: &ActionResult<T>) {
        if let Err(e) = result {
            tracing::warn!("Rejected: {}", e);
            self.record(GameEvent::Rejected { reason: e.to_string() });
        }
    }

    fn debug_check(&self) {
        debug_assert!(
            self.state.check_invariants(&self.map).is_ok(),
            "invariant violated: {:?}",
            self.state.check_invariants(&self.map)
        );
    }
}
