//! Opposing-faction AI
//!
//! Greedy one-unit-at-a-time play: strike an adjacent enemy if possible,
//! otherwise close in on the nearest one, otherwise wait. A configurable
//! chance to hesitate keeps it beatable.

use std::time::Duration;

use crate::combat;
use crate::events::GameEvent;
use crate::game::Game;
use crate::hex::Hex;
use crate::reach;
use crate::unit::{Faction, UnitId};
use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIG
// ============================================================================

/// Chance that the AI skips its best option for a unit
const DEFAULT_BLUNDER_CHANCE: f64 = 0.10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Rolled separately for the attack and the approach decision
    pub blunder_chance: f64,
    /// Pause between unit decisions
    pub unit_pause_ms: u64,
    /// Pause before handing the turn back
    pub handoff_pause_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            blunder_chance: DEFAULT_BLUNDER_CHANCE,
            unit_pause_ms: 0,
            handoff_pause_ms: 0,
        }
    }
}

impl AiConfig {
    pub fn with_blunder_chance(mut self, chance: f64) -> Self {
        self.blunder_chance = chance.clamp(0.0, 1.0);
        self
    }

    pub fn with_pacing(mut self, unit_pause_ms: u64, handoff_pause_ms: u64) -> Self {
        self.unit_pause_ms = unit_pause_ms;
        self.handoff_pause_ms = handoff_pause_ms;
        self
    }

    pub fn unit_pause(&self) -> Duration {
        Duration::from_millis(self.unit_pause_ms)
    }

    pub fn handoff_pause(&self) -> Duration {
        Duration::from_millis(self.handoff_pause_ms)
    }
}

// ============================================================================
// DECISIONS
// ============================================================================

/// What the AI chose for one unit
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AiAction {
    Attack { target: UnitId },
    Move { to: Hex },
    Wait,
}

/// Tally of one AI turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiReport {
    pub faction: Faction,
    pub attacks: u32,
    pub moves: u32,
    pub waits: u32,
    pub hesitations: u32,
}

impl AiReport {
    fn new(faction: Faction) -> Self {
        Self {
            faction,
            attacks: 0,
            moves: 0,
            waits: 0,
            hesitations: 0,
        }
    }
}

pub struct AiController {
    pub config: AiConfig,
}

impl AiController {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }

    /// Play every unit of the active faction that has not acted yet, in
    /// roster order. Does not end the turn.
    pub fn run(&self, game: &mut Game) -> AiReport {
        let faction = game.active_faction();
        let ids: Vec<UnitId> = game
            .state()
            .units_of(faction)
            .filter(|u| !u.status.acted)
            .map(|u| u.id.clone())
            .collect();

        let mut report = AiReport::new(faction);
        let pause = self.config.unit_pause();
        for (i, id) in ids.iter().enumerate() {
            if i > 0 && !pause.is_zero() {
                std::thread::sleep(pause);
            }
            self.play_unit(game, id, &mut report);
        }
        report
    }

    /// Decide and act for one unit. A move is followed by exactly one more
    /// attack decision from the new hex.
    fn play_unit(&self, game: &mut Game, id: &str, report: &mut AiReport) {
        if game.unit(id).is_none() {
            return;
        }

        let action = self.decide(game, id, report);
        tracing::debug!("AI {}: {:?}", id, action);
        match action {
            AiAction::Attack { target } => self.attack(game, id, &target, report),
            AiAction::Move { to } => {
                if game.request_move(id, to).is_err() {
                    self.wait(game, id, report);
                    return;
                }
                report.moves += 1;
                match self.immediate_attack(game, id, report) {
                    Some(AiAction::Attack { target }) => self.attack(game, id, &target, report),
                    _ => self.wait(game, id, report),
                }
            }
            AiAction::Wait => self.wait(game, id, report),
        }
    }

    fn decide(&self, game: &mut Game, id: &str, report: &mut AiReport) -> AiAction {
        if let Some(action) = self.immediate_attack(game, id, report) {
            return action;
        }
        let can_move = game.unit(id).is_some_and(|u| !u.status.moved);
        if can_move {
            if let Some(action) = self.approach(game, id, report) {
                return action;
            }
        }
        AiAction::Wait
    }

    /// Lowest-hp enemy next to the unit's current hex. `None` when there is
    /// nothing to strike.
    fn immediate_attack(&self, game: &mut Game, id: &str, report: &mut AiReport) -> Option<AiAction> {
        let (target, hesitated) = {
            let (map, state, rng) = game.parts();
            let unit = state.unit(id)?;
            if unit.status.acted {
                return None;
            }
            let target = reach::adjacent_enemies(state.units(), unit.faction, unit.position)
                .into_iter()
                .min_by_key(|e| e.stats.hp)?;
            let forecast = combat::forecast(&unit.stats, &target.stats, map.defense_bonus(target.position), rng);
            if forecast.expected_damage <= 0 {
                return None;
            }
            (target.id.clone(), self.hesitates(rng))
        };

        if hesitated {
            self.note_hesitation(game, id, report);
            return Some(AiAction::Wait);
        }
        Some(AiAction::Attack { target })
    }

    /// Landing hex toward the nearest enemy: the first one adjacent to it in
    /// search order, else the first of those closest to it. Only hexes
    /// strictly closer than the current one count.
    fn approach(&self, game: &mut Game, id: &str, report: &mut AiReport) -> Option<AiAction> {
        let (to, hesitated) = {
            let (map, state, rng) = game.parts();
            let unit = state.unit(id)?;
            let goal = state
                .units()
                .iter()
                .filter(|e| e.is_enemy_of(unit))
                .min_by_key(|e| unit.position.distance_to(e.position))?
                .position;

            let origin = unit.position;
            let landing = reach::reachable_with(map, &state.occupancy(), unit);
            let candidates: Vec<Hex> = landing.hexes().iter().copied().filter(|&h| h != origin).collect();

            let to = match candidates.iter().copied().find(|h| h.distance_to(goal) == 1) {
                Some(hex) => hex,
                None => {
                    let mut best: Option<Hex> = None;
                    let mut best_distance = origin.distance_to(goal);
                    for hex in candidates {
                        let d = hex.distance_to(goal);
                        if d < best_distance {
                            best_distance = d;
                            best = Some(hex);
                        }
                    }
                    best?
                }
            };
            (to, self.hesitates(rng))
        };

        if hesitated {
            self.note_hesitation(game, id, report);
            return Some(AiAction::Wait);
        }
        Some(AiAction::Move { to })
    }

    fn attack(&self, game: &mut Game, id: &str, target: &str, report: &mut AiReport) {
        match game.request_attack(id, target) {
            Ok(_) => report.attacks += 1,
            Err(_) => self.wait(game, id, report),
        }
    }

    fn wait(&self, game: &mut Game, id: &str, report: &mut AiReport) {
        if game.request_wait(id).is_ok() {
            report.waits += 1;
        }
    }

    fn hesitates<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen::<f64>() < self.config.blunder_chance
    }

    fn note_hesitation(&self, game: &mut Game, id: &str, report: &mut AiReport) {
        tracing::debug!("AI {} hesitates", id);
        report.hesitations += 1;
        game.record(GameEvent::AiHesitated { unit: id.to_string() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use crate::map::{Map, TerrainType};
    use crate::unit::{test_stats, Status, Unit};

    fn red(id: &str, hex: Hex, mov: i32) -> Unit {
        Unit::new(id, id, Faction::Red, hex, test_stats(8, 4, mov, 5, 20))
    }

    fn blue(id: &str, hex: Hex, hp: i32) -> Unit {
        Unit::new(id, id, Faction::Blue, hex, test_stats(5, 3, 4, 3, hp))
    }

    /// Red to act, AI never hesitates unless told to
    fn red_to_act(units: Vec<Unit>, blunder_chance: f64) -> Game {
        let map = Map::filled(10, 10, "plain", TerrainType::new("Plain", 1, 0.0));
        let mut config = GameConfig::default().with_seed(42).with_ai_factions(&[]);
        config.ai = AiConfig::default().with_blunder_chance(blunder_chance);
        let mut game = Game::new(map, units, config).unwrap();
        game.request_end_turn();
        assert_eq!(game.active_faction(), Faction::Red);
        game
    }

    fn attacked(game: &Game) -> Vec<String> {
        game.events()
            .iter()
            .filter_map(|e| match e {
                GameEvent::Attack(o) => Some(o.defender.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_attacks_weakest_neighbor() {
        let mut game = red_to_act(
            vec![
                red("r", Hex::new(1, 0), 4),
                blue("b1", Hex::new(0, 0), 10),
                blue("b2", Hex::new(2, 0), 4),
            ],
            0.0,
        );
        let report = game.run_ai();
        assert_eq!(report.attacks, 1);
        assert_eq!(report.moves, 0);
        assert_eq!(attacked(&game), vec!["b2".to_string()]);
        assert_eq!(game.unit("r").unwrap().position, Hex::new(1, 0));
    }

    #[test]
    fn test_approach_then_follow_up_attack() {
        let mut game = red_to_act(vec![red("r", Hex::new(4, 0), 4), blue("b", Hex::new(0, 0), 10)], 0.0);
        let report = game.run_ai();
        assert_eq!(report.moves, 1);
        assert_eq!(report.attacks, 1);
        let r = game.unit("r").unwrap();
        // (1,0) is the only neighbor of b within three steps
        assert_eq!(r.position, Hex::new(1, 0));
        assert_eq!(r.status, Status::SPENT);
    }

    #[test]
    fn test_equal_hp_neighbors_first_direction_wins() {
        // (2,1) is east of r and comes before (1,2) in direction order
        let mut game = red_to_act(
            vec![
                red("r", Hex::new(1, 1), 4),
                blue("south", Hex::new(1, 2), 10),
                blue("east", Hex::new(2, 1), 10),
            ],
            0.0,
        );
        let report = game.run_ai();
        assert_eq!(report.attacks, 1);
        assert_eq!(attacked(&game), vec!["east".to_string()]);
    }

    #[test]
    fn test_equidistant_enemies_first_in_roster_wins() {
        let west = Hex::new(1, 5);
        let north = Hex::new(5, 1);
        assert_eq!(Hex::new(5, 5).distance_to(west), Hex::new(5, 5).distance_to(north));

        let mut game = red_to_act(vec![red("r", Hex::new(5, 5), 3), blue("w", west, 10), blue("n", north, 10)], 0.0);
        game.run_ai();
        // (2,5) and (2,6) both border w at cost 3; (2,5) settles first
        assert_eq!(game.unit("r").unwrap().position, Hex::new(2, 5));
        assert_eq!(attacked(&game), vec!["w".to_string()]);

        let mut game = red_to_act(vec![red("r", Hex::new(5, 5), 3), blue("n", north, 10), blue("w", west, 10)], 0.0);
        game.run_ai();
        let r = game.unit("r").unwrap();
        assert_eq!(r.position.distance_to(north), 1);
        assert!(r.position.distance_to(west) > 1);
        assert_eq!(attacked(&game), vec!["n".to_string()]);
    }

    #[test]
    fn test_spent_units_are_skipped() {
        let mut game = red_to_act(
            vec![
                red("r1", Hex::new(1, 0), 4),
                red("r2", Hex::new(8, 8), 1),
                blue("b", Hex::new(0, 0), 10),
            ],
            0.0,
        );
        game.request_wait("r1").unwrap();

        let report = game.run_ai();
        assert_eq!((report.attacks, report.moves, report.waits), (0, 1, 1));
        assert_eq!(game.unit("r1").unwrap().position, Hex::new(1, 0));
        assert_eq!(game.unit("b").unwrap().stats.hp, 10);
        assert!(attacked(&game).is_empty());
    }

    #[test]
    fn test_moved_unit_may_still_attack_but_not_move() {
        let mut game = red_to_act(vec![red("r", Hex::new(3, 0), 4), blue("b", Hex::new(0, 0), 10)], 0.0);
        game.request_move("r", Hex::new(1, 0)).unwrap();
        let report = game.run_ai();
        assert_eq!((report.attacks, report.moves), (1, 0));

        let mut game = red_to_act(vec![red("r", Hex::new(3, 0), 4), blue("b", Hex::new(0, 0), 10)], 0.0);
        game.request_move("r", Hex::new(6, 0)).unwrap();
        let report = game.run_ai();
        assert_eq!((report.attacks, report.moves, report.waits), (0, 0, 1));
        assert_eq!(game.unit("r").unwrap().position, Hex::new(6, 0));
    }

    #[test]
    fn test_approach_gets_strictly_closer() {
        let mut game = red_to_act(vec![red("r", Hex::new(6, 0), 2), blue("b", Hex::new(0, 0), 10)], 0.0);
        let report = game.run_ai();
        assert_eq!(report.moves, 1);
        assert_eq!(report.attacks, 0);
        assert_eq!(report.waits, 1);
        assert_eq!(game.unit("r").unwrap().position.distance_to(Hex::new(0, 0)), 4);
    }

    #[test]
    fn test_immobile_units_wait() {
        let mut units = vec![red("r", Hex::new(0, 0), 4), blue("b", Hex::new(9, 9), 10)];
        let friends = [Hex::new(1, 0), Hex::new(0, 1)];
        for (i, hex) in friends.into_iter().enumerate() {
            units.push(red(&format!("f{i}"), hex, 0));
        }
        let mut game = red_to_act(units, 0.0);
        let report = game.run_ai();
        // r crosses its friends; the zero-move friends stay put
        assert_eq!(game.unit("f0").unwrap().position, Hex::new(1, 0));
        assert_eq!(game.unit("f1").unwrap().position, Hex::new(0, 1));
        assert_eq!(report.moves, 1);
        assert_eq!(report.waits, 3);
        assert!(game.units().iter().all(|u| u.faction == Faction::Blue || u.status.acted));
    }

    #[test]
    fn test_always_hesitating_ai_only_waits() {
        let mut game = red_to_act(
            vec![
                red("r1", Hex::new(1, 0), 4),
                red("r2", Hex::new(6, 6), 4),
                blue("b", Hex::new(0, 0), 10),
            ],
            1.0,
        );
        let before: Vec<Hex> = game.units().iter().map(|u| u.position).collect();
        let report = game.run_ai();
        assert_eq!(report.hesitations, 2);
        assert_eq!(report.waits, 2);
        assert_eq!(report.attacks + report.moves, 0);
        let after: Vec<Hex> = game.units().iter().map(|u| u.position).collect();
        assert_eq!(before, after);
        assert!(game.events().iter().any(|e| matches!(e, GameEvent::AiHesitated { .. })));
    }

    #[test]
    fn test_no_enemies_means_wait() {
        let mut game = red_to_act(vec![red("r", Hex::new(3, 3), 4), blue("b", Hex::new(0, 0), 10)], 0.0);
        game.remove_unit("b").unwrap();
        let report = game.run_ai();
        assert_eq!(report.waits, 1);
        assert_eq!(game.unit("r").unwrap().position, Hex::new(3, 3));
    }
}
