//! Game state: turn bookkeeping plus the unit roster
//!
//! The map is not part of the state; it is supplied alongside and never
//! changes during a game.

use std::path::Path;

use crate::error::LoadError;
use crate::hex::Hex;
use crate::map::Map;
use crate::reach::Occupancy;
use crate::turn::{TurnChange, TurnController};
use crate::unit::{Faction, Unit};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Flat save payload: `{turn, currentPlayer, units}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub turn: u32,
    pub current_player: Faction,
    pub units: Vec<Unit>,
}

impl Snapshot {
    /// Load from JSON file
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> Result<(), LoadError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Turn counter, active faction and every unit still in play
#[derive(Clone, Debug)]
pub struct GameState {
    turns: TurnController,
    units: Vec<Unit>,
}

impl GameState {
    /// Fresh game: turn 1, blue to act, every unit refreshed
    pub fn new(mut units: Vec<Unit>) -> Self {
        for unit in &mut units {
            unit.reset_status();
        }
        Self {
            turns: TurnController::default(),
            units,
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            turns: TurnController::at(snapshot.turn, snapshot.current_player),
            units: snapshot.units,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            turn: self.turns.turn(),
            current_player: self.turns.active(),
            units: self.units.clone(),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn turn(&self) -> u32 {
        self.turns.turn()
    }

    pub fn active_faction(&self) -> Faction {
        self.turns.active()
    }

    pub fn turn_controller(&self) -> &TurnController {
        &self.turns
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_index(&self, id: &str) -> Option<usize> {
        self.units.iter().position(|u| u.id == id)
    }

    pub(crate) fn unit_mut_at(&mut self, idx: usize) -> &mut Unit {
        &mut self.units[idx]
    }

    pub fn unit_at(&self, hex: Hex) -> Option<&Unit> {
        self.units.iter().find(|u| u.position == hex)
    }

    pub fn units_of(&self, faction: Faction) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter().filter(move |u| u.faction == faction)
    }

    pub fn occupancy(&self) -> Occupancy {
        Occupancy::new(&self.units)
    }

    /// Factions with at least one unit left
    pub fn surviving_factions(&self) -> Vec<Faction> {
        Faction::ALL
            .into_iter()
            .filter(|&f| self.units.iter().any(|u| u.faction == f))
            .collect()
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    pub fn end_turn(&mut self) -> TurnChange {
        self.turns.end_turn(&mut self.units)
    }

    pub(crate) fn remove_at(&mut self, idx: usize) -> Unit {
        self.units.remove(idx)
    }

    // ========================================================================
    // INVARIANTS
    // ========================================================================

    /// First broken invariant, if any: unique ids, one unit per hex,
    /// hp within `[0, max_hp]`, no destroyed unit left in the roster, and
    /// every unit on the map.
    pub fn check_invariants(&self, map: &Map) -> Result<(), LoadError> {
        let mut ids = FxHashSet::default();
        let mut hexes: FxHashMap<Hex, &str> = FxHashMap::default();

        for unit in &self.units {
            if !ids.insert(unit.id.as_str()) {
                return Err(LoadError::DuplicateUnit(unit.id.clone()));
            }
            if let Some(first) = hexes.insert(unit.position, unit.id.as_str()) {
                return Err(LoadError::StackedUnits {
                    first: first.to_string(),
                    second: unit.id.clone(),
                    hex: unit.position,
                });
            }
            if unit.stats.hp <= 0 || unit.stats.hp > unit.stats.max_hp {
                return Err(LoadError::HpOutOfRange {
                    unit: unit.id.clone(),
                    hp: unit.stats.hp,
                    max_hp: unit.stats.max_hp,
                });
            }
            if !map.contains(unit.position) {
                return Err(LoadError::OffMap {
                    unit: unit.id.clone(),
                    hex: unit.position,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TerrainType;
    use crate::unit::test_stats;

    fn map() -> Map {
        Map::filled(5, 5, "plain", TerrainType::new("Plain", 1, 0.0))
    }

    fn units() -> Vec<Unit> {
        vec![
            Unit::new("b1", "B1", Faction::Blue, Hex::new(0, 0), test_stats(5, 3, 4, 3, 10)),
            Unit::new("r1", "R1", Faction::Red, Hex::new(4, 4), test_stats(8, 4, 5, 5, 20)),
        ]
    }

    #[test]
    fn test_new_state() {
        let state = GameState::new(units());
        assert_eq!(state.turn(), 1);
        assert_eq!(state.active_faction(), Faction::Blue);
        assert_eq!(state.unit_at(Hex::new(4, 4)).map(|u| u.id.as_str()), Some("r1"));
        assert_eq!(state.surviving_factions(), vec![Faction::Blue, Faction::Red]);
        assert!(state.check_invariants(&map()).is_ok());
    }

    #[test]
    fn test_invariant_violations() {
        let mut stacked = units();
        stacked[1].position = Hex::new(0, 0);
        let state = GameState::new(stacked);
        assert!(matches!(state.check_invariants(&map()), Err(LoadError::StackedUnits { .. })));

        let mut off_map = units();
        off_map[0].position = Hex::new(9, 9);
        let state = GameState::new(off_map);
        assert!(matches!(state.check_invariants(&map()), Err(LoadError::OffMap { .. })));

        let mut bad_hp = units();
        bad_hp[0].stats.hp = 11;
        let state = GameState::new(bad_hp);
        assert!(matches!(state.check_invariants(&map()), Err(LoadError::HpOutOfRange { .. })));

        let mut dead = units();
        dead[0].stats.hp = 0;
        let err = GameState::new(dead).check_invariants(&map()).unwrap_err();
        assert!(matches!(err, LoadError::HpOutOfRange { hp: 0, max_hp: 10, .. }));
        assert_eq!(err.to_string(), "unit b1 has hp 0 outside 1..=10");
    }

    #[test]
    fn test_snapshot_file_round_trip() {
        let mut state = GameState::new(units());
        state.end_turn();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        state.snapshot().save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"currentPlayer\": \"red\""));

        let restored = GameState::from_snapshot(Snapshot::load(&path).unwrap());
        assert_eq!(restored.turn(), 1);
        assert_eq!(restored.active_faction(), Faction::Red);
        assert_eq!(restored.units(), state.units());
    }
}
