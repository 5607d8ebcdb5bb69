//! Scenario loading: map and roster descriptors, bundled fallback data

use std::path::Path;

use crate::error::LoadError;
use crate::game::{Game, GameConfig};
use crate::hex::{Hex, Layout};
use crate::map::{Map, TerrainType};
use crate::state::GameState;
use crate::unit::{Faction, Stats, Status, Unit};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// DESCRIPTORS
// ============================================================================

/// Map file layout
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDescriptor {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_hex_size")]
    pub hex_size: f64,
    pub terrain_types: FxHashMap<String, TerrainType>,
    pub hexes: Vec<HexDescriptor>,
    #[serde(default)]
    pub spawn_points: FxHashMap<Faction, Vec<Hex>>,
}

fn default_hex_size() -> f64 {
    Layout::default().hex_size
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HexDescriptor {
    pub q: i32,
    pub r: i32,
    pub terrain: String,
}

/// Stats as written in a roster file; `maxHp` may be left out
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDescriptor {
    pub atk: i32,
    pub def: i32,
    pub mov: i32,
    pub sight: i32,
    pub hp: i32,
    #[serde(default)]
    pub max_hp: Option<i32>,
    #[serde(default)]
    pub logistics: i32,
    #[serde(default)]
    pub morale: i32,
}

/// One roster entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnitDescriptor {
    pub id: String,
    pub name: String,
    pub faction: Faction,
    #[serde(default, alias = "echelon")]
    pub level: String,
    pub q: i32,
    pub r: i32,
    pub stats: StatsDescriptor,
    #[serde(default)]
    pub status: Option<Status>,
}

impl UnitDescriptor {
    pub fn into_unit(self) -> Unit {
        let s = self.stats;
        let stats = Stats {
            atk: s.atk,
            def: s.def,
            mov: s.mov,
            sight: s.sight,
            hp: s.hp,
            max_hp: s.max_hp.unwrap_or(s.hp),
            logistics: s.logistics,
            morale: s.morale,
        };
        let mut unit = Unit::new(&self.id, &self.name, self.faction, Hex::new(self.q, self.r), stats)
            .with_level(&self.level);
        unit.status = self.status.unwrap_or_default();
        unit
    }
}

/// Build a map, rejecting bad terrain entries and unknown terrain keys
pub fn load_map(desc: MapDescriptor) -> Result<Map, LoadError> {
    for (key, terrain) in &desc.terrain_types {
        if terrain.cost == 0 {
            return Err(LoadError::ZeroCost(key.clone()));
        }
        if terrain.def_bonus < 0.0 {
            return Err(LoadError::NegativeBonus(key.clone()));
        }
    }
    if desc.hexes.is_empty() {
        return Err(LoadError::EmptyMap);
    }

    let mut map = Map::new(desc.width, desc.height, Layout::new(desc.hex_size), desc.terrain_types);
    for cell in &desc.hexes {
        let hex = Hex::new(cell.q, cell.r);
        if !hex.in_bounds() {
            return Err(LoadError::CoordinateOutOfRange(hex));
        }
        if !map.set_terrain(hex, &cell.terrain) {
            return Err(LoadError::UnknownTerrain {
                hex,
                terrain: cell.terrain.clone(),
            });
        }
    }
    for (faction, hexes) in desc.spawn_points {
        map.set_spawn_points(faction, hexes);
    }
    Ok(map)
}

pub fn load_units(descs: Vec<UnitDescriptor>) -> Result<Vec<Unit>, LoadError> {
    if descs.is_empty() {
        return Err(LoadError::EmptyRoster);
    }
    Ok(descs.into_iter().map(UnitDescriptor::into_unit).collect())
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

// ============================================================================
// SCENARIO
// ============================================================================

/// A validated map plus its starting roster
#[derive(Clone, Debug)]
pub struct Scenario {
    pub map: Map,
    pub units: Vec<Unit>,
}

impl Scenario {
    /// Pair a map with a roster, checking that every unit fits on it
    pub fn new(map: Map, units: Vec<Unit>) -> Result<Self, LoadError> {
        GameState::new(units.clone()).check_invariants(&map)?;
        Ok(Self { map, units })
    }

    pub fn from_json(map_json: &str, units_json: &str) -> Result<Self, LoadError> {
        let map = load_map(serde_json::from_str(map_json)?)?;
        let units = load_units(serde_json::from_str(units_json)?)?;
        Self::new(map, units)
    }

    /// Load from a map file and a roster file
    pub fn load(map_path: &Path, units_path: &Path) -> Result<Self, LoadError> {
        Self::from_json(&read_file(map_path)?, &read_file(units_path)?)
    }

    /// Load, or fall back to the built-in skirmish when anything is wrong
    pub fn load_or_fallback(map_path: &Path, units_path: &Path) -> Self {
        match Self::load(map_path, units_path) {
            Ok(scenario) => scenario,
            Err(e) => {
                tracing::warn!("Scenario load failed ({}), using built-in fallback", e);
                Self::fallback()
            }
        }
    }

    /// 10x10 plain field with one blue squad and one red platoon
    pub fn fallback() -> Self {
        let mut types = FxHashMap::default();
        types.insert("plain".to_string(), terrain("平原", "#5a8a34", 1, 0.0));
        types.insert("hill".to_string(), terrain("丘陵", "#8b6c42", 2, 1.0));
        types.insert("water".to_string(), terrain("水域", "#3a5da0", 99, 0.0));

        let mut map = Map::new(10, 10, Layout::default(), types);
        for q in 0..10 {
            for r in 0..10 {
                map.set_terrain(Hex::new(q, r), "plain");
            }
        }
        map.set_spawn_points(Faction::Red, vec![Hex::new(1, 1)]);
        map.set_spawn_points(Faction::Blue, vec![Hex::new(8, 8)]);

        let units = vec![
            Unit::new(
                "blue_squad_1",
                "藍軍 步兵班 A",
                Faction::Blue,
                Hex::new(8, 8),
                fallback_stats(5, 3, 4, 3, 10),
            )
            .with_level("squad"),
            Unit::new(
                "red_platoon_1",
                "紅軍 偵察排 R1",
                Faction::Red,
                Hex::new(1, 1),
                fallback_stats(8, 4, 5, 5, 20),
            )
            .with_level("platoon"),
        ];

        Self { map, units }
    }

    pub fn into_game(self, config: GameConfig) -> Result<Game, LoadError> {
        Game::new(self.map, self.units, config)
    }
}

fn terrain(name: &str, color: &str, cost: u32, def_bonus: f64) -> TerrainType {
    TerrainType {
        color: Some(color.to_string()),
        ..TerrainType::new(name, cost, def_bonus)
    }
}

fn fallback_stats(atk: i32, def: i32, mov: i32, sight: i32, hp: i32) -> Stats {
    Stats {
        atk,
        def,
        mov,
        sight,
        hp,
        max_hp: hp,
        logistics: 100,
        morale: 80,
    }
}
