//! Terrain grid keyed by hex coordinate

use crate::hex::{Hex, Layout};
use crate::unit::Faction;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Movement cost of impassable terrain, and of any hex off the map
pub const IMPASSABLE: u32 = u32::MAX;

/// Terrain type as declared in a map's terrain dictionary
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Movement points needed to enter
    #[serde(default = "default_terrain_cost")]
    pub cost: u32,
    /// Added to the defender's effective defense
    #[serde(default)]
    pub def_bonus: f64,
}

fn default_terrain_cost() -> u32 {
    99
}

impl TerrainType {
    pub fn new(name: &str, cost: u32, def_bonus: f64) -> Self {
        Self {
            name: name.to_string(),
            color: None,
            cost,
            def_bonus,
        }
    }
}

/// One cell of the map
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainCell {
    /// Key into the terrain dictionary
    pub kind: String,
    pub movement_cost: u32,
    pub defense_bonus: f64,
}

/// Battlefield terrain. Built once at load, read-only afterwards.
#[derive(Clone, Debug)]
pub struct Map {
    pub width: u32,
    pub height: u32,
    pub layout: Layout,
    terrain_types: FxHashMap<String, TerrainType>,
    cells: FxHashMap<Hex, TerrainCell>,
    spawn_points: FxHashMap<Faction, Vec<Hex>>,
}

impl Map {
    /// Empty map with the given terrain dictionary
    pub fn new(width: u32, height: u32, layout: Layout, terrain_types: FxHashMap<String, TerrainType>) -> Self {
        Self {
            width,
            height,
            layout,
            terrain_types,
            cells: FxHashMap::default(),
            spawn_points: FxHashMap::default(),
        }
    }

    /// Rectangular `width` x `height` map (q in 0..width, r in 0..height)
    /// filled with a single terrain type
    pub fn filled(width: u32, height: u32, key: &str, terrain: TerrainType) -> Self {
        let mut types = FxHashMap::default();
        types.insert(key.to_string(), terrain);
        let mut map = Self::new(width, height, Layout::default(), types);
        for q in 0..width as i32 {
            for r in 0..height as i32 {
                map.set_terrain(Hex::new(q, r), key);
            }
        }
        map
    }

    /// Place a cell of a known terrain type. Returns false for unknown keys.
    pub fn set_terrain(&mut self, hex: Hex, key: &str) -> bool {
        let Some(terrain) = self.terrain_types.get(key) else {
            return false;
        };
        self.cells.insert(
            hex,
            TerrainCell {
                kind: key.to_string(),
                movement_cost: terrain.cost,
                defense_bonus: terrain.def_bonus,
            },
        );
        true
    }

    pub fn set_spawn_points(&mut self, faction: Faction, hexes: Vec<Hex>) {
        self.spawn_points.insert(faction, hexes);
    }

    pub fn spawn_points(&self, faction: Faction) -> &[Hex] {
        self.spawn_points.get(&faction).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cell at hex; `None` means off the map, which is distinct from
    /// impassable terrain
    pub fn cell_at(&self, hex: Hex) -> Option<&TerrainCell> {
        self.cells.get(&hex)
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.cells.contains_key(&hex)
    }

    /// Cost to enter `hex`, `IMPASSABLE` when off the map
    pub fn movement_cost(&self, hex: Hex) -> u32 {
        self.cells.get(&hex).map_or(IMPASSABLE, |c| c.movement_cost)
    }

    /// Defense bonus at `hex`, zero when off the map
    pub fn defense_bonus(&self, hex: Hex) -> f64 {
        self.cells.get(&hex).map_or(0.0, |c| c.defense_bonus)
    }

    pub fn terrain_type(&self, key: &str) -> Option<&TerrainType> {
        self.terrain_types.get(key)
    }

    /// Iterate cells (unordered)
    pub fn cells(&self) -> impl Iterator<Item = (Hex, &TerrainCell)> + '_ {
        self.cells.iter().map(|(&hex, cell)| (hex, cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
