//! KINMEN Core - Hex wargame simulation engine
//!
//! This crate provides the rules engine for the Kinmen hex wargame:
//! - Hex geometry (axial coordinates, distance, pixel layout)
//! - Terrain map with movement costs and defense bonuses
//! - Reachability search and threat ranges
//! - Combat forecast and resolution
//! - Turn order and per-unit action status
//! - Opposing-faction AI
//! - Scenario loading and save snapshots

pub mod hex;
pub mod map;
pub mod unit;
pub mod reach;
pub mod combat;
pub mod turn;
pub mod state;
pub mod events;
pub mod error;
pub mod game;
pub mod ai;
pub mod scenario;

// Re-exports for convenient access
pub use hex::{Hex, Layout, Point, DIRECTIONS};
pub use map::{Map, TerrainCell, TerrainType, IMPASSABLE};
pub use unit::{Faction, StatKind, Stats, Status, Unit, UnitId};
pub use reach::{adjacent_enemies, attackable, reachable, ReachableSet};
pub use combat::{CombatForecast, CombatOutcome};
pub use turn::{Phase, TurnChange, TurnController};
pub use state::{GameState, Snapshot};
pub use events::GameEvent;
pub use error::{ActionError, ActionResult, LoadError};
pub use game::{Game, GameConfig};
pub use ai::{AiConfig, AiController, AiReport};
pub use scenario::{MapDescriptor, Scenario, UnitDescriptor};
