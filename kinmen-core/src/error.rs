//! Error types

use crate::hex::Hex;
use crate::unit::{Faction, UnitId};

/// An action request that failed validation. Nothing was changed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("no unit with id {0}")]
    UnknownUnit(UnitId),

    #[error("{unit} belongs to {faction}, but it is {active}'s turn")]
    NotYourTurn {
        unit: UnitId,
        faction: Faction,
        active: Faction,
    },

    #[error("{0} has already moved this turn")]
    AlreadyMoved(UnitId),

    #[error("{0} has already acted this turn")]
    AlreadyActed(UnitId),

    #[error("{unit} cannot reach {target}")]
    Unreachable { unit: UnitId, target: Hex },

    #[error("{target} is out of range of {unit}")]
    OutOfRange { unit: UnitId, target: UnitId },

    #[error("{unit} cannot attack friendly unit {target}")]
    FriendlyTarget { unit: UnitId, target: UnitId },
}

/// Map or roster data that could not be turned into a game
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("map has no hexes")]
    EmptyMap,

    #[error("hex {0} lies beyond the coordinate limit")]
    CoordinateOutOfRange(Hex),

    #[error("hex {hex} uses unknown terrain type {terrain:?}")]
    UnknownTerrain { hex: Hex, terrain: String },

    #[error("terrain type {0:?} has zero movement cost")]
    ZeroCost(String),

    #[error("terrain type {0:?} has a negative defense bonus")]
    NegativeBonus(String),

    #[error("roster is empty")]
    EmptyRoster,

    #[error("duplicate unit id {0}")]
    DuplicateUnit(UnitId),

    #[error("units {first} and {second} both stand on {hex}")]
    StackedUnits { first: UnitId, second: UnitId, hex: Hex },

    #[error("unit {unit} stands off the map at {hex}")]
    OffMap { unit: UnitId, hex: Hex },

    #[error("unit {unit} has hp {hp} outside 1..={max_hp}")]
    HpOutOfRange { unit: UnitId, hp: i32, max_hp: i32 },

    #[error("snapshot turn must be at least 1")]
    InvalidTurn,
}

pub type ActionResult<T> = Result<T, ActionError>;
