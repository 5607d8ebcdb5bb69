//! Structured log events emitted by the engine for UI and log collaborators

use serde::{Deserialize, Serialize};

use crate::combat::CombatOutcome;
use crate::hex::Hex;
use crate::unit::{Faction, StatKind, UnitId};

/// One entry in the battle log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// Control passed to a faction
    TurnStarted { turn: u32, faction: Faction },
    /// A unit changed hexes
    UnitMoved { unit: UnitId, from: Hex, to: Hex, cost: u32 },
    /// An attack was resolved, hit or miss
    Attack(CombatOutcome),
    /// A unit reached 0 hp and left the roster
    UnitDestroyed { unit: UnitId },
    /// A unit gave up its remaining actions
    UnitWaited { unit: UnitId },
    /// The AI deliberately skipped its best option
    AiHesitated { unit: UnitId },
    /// Scenario editor changed a stat
    StatEdited { unit: UnitId, stat: StatKind, value: i32 },
    /// Scenario editor deleted a unit
    UnitRemoved { unit: UnitId },
    /// A request failed validation
    Rejected { reason: String },
}
