//! Faction turn order
//!
//! Blue moves first. Each end-turn hands control to the other faction and
//! refreshes that faction's units; the turn counter advances when control
//! wraps from red back to blue.

use crate::unit::{Faction, Unit};
use serde::{Deserialize, Serialize};

/// Which side is acting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    BlueTurn,
    RedTurn,
}

impl Phase {
    pub fn faction(self) -> Faction {
        match self {
            Phase::BlueTurn => Faction::Blue,
            Phase::RedTurn => Faction::Red,
        }
    }

    pub fn of(faction: Faction) -> Self {
        match faction {
            Faction::Blue => Phase::BlueTurn,
            Faction::Red => Phase::RedTurn,
        }
    }
}

/// Result of an end-turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnChange {
    pub ended: Faction,
    pub active: Faction,
    pub turn: u32,
    /// Units whose status was refreshed
    pub refreshed: usize,
}

/// Turn counter and active faction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnController {
    turn: u32,
    phase: Phase,
}

impl Default for TurnController {
    fn default() -> Self {
        Self {
            turn: 1,
            phase: Phase::BlueTurn,
        }
    }
}

impl TurnController {
    /// Resume at a given point, e.g. from a snapshot
    pub fn at(turn: u32, active: Faction) -> Self {
        Self {
            turn: turn.max(1),
            phase: Phase::of(active),
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active(&self) -> Faction {
        self.phase.faction()
    }

    /// End the active faction's turn and hand over to the other side,
    /// clearing `moved`/`acted` on every unit of the incoming faction.
    pub fn end_turn(&mut self, units: &mut [Unit]) -> TurnChange {
        let ended = self.active();
        self.phase = match self.phase {
            Phase::BlueTurn => Phase::RedTurn,
            Phase::RedTurn => {
                self.turn += 1;
                Phase::BlueTurn
            }
        };

        let active = self.active();
        let mut refreshed = 0;
        for unit in units.iter_mut().filter(|u| u.faction == active) {
            unit.reset_status();
            refreshed += 1;
        }

        TurnChange {
            ended,
            active,
            turn: self.turn,
            refreshed,
        }
    }
}
