//! Unit identity, stats and per-turn status

use crate::hex::Hex;
use serde::{Deserialize, Serialize};

/// Unit identifier, unique within a roster
pub type UnitId = String;

/// Side of the conflict
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Blue,
    Red,
}

impl Faction {
    pub const ALL: [Faction; 2] = [Faction::Blue, Faction::Red];

    pub fn opponent(self) -> Self {
        match self {
            Faction::Blue => Faction::Red,
            Faction::Red => Faction::Blue,
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Faction::Blue => write!(f, "blue"),
            Faction::Red => write!(f, "red"),
        }
    }
}

impl std::str::FromStr for Faction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blue" => Ok(Faction::Blue),
            "red" => Ok(Faction::Red),
            other => Err(format!("unknown faction: {other}")),
        }
    }
}

/// Combat and movement stats
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub atk: i32,
    pub def: i32,
    pub mov: i32,
    pub sight: i32,
    pub hp: i32,
    pub max_hp: i32,
    #[serde(default)]
    pub logistics: i32,
    #[serde(default)]
    pub morale: i32,
}

impl Stats {
    /// Movement budget; a negative `mov` is treated as zero
    pub fn movement_points(&self) -> u32 {
        self.mov.max(0) as u32
    }
}

/// Per-turn action flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub moved: bool,
    pub acted: bool,
}

impl Status {
    /// Both flags set: nothing left to do this turn
    pub const SPENT: Status = Status { moved: true, acted: true };
}

/// Editable stat names
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatKind {
    Atk,
    Def,
    Mov,
    Sight,
    Hp,
    MaxHp,
    Logistics,
    Morale,
}

impl std::str::FromStr for StatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "atk" => StatKind::Atk,
            "def" => StatKind::Def,
            "mov" => StatKind::Mov,
            "sight" => StatKind::Sight,
            "hp" => StatKind::Hp,
            "maxHp" | "max_hp" => StatKind::MaxHp,
            "logistics" => StatKind::Logistics,
            "morale" => StatKind::Morale,
            other => return Err(format!("unknown stat: {other}")),
        })
    }
}

/// A unit on the battlefield
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub faction: Faction,
    /// Echelon label (squad, platoon, ...); cosmetic
    #[serde(default, alias = "echelon")]
    pub level: String,
    #[serde(flatten)]
    pub position: Hex,
    pub stats: Stats,
    #[serde(default)]
    pub status: Status,
}

impl Unit {
    pub fn new(id: &str, name: &str, faction: Faction, position: Hex, stats: Stats) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            faction,
            level: String::new(),
            position,
            stats,
            status: Status::default(),
        }
    }

    pub fn with_level(mut self, level: &str) -> Self {
        self.level = level.to_string();
        self
    }

    pub fn is_enemy_of(&self, other: &Unit) -> bool {
        self.faction != other.faction
    }

    pub fn is_destroyed(&self) -> bool {
        self.stats.hp <= 0
    }

    /// Set hp, clamped into `[0, max_hp]`
    pub fn set_hp(&mut self, hp: i32) {
        self.stats.hp = hp.clamp(0, self.stats.max_hp.max(0));
    }

    /// Subtract damage; returns true when the unit is destroyed
    pub fn take_damage(&mut self, damage: i32) -> bool {
        self.set_hp(self.stats.hp.saturating_sub(damage.max(0)));
        self.is_destroyed()
    }

    /// Apply an editor change to one stat, keeping hp in range
    pub fn set_stat(&mut self, stat: StatKind, value: i32) {
        match stat {
            StatKind::Atk => self.stats.atk = value,
            StatKind::Def => self.stats.def = value,
            StatKind::Mov => self.stats.mov = value,
            StatKind::Sight => self.stats.sight = value,
            StatKind::Logistics => self.stats.logistics = value,
            StatKind::Morale => self.stats.morale = value,
            StatKind::Hp => self.set_hp(value),
            StatKind::MaxHp => {
                self.stats.max_hp = value.max(0);
                self.set_hp(self.stats.hp);
            }
        }
    }

    pub fn reset_status(&mut self) {
        self.status = Status::default();
    }

    /// Give up the remaining actions this turn
    pub fn spend(&mut self) {
        self.status = Status::SPENT;
    }
}

#[cfg(test)]
pub(crate) fn test_stats(atk: i32, def: i32, mov: i32, sight: i32, hp: i32) -> Stats {
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
