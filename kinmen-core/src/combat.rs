//! Combat resolution
//!
//! One forecast per attack: a hit chance from sight and morale, and a damage
//! figure from attack against defense plus terrain, scaled by a random factor.
//! A second independent roll decides whether the strike lands.

use crate::unit::{Stats, Unit, UnitId};
use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

const BASE_HIT_CHANCE: f64 = 0.20;
const SIGHT_WEIGHT: f64 = 0.05;
const MORALE_WEIGHT: f64 = 0.03;
const MIN_HIT_CHANCE: f64 = 0.05;
const MAX_HIT_CHANCE: f64 = 0.95;

/// Damage is scaled by a uniform factor in this range
const DAMAGE_SPREAD: (f64, f64) = (0.85, 1.15);

// ============================================================================
// FORECAST
// ============================================================================

/// Predicted result of one attack
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatForecast {
    pub hit_chance: f64,
    pub expected_damage: i32,
    pub defender_terrain_bonus: f64,
}

/// Chance to hit, clamped to `[0.05, 0.95]`
pub fn hit_chance(attacker: &Stats, defender: &Stats) -> f64 {
    let sight = f64::from(attacker.sight) - f64::from(defender.sight);
    let morale = f64::from(attacker.morale) - f64::from(defender.morale);
    (BASE_HIT_CHANCE + SIGHT_WEIGHT * sight + MORALE_WEIGHT * morale).clamp(MIN_HIT_CHANCE, MAX_HIT_CHANCE)
}

/// Unscaled damage, never below 1
pub fn base_damage(attacker: &Stats, defender: &Stats, terrain_bonus: f64) -> f64 {
    (f64::from(attacker.atk) - (f64::from(defender.def) + terrain_bonus)).max(1.0)
}

/// Forecast an attack, drawing the damage factor from `rng`
pub fn forecast<R: Rng + ?Sized>(attacker: &Stats, defender: &Stats, terrain_bonus: f64, rng: &mut R) -> CombatForecast {
    let factor = rng.gen_range(DAMAGE_SPREAD.0..=DAMAGE_SPREAD.1);
    let damage = (base_damage(attacker, defender, terrain_bonus) * factor).round();
    CombatForecast {
        hit_chance: hit_chance(attacker, defender),
        // 1 * 0.85 rounds to 1, so the floor of 1 survives scaling
        expected_damage: (damage as i32).max(1),
        defender_terrain_bonus: terrain_bonus,
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// What happened when an attack was carried out
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatOutcome {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub forecast: CombatForecast,
    pub hit: bool,
    /// Damage actually dealt (0 on a miss)
    pub damage: i32,
    pub defender_hp: i32,
    pub destroyed: bool,
}

/// Forecast, roll to hit and apply damage to `defender`.
///
/// Only the defender is touched here; spending the attacker's turn and
/// removing a destroyed defender belong to the caller.
pub fn strike<R: Rng + ?Sized>(
    attacker_id: &str,
    attacker: &Stats,
    defender: &mut Unit,
    terrain_bonus: f64,
    rng: &mut R,
) -> CombatOutcome {
    let forecast = forecast(attacker, &defender.stats, terrain_bonus, rng);
    let hit = rng.gen::<f64>() <= forecast.hit_chance;
    let damage = if hit { forecast.expected_damage } else { 0 };
    let destroyed = defender.take_damage(damage);

    CombatOutcome {
        attacker: attacker_id.to_string(),
        defender: defender.id.clone(),
        forecast,
        hit,
        damage,
        defender_hp: defender.stats.hp,
        destroyed,
    }
}
