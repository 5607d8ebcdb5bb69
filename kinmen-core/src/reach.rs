//! Movement reachability and attack threat
//!
//! Both searches are pure: they read the map and a roster and return fresh
//! sets, leaving all state untouched.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::hex::Hex;
use crate::map::Map;
use crate::unit::{Faction, Unit, UnitId};
use rustc_hash::FxHashMap;

/// Who stands where
#[derive(Clone, Debug, Default)]
pub struct Occupancy {
    by_hex: FxHashMap<Hex, (Faction, usize)>,
}

impl Occupancy {
    /// Index a roster; values are roster indices
    pub fn new(units: &[Unit]) -> Self {
        let by_hex = units
            .iter()
            .enumerate()
            .map(|(idx, u)| (u.position, (u.faction, idx)))
            .collect();
        Self { by_hex }
    }

    pub fn faction_at(&self, hex: Hex) -> Option<Faction> {
        self.by_hex.get(&hex).map(|&(f, _)| f)
    }

    pub fn index_at(&self, hex: Hex) -> Option<usize> {
        self.by_hex.get(&hex).map(|&(_, i)| i)
    }

    pub fn is_occupied(&self, hex: Hex) -> bool {
        self.by_hex.contains_key(&hex)
    }
}

/// Landing hexes with their cumulative movement cost.
///
/// Iteration follows settle order: nondecreasing cost, ties in the order the
/// hexes were first pushed onto the frontier. The origin always comes first.
#[derive(Clone, Debug, Default)]
pub struct ReachableSet {
    order: Vec<Hex>,
    cost: FxHashMap<Hex, u32>,
}

impl ReachableSet {
    fn insert(&mut self, hex: Hex, cost: u32) {
        if self.cost.insert(hex, cost).is_none() {
            self.order.push(hex);
        }
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.cost.contains_key(&hex)
    }

    pub fn cost(&self, hex: Hex) -> Option<u32> {
        self.cost.get(&hex).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Hex, u32)> + '_ {
        self.order.iter().map(|h| (*h, self.cost[h]))
    }

    pub fn hexes(&self) -> &[Hex] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Every hex `unit` may end its move on, within its movement budget.
///
/// Uniform-cost search from the unit's hex. Enemy-held hexes block
/// traversal; friendly-held hexes may be crossed but not landed on.
pub fn reachable(map: &Map, units: &[Unit], unit: &Unit) -> ReachableSet {
    let occupancy = Occupancy::new(units);
    reachable_with(map, &occupancy, unit)
}

pub(crate) fn reachable_with(map: &Map, occupancy: &Occupancy, unit: &Unit) -> ReachableSet {
    let budget = unit.stats.movement_points();
    let start = unit.position;

    let mut result = ReachableSet::default();
    let mut best: FxHashMap<Hex, u32> = FxHashMap::default();
    // (cost, push sequence, hex); the sequence keeps equal-cost pops FIFO
    let mut frontier = BinaryHeap::new();
    let mut seq = 0u64;

    best.insert(start, 0);
    frontier.push(Reverse((0u32, seq, start)));

    while let Some(Reverse((cost, _, current))) = frontier.pop() {
        if best.get(&current).is_some_and(|&c| c < cost) {
            continue; // stale entry
        }

        if current == start {
            result.insert(current, 0);
        } else if !occupancy.is_occupied(current) {
            result.insert(current, cost);
        }

        for next in current.neighbors() {
            let Some(cell) = map.cell_at(next) else {
                continue;
            };
            let new_cost = cost.saturating_add(cell.movement_cost);
            if new_cost > budget {
                continue;
            }
            if occupancy.faction_at(next).is_some_and(|f| f != unit.faction) {
                continue;
            }
            if best.get(&next).is_some_and(|&c| c <= new_cost) {
                continue;
            }
            best.insert(next, new_cost);
            seq += 1;
            frontier.push(Reverse((new_cost, seq, next)));
        }
    }

    result
}

/// Enemy units `unit` could strike this action: anything adjacent to its own
/// hex or to any hex in its landing set. Keyed by the enemy's hex.
pub fn attackable(map: &Map, units: &[Unit], unit: &Unit) -> FxHashMap<Hex, UnitId> {
    let occupancy = Occupancy::new(units);
    let landing = reachable_with(map, &occupancy, unit);

    let mut targets = FxHashMap::default();
    let stands = std::iter::once(unit.position).chain(landing.hexes().iter().copied());
    for stand in stands {
        for neighbor in stand.neighbors() {
            if let Some(idx) = occupancy.index_at(neighbor) {
                let target = &units[idx];
                if target.is_enemy_of(unit) {
                    targets.entry(neighbor).or_insert_with(|| target.id.clone());
                }
            }
        }
    }
    targets
}

/// Enemy units adjacent to `hex`, in neighbor order
pub fn adjacent_enemies<'a>(units: &'a [Unit], faction: Faction, hex: Hex) -> Vec<&'a Unit> {
    let occupancy = Occupancy::new(units);
    hex.neighbors()
        .into_iter()
        .filter_map(|n| occupancy.index_at(n))
        .map(|idx| &units[idx])
        .filter(|u| u.faction != faction)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TerrainType;
    use crate::unit::test_stats;
    use proptest::prelude::*;

    /// Large plain map centred on the origin
    fn plain_map(radius: i32) -> Map {
        let mut map = Map::filled(0, 0, "plain", TerrainType::new("Plain", 1, 0.0));
        for q in -radius..=radius {
            for r in -radius..=radius {
                map.set_terrain(Hex::new(q, r), "plain");
            }
        }
        map
    }

    fn unit_at(id: &str, faction: Faction, hex: Hex, mov: i32) -> Unit {
        Unit::new(id, id, faction, hex, test_stats(5, 3, mov, 3, 10))
    }

    fn disk_size(m: u32) -> usize {
        (1 + 3 * m * (m + 1)) as usize
    }

    #[test]
    fn test_zero_movement_is_origin_only() {
        let map = plain_map(5);
        let units = vec![unit_at("a", Faction::Blue, Hex::ORIGIN, 0)];
        let set = reachable(&map, &units, &units[0]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.cost(Hex::ORIGIN), Some(0));
    }

    #[test]
    fn test_uniform_disk() {
        let map = plain_map(8);
        for m in 0..=4 {
            let units = vec![unit_at("a", Faction::Blue, Hex::ORIGIN, m)];
            let set = reachable(&map, &units, &units[0]);
            assert_eq!(set.len(), disk_size(m as u32), "mov {}", m);
            for (hex, cost) in set.iter() {
                assert_eq!(cost, hex.distance_to(Hex::ORIGIN));
            }
        }
    }

    #[test]
    fn test_origin_listed_first_and_costs_nondecreasing() {
        let map = plain_map(6);
        let units = vec![unit_at("a", Faction::Blue, Hex::ORIGIN, 3)];
        let set = reachable(&map, &units, &units[0]);
        assert_eq!(set.hexes()[0], Hex::ORIGIN);
        let costs: Vec<u32> = set.iter().map(|(_, c)| c).collect();
        assert!(costs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_terrain_cost_budget_is_inclusive() {
        let mut types = FxHashMap::default();
        types.insert("plain".to_string(), TerrainType::new("Plain", 1, 0.0));
        types.insert("hill".to_string(), TerrainType::new("Hill", 2, 1.0));
        types.insert("water".to_string(), TerrainType::new("Water", 99, 0.0));
        let mut map = Map::new(4, 1, Default::default(), types);
        map.set_terrain(Hex::new(0, 0), "plain");
        map.set_terrain(Hex::new(1, 0), "hill");
        map.set_terrain(Hex::new(2, 0), "plain");
        map.set_terrain(Hex::new(3, 0), "water");

        let units = vec![unit_at("a", Faction::Blue, Hex::ORIGIN, 3)];
        let set = reachable(&map, &units, &units[0]);
        assert_eq!(set.cost(Hex::new(1, 0)), Some(2));
        assert_eq!(set.cost(Hex::new(2, 0)), Some(3));
        assert!(!set.contains(Hex::new(3, 0)));
    }

    #[test]
    fn test_cheaper_detour_wins() {
        // Crossing the hill costs 3+1, the plain detour costs 1+1
        let mut types = FxHashMap::default();
        types.insert("plain".to_string(), TerrainType::new("Plain", 1, 0.0));
        types.insert("hill".to_string(), TerrainType::new("Hill", 3, 1.0));
        let mut map = Map::new(0, 0, Default::default(), types);
        for hex in [Hex::new(0, 0), Hex::new(1, -1), Hex::new(2, -1)] {
            map.set_terrain(hex, "plain");
        }
        map.set_terrain(Hex::new(1, 0), "hill");
        let units = vec![unit_at("a", Faction::Blue, Hex::ORIGIN, 4)];
        let set = reachable(&map, &units, &units[0]);
        assert_eq!(set.cost(Hex::new(2, -1)), Some(2));
        assert_eq!(set.cost(Hex::new(1, 0)), Some(3));
    }

    #[test]
    fn test_friendly_passable_but_not_landable() {
        let mut map = Map::filled(0, 0, "plain", TerrainType::new("Plain", 1, 0.0));
        for q in 0..4 {
            map.set_terrain(Hex::new(q, 0), "plain");
        }
        let units = vec![
            unit_at("a", Faction::Blue, Hex::new(0, 0), 2),
            unit_at("b", Faction::Blue, Hex::new(1, 0), 2),
        ];
        let set = reachable(&map, &units, &units[0]);
        assert!(!set.contains(Hex::new(1, 0)));
        assert_eq!(set.cost(Hex::new(2, 0)), Some(2));
    }

    #[test]
    fn test_enemy_blocks_traversal() {
        let mut map = Map::filled(0, 0, "plain", TerrainType::new("Plain", 1, 0.0));
        for q in 0..4 {
            map.set_terrain(Hex::new(q, 0), "plain");
        }
        let units = vec![
            unit_at("a", Faction::Blue, Hex::new(0, 0), 3),
            unit_at("x", Faction::Red, Hex::new(1, 0), 3),
        ];
        let set = reachable(&map, &units, &units[0]);
        assert_eq!(set.len(), 1);
        assert!(!set.contains(Hex::new(2, 0)));
    }

    #[test]
    fn test_attackable_through_movement() {
        let map = plain_map(6);
        let units = vec![
            unit_at("a", Faction::Blue, Hex::ORIGIN, 2),
            unit_at("near", Faction::Red, Hex::new(1, 0), 2),
            unit_at("reach", Faction::Red, Hex::new(-3, 0), 2),
            unit_at("far", Faction::Red, Hex::new(-5, 0), 2),
            unit_at("friend", Faction::Blue, Hex::new(0, 1), 2),
        ];
        let targets = attackable(&map, &units, &units[0]);
        assert_eq!(targets.len(), 2);
        assert_eq!(targets.get(&Hex::new(1, 0)).map(String::as_str), Some("near"));
        assert_eq!(targets.get(&Hex::new(-3, 0)).map(String::as_str), Some("reach"));
    }

    #[test]
    fn test_adjacent_enemies() {
        let units = vec![
            unit_at("a", Faction::Blue, Hex::ORIGIN, 2),
            unit_at("b", Faction::Red, Hex::new(0, 1), 2),
            unit_at("c", Faction::Blue, Hex::new(1, 0), 2),
            unit_at("d", Faction::Red, Hex::new(2, 0), 2),
        ];
        let found: Vec<&str> = adjacent_enemies(&units, Faction::Blue, Hex::ORIGIN)
            .iter()
            .map(|u| u.id.as_str())
            .collect();
        assert_eq!(found, vec!["b"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Adding one enemy blocker never grows the landing set
        #[test]
        fn prop_blocker_only_shrinks(mov in 0i32..5, bq in -4i32..=4, br in -4i32..=4) {
            let map = plain_map(6);
            let blocker = Hex::new(bq, br);
            prop_assume!(blocker != Hex::ORIGIN);

            let alone = vec![unit_at("a", Faction::Blue, Hex::ORIGIN, mov)];
            let before = reachable(&map, &alone, &alone[0]);

            let mut with_enemy = alone.clone();
            with_enemy.push(unit_at("x", Faction::Red, blocker, 0));
            let after = reachable(&map, &with_enemy, &with_enemy[0]);

            prop_assert!(after.len() <= before.len());
            prop_assert!(!after.contains(blocker));
            for (hex, cost) in after.iter() {
                prop_assert!(before.contains(hex));
                prop_assert!(cost >= before.cost(hex).unwrap_or(0));
            }
        }

        /// Landing set equals the brute-force disk minus occupied hexes
        #[test]
        fn prop_disk_minus_friends(mov in 0i32..5, fq in -3i32..=3, fr in -3i32..=3) {
            let map = plain_map(8);
            let friend = Hex::new(fq, fr);
            prop_assume!(friend != Hex::ORIGIN);

            let units = vec![
                unit_at("a", Faction::Blue, Hex::ORIGIN, mov),
                unit_at("b", Faction::Blue, friend, 0),
            ];
            let set = reachable(&map, &units, &units[0]);

            let mut expected = 0;
            for q in -8..=8 {
                for r in -8..=8 {
                    let h = Hex::new(q, r);
                    if h.distance_to(Hex::ORIGIN) <= mov as u32 && h != friend {
                        expected += 1;
                    }
                }
            }
            prop_assert_eq!(set.len(), expected);
        }
    }
}
