//! Hex grid geometry with axial coordinates

use serde::{Deserialize, Serialize};

/// Direction vectors in axial coordinates (dq, dr)
/// Index: 0=E, 1=NE, 2=NW, 3=W, 4=SW, 5=SE
pub const DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),   // E
    (1, -1),  // NE
    (0, -1),  // NW
    (-1, 0),  // W
    (-1, 1),  // SW
    (0, 1),   // SE
];

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Largest coordinate magnitude accepted from map data. Keeps `s()` and
/// neighbor stepping inside `i32` for every hex a map can hold.
pub const MAX_COORD: i32 = 1 << 20;

/// Axial hex coordinates. The cube component `s` is derived, so
/// `q + r + s == 0` holds by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const ORIGIN: Hex = Hex::new(0, 0);

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Third cube component. Exact for hexes within `MAX_COORD`.
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Whether both axial components lie within `MAX_COORD`
    pub const fn in_bounds(&self) -> bool {
        self.q.unsigned_abs() <= MAX_COORD as u32 && self.r.unsigned_abs() <= MAX_COORD as u32
    }

    /// Distance between two hexes. Computed in `i64`, so any pair of
    /// coordinates is safe; the result saturates at `u32::MAX`.
    pub fn distance_to(&self, other: Hex) -> u32 {
        let (aq, ar) = (i64::from(self.q), i64::from(self.r));
        let (bq, br) = (i64::from(other.q), i64::from(other.r));
        let dq = (aq - bq).abs();
        let dr = (ar - br).abs();
        let ds = ((-aq - ar) - (-bq - br)).abs();
        u32::try_from((dq + dr + ds) / 2).unwrap_or(u32::MAX)
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: usize) -> Hex {
        let (dq, dr) = DIRECTIONS[direction % 6];
        Hex::new(self.q + dq, self.r + dr)
    }

    /// All six neighbors, in `DIRECTIONS` order
    pub fn neighbors(&self) -> [Hex; 6] {
        std::array::from_fn(|dir| self.neighbor(dir))
    }

    /// Round fractional axial coordinates to the nearest hex.
    ///
    /// The component with the largest rounding error is recomputed from the
    /// other two: q first, then r, otherwise s. Halves round toward
    /// positive infinity, so `-0.5` becomes `0`.
    pub fn round(frac_q: f64, frac_r: f64) -> Hex {
        let frac_s = -frac_q - frac_r;
        let q = round_half_up(frac_q);
        let r = round_half_up(frac_r);
        let s = round_half_up(frac_s);

        let q_diff = (q - frac_q).abs();
        let r_diff = (r - frac_r).abs();
        let s_diff = (s - frac_s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            Hex::new((-r - s) as i32, r as i32)
        } else if r_diff > s_diff {
            Hex::new(q as i32, (-q - s) as i32)
        } else {
            Hex::new(q as i32, r as i32)
        }
    }
}

fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.q, self.r)
    }
}

/// Pixel-space point
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Flat-topped hex layout driven by a single size parameter.
///
/// Hex (0,0) is centred at `(hex_size, sqrt(3) * hex_size / 2)` so the map's
/// top-left corner sits at the pixel origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub hex_size: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self { hex_size: 40.0 }
    }
}

impl Layout {
    pub fn new(hex_size: f64) -> Self {
        Self { hex_size }
    }

    fn origin(&self) -> Point {
        Point {
            x: self.hex_size,
            y: SQRT_3 * self.hex_size / 2.0,
        }
    }

    /// Centre of a hex in pixels
    pub fn hex_to_pixel(&self, hex: Hex) -> Point {
        let origin = self.origin();
        let q = hex.q as f64;
        let r = hex.r as f64;
        Point {
            x: self.hex_size * (1.5 * q) + origin.x,
            y: self.hex_size * (SQRT_3 / 2.0 * q + SQRT_3 * r) + origin.y,
        }
    }

    /// Hex containing a pixel
    pub fn pixel_to_hex(&self, point: Point) -> Hex {
        let origin = self.origin();
        let x = point.x - origin.x;
        let y = point.y - origin.y;
        let q = (2.0 / 3.0 * x) / self.hex_size;
        let r = (-1.0 / 3.0 * x + SQRT_3 / 3.0 * y) / self.hex_size;
        Hex::round(q, r)
    }

    /// Corner points of a hex, for outline drawing
    pub fn corners(&self, hex: Hex) -> [Point; 6] {
        let center = self.hex_to_pixel(hex);
        std::array::from_fn(|i| {
            let angle = (60.0 * i as f64 - 30.0).to_radians();
            Point {
                x: center.x + self.hex_size * angle.cos(),
                y: center.y + self.hex_size * angle.sin(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_distance() {
        assert_eq!(Hex::ORIGIN.distance_to(Hex::ORIGIN), 0);
        assert_eq!(Hex::new(1, 0).distance_to(Hex::ORIGIN), 1);
        assert_eq!(Hex::new(2, 2).distance_to(Hex::ORIGIN), 4);
        assert_eq!(Hex::new(3, -1).distance_to(Hex::new(-1, 2)), 4);
    }

    #[test]
    fn test_neighbors_are_adjacent_and_ordered() {
        let center = Hex::new(2, -3);
        let ring = center.neighbors();
        assert_eq!(ring[0], Hex::new(3, -3));
        assert_eq!(ring[5], Hex::new(2, -2));
        for n in ring {
            assert_eq!(center.distance_to(n), 1);
        }
    }

    #[test]
    fn test_round_tie_break() {
        // q carries the biggest error, so it is rebuilt from r and s
        assert_eq!(Hex::round(0.45, 0.3), Hex::new(1, 0));
        // r carries the biggest error
        assert_eq!(Hex::round(0.2, 0.45), Hex::new(0, 1));
        // s carries the biggest error, q and r are kept
        assert_eq!(Hex::round(0.1, 0.4), Hex::new(0, 0));
        assert_eq!(Hex::round(1.0, -1.0), Hex::new(1, -1));
    }

    #[test]
    fn test_pixel_round_trip() {
        let layout = Layout::new(40.0);
        for q in -5..5 {
            for r in -5..5 {
                let hex = Hex::new(q, r);
                assert_eq!(layout.pixel_to_hex(layout.hex_to_pixel(hex)), hex);
            }
        }
        let p = layout.hex_to_pixel(Hex::ORIGIN);
        assert!((p.x - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_corners_lie_on_circle() {
        let layout = Layout::default();
        let center = layout.hex_to_pixel(Hex::new(1, 1));
        for c in layout.corners(Hex::new(1, 1)) {
            let d = ((c.x - center.x).powi(2) + (c.y - center.y).powi(2)).sqrt();
            assert!((d - 40.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_round_halves_toward_positive() {
        assert_eq!(Hex::round(-0.5, 0.5), Hex::new(0, 0));
        assert_eq!(Hex::round(0.5, -0.5), Hex::new(1, -1));
        assert_eq!(Hex::round(-1.5, 0.0), Hex::new(-1, 0));
    }

    #[test]
    fn test_distance_at_extreme_coordinates() {
        let far = Hex::new(MAX_COORD, -MAX_COORD);
        assert_eq!(far.distance_to(Hex::new(-MAX_COORD, MAX_COORD)), 2 * MAX_COORD as u32);
        assert_eq!(Hex::new(i32::MAX, 0).distance_to(Hex::new(i32::MIN, 0)), u32::MAX);
        assert_eq!(Hex::new(i32::MIN, i32::MIN).distance_to(Hex::ORIGIN), u32::MAX);
        assert!(far.in_bounds());
        assert!(!Hex::new(MAX_COORD + 1, 0).in_bounds());
        assert!(!Hex::new(0, i32::MIN).in_bounds());
    }

    fn hex_strategy() -> impl Strategy<Value = Hex> {
        (-50i32..50, -50i32..50).prop_map(|(q, r)| Hex::new(q, r))
    }

    proptest! {
        #[test]
        fn prop_distance_is_a_metric(a in hex_strategy(), b in hex_strategy(), c in hex_strategy()) {
            prop_assert_eq!(a.distance_to(a), 0);
            prop_assert_eq!(a.distance_to(b), b.distance_to(a));
            prop_assert!(a.distance_to(c) <= a.distance_to(b) + b.distance_to(c));
        }

        #[test]
        fn prop_round_is_idempotent_on_integers(h in hex_strategy()) {
            prop_assert_eq!(Hex::round(h.q as f64, h.r as f64), h);
        }

        #[test]
        fn prop_round_lands_near_input(q in -50.0f64..50.0, r in -50.0f64..50.0) {
            let h = Hex::round(q, r);
            prop_assert_eq!(h.q + h.r + h.s(), 0);
            // Nearest hex is never further than one step from the fractional point
            prop_assert!((h.q as f64 - q).abs() <= 1.0);
            prop_assert!((h.r as f64 - r).abs() <= 1.0);
        }
    }
}
