//! Grid Coordinates and Move Directions
//!
//! Integer `(x, z)` pairs on an unbounded grid, and the four directional
//! move commands with their unit deltas.

use serde::{Deserialize, Serialize};

/// A tile coordinate on the grid.
///
/// The grid is conceptually infinite; negative coordinates are legal.
/// `z` grows "down" the board (away from the camera), matching the level
/// description format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Horizontal axis
    pub x: i32,
    /// Depth axis
    pub z: i32,
}

impl Coord {
    /// Create a coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Coordinate shifted by `(dx, dz)`.
    #[inline]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// Coordinate one tile away in `direction`.
    #[inline]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dz) = direction.delta();
        self.offset(dx, dz)
    }
}

/// A directional move command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward negative x
    Left,
    /// Toward positive x
    Right,
    /// Toward negative z
    Up,
    /// Toward positive z
    Down,
}

impl Direction {
    /// All four directions, in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit delta `(dx, dz)` for this direction.
    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    /// Pairwise-swapped direction, used while `inverted_keyboard` is active.
    #[inline]
    pub const fn inverted(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Projection of a coordinate onto this direction's travel axis:
    /// `x` for horizontal moves, `z` for vertical ones.
    #[inline]
    pub const fn axis(self, coord: Coord) -> i32 {
        match self {
            Direction::Left | Direction::Right => coord.x,
            Direction::Up | Direction::Down => coord.z,
        }
    }

    /// Sign of travel along the axis: -1 toward negative, +1 toward positive.
    #[inline]
    pub const fn sign(self) -> i32 {
        match self {
            Direction::Left | Direction::Up => -1,
            Direction::Right | Direction::Down => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_matches_delta() {
        let origin = Coord::new(3, -2);
        for dir in Direction::ALL {
            let (dx, dz) = dir.delta();
            assert_eq!(origin.step(dir), origin.offset(dx, dz));
        }
    }

    #[test]
    fn test_inversion_is_pairwise() {
        assert_eq!(Direction::Left.inverted(), Direction::Right);
        assert_eq!(Direction::Right.inverted(), Direction::Left);
        assert_eq!(Direction::Up.inverted(), Direction::Down);
        assert_eq!(Direction::Down.inverted(), Direction::Up);

        // Involution: inverting twice restores the original.
        for dir in Direction::ALL {
            assert_eq!(dir.inverted().inverted(), dir);
        }
    }

    #[test]
    fn test_delta_is_unit_length() {
        for dir in Direction::ALL {
            let (dx, dz) = dir.delta();
            assert_eq!(dx.abs() + dz.abs(), 1);
        }
    }

    #[test]
    fn test_axis_and_sign_agree_with_delta() {
        // Stepping must change the axis projection by exactly sign().
        let origin = Coord::new(0, 0);
        for dir in Direction::ALL {
            let stepped = origin.step(dir);
            assert_eq!(dir.axis(stepped) - dir.axis(origin), dir.sign());
        }
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&Direction::Left).unwrap();
        assert_eq!(json, "\"left\"");
        let parsed: Direction = serde_json::from_str("\"down\"").unwrap();
        assert_eq!(parsed, Direction::Down);
    }

    #[test]
    fn test_negative_coordinates_are_legal() {
        let c = Coord::new(0, 0).step(Direction::Left).step(Direction::Up);
        assert_eq!(c, Coord::new(-1, -1));
    }
}
