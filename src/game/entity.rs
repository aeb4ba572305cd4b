//! Tile Entities
//!
//! One record per grid-addressable object. Entities carry only logic
//! state; renderable handles live in a side table owned by the
//! presentation layer (see [`crate::render`]), never inside these types.

use serde::{Deserialize, Serialize};

use crate::core::coord::Coord;

/// Unique entity identifier within one built level.
///
/// Assigned by the level builder from a per-grid monotonic counter;
/// never reused across rounds (the whole grid is discarded at round end).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Kind of a grid tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TileKind {
    /// Walkable surface tile
    Floor = 0,
    /// Static obstruction; players can never enter its cell
    Block = 1,
    /// Movable avatar
    Player = 2,
    /// Target tile; every goal must be covered by a player to win
    Goal = 3,
}

impl TileKind {
    /// Parse a level-description `type` string.
    ///
    /// Returns `None` for unrecognized strings so the builder can fail
    /// with an error naming the offending entry.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "floor" => Some(TileKind::Floor),
            "block" => Some(TileKind::Block),
            "player" => Some(TileKind::Player),
            "goal" => Some(TileKind::Goal),
            _ => None,
        }
    }
}

/// A walkable floor tile.
///
/// `solid` and `visible` are owned by the rule modifier layer:
/// `random_holes` flips them off for a random subset and restores them
/// on deactivation. Movement legality ignores them (blocks alone gate
/// movement); the renderer consumes them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FloorTile {
    /// Entity id
    pub id: EntityId,
    /// Tile coordinate (floors never move)
    pub pos: Coord,
    /// False while this floor is a hole
    pub solid: bool,
    /// False while this floor is hidden
    pub visible: bool,
}

impl FloorTile {
    /// Create a solid, visible floor.
    pub fn new(id: EntityId, pos: Coord) -> Self {
        Self {
            id,
            pos,
            solid: true,
            visible: true,
        }
    }
}

/// A static block tile. Immovable; the movement resolver never mutates it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockTile {
    /// Entity id
    pub id: EntityId,
    /// Tile coordinate
    pub pos: Coord,
}

impl BlockTile {
    /// Create a block.
    pub fn new(id: EntityId, pos: Coord) -> Self {
        Self { id, pos }
    }
}

/// A movable player avatar.
///
/// `pos` is mutated only by the movement resolver; `visible` only by the
/// `invisible_player` modifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerTile {
    /// Entity id
    pub id: EntityId,
    /// Current tile coordinate
    pub pos: Coord,
    /// False while `invisible_player` is active
    pub visible: bool,
}

impl PlayerTile {
    /// Create a visible player.
    pub fn new(id: EntityId, pos: Coord) -> Self {
        Self {
            id,
            pos,
            visible: true,
        }
    }
}

/// A goal tile.
///
/// `floor_skin` is the presentational reclassification flipped by
/// `switch_goal_to_floor`: the goal renders as ordinary floor but stays a
/// goal for win detection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoalTile {
    /// Entity id
    pub id: EntityId,
    /// Tile coordinate (goals never move)
    pub pos: Coord,
    /// True while the goal is disguised as floor
    pub floor_skin: bool,
}

impl GoalTile {
    /// Create an undisguised goal.
    pub fn new(id: EntityId, pos: Coord) -> Self {
        Self {
            id,
            pos,
            floor_skin: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_kind_from_wire() {
        assert_eq!(TileKind::from_wire("floor"), Some(TileKind::Floor));
        assert_eq!(TileKind::from_wire("block"), Some(TileKind::Block));
        assert_eq!(TileKind::from_wire("player"), Some(TileKind::Player));
        assert_eq!(TileKind::from_wire("goal"), Some(TileKind::Goal));
        assert_eq!(TileKind::from_wire("lava"), None);
        assert_eq!(TileKind::from_wire(""), None);
        // Wire names are case-sensitive, matching the serde rename.
        assert_eq!(TileKind::from_wire("Floor"), None);
    }

    #[test]
    fn test_new_tiles_start_pristine() {
        let id = EntityId(1);
        let pos = Coord::new(2, 3);

        let floor = FloorTile::new(id, pos);
        assert!(floor.solid && floor.visible);

        let player = PlayerTile::new(id, pos);
        assert!(player.visible);

        let goal = GoalTile::new(id, pos);
        assert!(!goal.floor_skin);
    }
}
