//! Grid Model
//!
//! Four disjoint registries of tile entities, indexed by kind. Created
//! empty at round start, populated by the level builder, fully discarded
//! at round end; no cross-round entity reuse.
//!
//! Registries are plain vectors in build order, which is deterministic,
//! so iteration order (and therefore the state hash) is identical on both
//! mirrored clients.

use serde::{Deserialize, Serialize};

use crate::core::coord::Coord;
use crate::core::hash::{GridHash, StateHasher};
use crate::game::entity::{BlockTile, EntityId, FloorTile, GoalTile, PlayerTile};

/// The complete logic state of one built level.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GridModel {
    /// Walkable surface tiles (one under every block and player)
    pub floors: Vec<FloorTile>,
    /// Static obstructions
    pub blocks: Vec<BlockTile>,
    /// Movable avatars
    pub players: Vec<PlayerTile>,
    /// Target tiles
    pub goals: Vec<GoalTile>,
    next_id: u32,
}

impl GridModel {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next entity id.
    pub(crate) fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Remove every entity and reset id allocation.
    ///
    /// Idempotent: clearing an already-empty grid is a no-op.
    pub fn clear(&mut self) {
        self.floors.clear();
        self.blocks.clear();
        self.players.clear();
        self.goals.clear();
        self.next_id = 0;
    }

    /// True if no entities are present.
    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0
    }

    /// Total number of entities across all registries.
    pub fn entity_count(&self) -> usize {
        self.floors.len() + self.blocks.len() + self.players.len() + self.goals.len()
    }

    /// Is any block at `coord`?
    #[inline]
    pub fn block_at(&self, coord: Coord) -> bool {
        self.blocks.iter().any(|b| b.pos == coord)
    }

    /// Number of players currently on `coord`.
    ///
    /// Can exceed one: players do not block each other.
    pub fn players_at(&self, coord: Coord) -> usize {
        self.players.iter().filter(|p| p.pos == coord).count()
    }

    /// Floor at `coord`, if one was laid down there.
    pub fn floor_at(&self, coord: Coord) -> Option<&FloorTile> {
        self.floors.iter().find(|f| f.pos == coord)
    }

    /// Bounding box of all entities, `(min, max)` inclusive.
    ///
    /// `None` for an empty grid. Consumed by the camera collaborator.
    pub fn bounds(&self) -> Option<(Coord, Coord)> {
        let mut iter = self.positions();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for pos in iter {
            min.x = min.x.min(pos.x);
            min.z = min.z.min(pos.z);
            max.x = max.x.max(pos.x);
            max.z = max.z.max(pos.z);
        }
        Some((min, max))
    }

    fn positions(&self) -> impl Iterator<Item = Coord> + '_ {
        self.floors
            .iter()
            .map(|f| f.pos)
            .chain(self.blocks.iter().map(|b| b.pos))
            .chain(self.players.iter().map(|p| p.pos))
            .chain(self.goals.iter().map(|g| g.pos))
    }

    /// Compute the hash the server uses to cross-check mirrored clients.
    ///
    /// Registries are hashed in a fixed order; within each registry,
    /// entities are hashed in build order, including the flags the rule
    /// modifier layer owns.
    pub fn state_hash(&self) -> GridHash {
        let mut hasher = StateHasher::for_grid_state();

        hasher.update_u32(self.floors.len() as u32);
        for floor in &self.floors {
            hasher.update_u32(floor.id.0);
            hasher.update_coord(floor.pos);
            hasher.update_bool(floor.solid);
            hasher.update_bool(floor.visible);
        }

        hasher.update_u32(self.blocks.len() as u32);
        for block in &self.blocks {
            hasher.update_u32(block.id.0);
            hasher.update_coord(block.pos);
        }

        hasher.update_u32(self.players.len() as u32);
        for player in &self.players {
            hasher.update_u32(player.id.0);
            hasher.update_coord(player.pos);
            hasher.update_bool(player.visible);
        }

        hasher.update_u32(self.goals.len() as u32);
        for goal in &self.goals {
            hasher.update_u32(goal.id.0);
            hasher.update_coord(goal.pos);
            hasher.update_bool(goal.floor_skin);
        }

        hasher.finalize()
    }
}

// =============================================================================
// TESTS
// =============================================================================
