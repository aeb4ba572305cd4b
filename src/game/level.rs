//! Level Description and Builder
//!
//! Materializes a serialized level description into a populated
//! [`GridModel`]. The builder lays a floor under every block and player
//! entry (goals render as their own surface tile and get none), validates
//! the whole description before creating anything, and signals completion
//! exactly once per build via a generation-stamped receipt.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::coord::Coord;
use crate::game::entity::{BlockTile, FloorTile, GoalTile, PlayerTile, TileKind};
use crate::game::grid::GridModel;

/// One entry of a level description.
///
/// `kind` stays a raw string on the wire so an unrecognized type is
/// reported as a build error naming the entry, rather than rejected
/// opaquely during deserialization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelEntry {
    /// Entry id, unique within the level description
    pub id: u32,
    /// Tile x coordinate
    pub x: i32,
    /// Tile z coordinate
    pub z: i32,
    /// Tile type: `"floor" | "block" | "player" | "goal"`
    #[serde(rename = "type")]
    pub kind: String,
}

impl LevelEntry {
    /// Tile coordinate of this entry.
    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.z)
    }
}

/// A serialized level, as delivered by the `new_level` message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Level {
    /// Entity entries
    pub data: Vec<LevelEntry>,
    /// Nominal tile size, consumed only by the renderer
    pub size: u32,
    /// Difficulty label (`"easy" | "medium" | "hard"`)
    #[serde(default)]
    pub difficulty: String,
}

/// Errors in a level description detected at build time.
///
/// Both are local and recoverable: the round controller aborts the round
/// and reports upward instead of crashing.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The description contains no entries. Special-cased so completion
    /// is never left hanging on a decrement-to-zero counter.
    #[error("level has no entities")]
    Empty,

    /// An entry carries an unrecognized tile type.
    #[error("level entry {id} has unrecognized tile type {kind:?}")]
    MalformedEntry {
        /// Id of the offending entry
        id: u32,
        /// The unrecognized type string
        kind: String,
    },
}

/// Completion signal of one build, stamped with its generation.
///
/// A receipt is produced exactly once, after the last entity is created.
/// The round controller must discard receipts whose generation is older
/// than the builder's current one: a build superseded by `empty()` or a
/// newer build is best-effort and its completion must be ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildReceipt {
    /// Generation of the build that produced this receipt
    pub generation: u64,
    /// Number of entities created
    pub entities_built: usize,
}

/// Converts level descriptions into populated grids.
#[derive(Debug, Default)]
pub struct LevelBuilder {
    generation: u64,
}

impl LevelBuilder {
    /// Create a builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the most recently started build or clear.
    pub fn current_generation(&self) -> u64 {
        self.generation
    }

    /// Is this receipt from the most recently started build?
    pub fn is_current(&self, receipt: &BuildReceipt) -> bool {
        receipt.generation == self.generation
    }

    /// Clear the grid and materialize `level` into it.
    ///
    /// The whole description is validated first, so a malformed level
    /// never leaves a half-built grid behind. Every entry is processed;
    /// entry order does not matter (entries are independent).
    pub fn build(&mut self, level: &Level, grid: &mut GridModel) -> Result<BuildReceipt, LevelError> {
        // Starting a build supersedes any previous one.
        self.generation += 1;
        let generation = self.generation;

        if level.data.is_empty() {
            return Err(LevelError::Empty);
        }

        for entry in &level.data {
            if TileKind::from_wire(&entry.kind).is_none() {
                return Err(LevelError::MalformedEntry {
                    id: entry.id,
                    kind: entry.kind.clone(),
                });
            }
        }

        grid.clear();

        for entry in &level.data {
            let pos = entry.coord();
            // Validated above.
            match TileKind::from_wire(&entry.kind) {
                Some(TileKind::Floor) => {
                    let id = grid.alloc_id();
                    grid.floors.push(FloorTile::new(id, pos));
                }
                Some(TileKind::Block) => {
                    let id = grid.alloc_id();
                    grid.floors.push(FloorTile::new(id, pos));
                    let id = grid.alloc_id();
                    grid.blocks.push(BlockTile::new(id, pos));
                }
                Some(TileKind::Player) => {
                    let id = grid.alloc_id();
                    grid.floors.push(FloorTile::new(id, pos));
                    let id = grid.alloc_id();
                    grid.players.push(PlayerTile::new(id, pos));
                }
                Some(TileKind::Goal) => {
                    // Goals are their own surface tile; no floor beneath.
                    let id = grid.alloc_id();
                    grid.goals.push(GoalTile::new(id, pos));
                }
                None => unreachable!("entries validated before building"),
            }
        }

        Ok(BuildReceipt {
            generation,
            entities_built: grid.entity_count(),
        })
    }

    /// Discard every previously built entity.
    ///
    /// Idempotent, and callable before any build. Also supersedes any
    /// in-flight build: its receipt becomes stale.
    pub fn empty(&mut self, grid: &mut GridModel) {
        self.generation += 1;
        grid.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
