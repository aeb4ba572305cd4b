//! Win Condition Detection
//!
//! A level is won when every goal tile is covered by at least one player.
//! Pure function of the current grid, recomputed on demand each tick;
//! cost is linear in goals × players, far too small to memoize.

use crate::game::grid::GridModel;

/// Does the current grid satisfy the win condition?
///
/// True iff every goal's coordinate coincides with at least one player.
/// Vacuously true for a grid with no goals; the round controller never
/// polls before a successful build, and valid levels carry goals.
pub fn has_won(grid: &GridModel) -> bool {
    grid.goals
        .iter()
        .all(|goal| grid.players.iter().any(|player| player.pos == goal.pos))
}

// =============================================================================
// TESTS
// =============================================================================
