//! Directional Move Resolution
//!
//! Resolves one move command against the grid in a single pass: every
//! player shifts one tile in the commanded direction unless a block
//! occupies the target cell.
//!
//! There is no rollback: each player's move commits independently as it
//! is evaluated. Processing order is therefore load-bearing: a player is
//! evaluated only after every player that might vacate its target cell
//! this tick, so chains of adjacent players shift together instead of the
//! trailing ones reading a stale occupant. Blocked players simply stay;
//! nothing is retried or queued.

use crate::core::coord::{Coord, Direction};
use crate::game::grid::GridModel;

/// Is a move onto `target` legal?
///
/// Legal iff no block occupies the cell. Other players are deliberately
/// not checked: two players may share a cell.
#[inline]
pub fn can_move(grid: &GridModel, target: Coord) -> bool {
    !grid.block_at(target)
}

/// Resolve one move command, mutating player positions in place.
///
/// Returns the number of players that actually moved.
pub fn resolve_move(grid: &mut GridModel, direction: Direction) -> usize {
    // Front of the chain first: the player furthest along the travel
    // direction is evaluated before the one behind it. One parametrized
    // ordering covers all four directions via axis projection and sign.
    let mut order: Vec<usize> = (0..grid.players.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(direction.sign() * direction.axis(grid.players[i].pos)));

    let mut moved = 0;
    for i in order {
        let target = grid.players[i].pos.step(direction);
        if can_move(grid, target) {
            grid.players[i].pos = target;
            moved += 1;
        }
    }
    moved
}

// =============================================================================
// TESTS
// =============================================================================
