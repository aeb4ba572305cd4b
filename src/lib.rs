//! # Gridlock Client Engine
//!
//! Deterministic grid movement and level-state resolution for Gridlock,
//! a head-to-head puzzle race mediated by a matchmaking server.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     GRIDLOCK CLIENT                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── coord.rs    - Integer (x,z) coordinates and directions  │
//! │  ├── rng.rs      - Seeded Xorshift128+ PRNG                  │
//! │  └── hash.rs     - Grid state hashing for desync detection   │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── entity.rs   - Tile entities                             │
//! │  ├── grid.rs     - Four-registry grid model                  │
//! │  ├── level.rs    - Level description and builder             │
//! │  ├── movement.rs - Directional move resolution               │
//! │  ├── win.rs      - Win condition detection                   │
//! │  ├── powerup.rs  - Edge-triggered rule modifiers             │
//! │  └── round.rs    - Round lifecycle state machine             │
//! │                                                              │
//! │  network/        - Networking (non-deterministic)            │
//! │  ├── protocol.rs - Message types                             │
//! │  ├── session.rs  - Message dispatch to the round controller  │
//! │  └── client.rs   - WebSocket transport                       │
//! │                                                              │
//! │  render.rs       - Read-only presentation seam               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - Integer grid coordinates only, no floating point
//! - All randomness from a seeded Xorshift128+ shared with the mirrored
//!   opponent instance
//! - No system time dependencies
//!
//! Given the same level description, the same move commands, and the same
//! round seed, both players' local simulations produce **identical grids**,
//! which the server cross-checks via [`game::grid::GridModel::state_hash`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;
pub mod render;

// Re-export commonly used types
pub use crate::core::coord::{Coord, Direction};
pub use crate::core::rng::DeterministicRng;
pub use crate::game::grid::GridModel;
pub use crate::game::level::{Level, LevelBuilder, LevelError};
pub use crate::game::powerup::{PowerupKind, PowerupState};
pub use crate::game::round::{RoundController, RoundPhase};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz), one tick per rendered frame
pub const TICK_RATE: u32 = 60;

/// Ticks spent in the end-of-match cutscene before returning to idle
/// (5 seconds at 60 Hz)
pub const CUTSCENE_TICKS: u32 = 300;
