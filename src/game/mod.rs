//! Game Logic Module
//!
//! All level-state resolution code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `entity`: tile entities (floor, block, player, goal)
//! - `grid`: the four-registry grid model
//! - `level`: level description, builder, build errors
//! - `movement`: directional move resolution with ordering guarantees
//! - `win`: win condition detection
//! - `powerup`: edge-triggered rule modifiers
//! - `events`: outbound game events
//! - `round`: round lifecycle state machine

pub mod entity;
pub mod events;
pub mod grid;
pub mod level;
pub mod movement;
pub mod powerup;
pub mod round;
pub mod win;

// Re-export key types
pub use entity::{EntityId, TileKind};
pub use events::{GameEvent, MatchOutcome};
pub use grid::GridModel;
pub use level::{BuildReceipt, Level, LevelBuilder, LevelError};
pub use powerup::{PowerupKind, PowerupState};
pub use round::{MatchStats, RoundController, RoundPhase};
