//! Core deterministic primitives.
//!
//! All types in this module are designed for perfect cross-platform
//! determinism. They form the foundation that lets two mirrored client
//! instances stay in lockstep on the same level.

pub mod coord;
pub mod hash;
pub mod rng;

// Re-export core types
pub use coord::{Coord, Direction};
pub use hash::{GridHash, StateHasher};
pub use rng::DeterministicRng;
