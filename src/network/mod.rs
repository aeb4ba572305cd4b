//! Network Layer
//!
//! WebSocket client for real-time match communication.
//! This layer is **non-deterministic** - all game logic runs through `game/`.

pub mod client;
pub mod protocol;
pub mod session;

pub use client::{ClientCommand, ClientConfig, ClientError, GameClient};
pub use protocol::{ClientMessage, MatchConfigMsg, ServerMessage};
pub use session::ClientSession;
