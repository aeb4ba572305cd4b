//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! All messages are JSON tagged on a `type` field; the server speaks
//! the same vocabulary to both clients in a room, so every message
//! here is small and replayable in tests.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::level::Level;
use crate::game::powerup::PowerupKind;

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Matchmaking placed this client in a room.
    RoomAssigned {
        /// Room identifier, shared by both players.
        room: Uuid,
    },

    /// Match parameters, sent once after room assignment.
    Config(MatchConfigMsg),

    /// The opponent disconnected or gave up.
    Forfeit,

    /// Full definition of the next level to build.
    NewLevel(Level),

    /// The opponent finished first; hold for the next level.
    Wait,

    /// This client won the match.
    Win,

    /// This client lost the match.
    Lose,

    /// The opponent targeted this client with a rule modifier.
    PowerupTarget {
        /// Which modifier to activate.
        name: PowerupKind,
    },

    /// Score bars for both players.
    ProgressBar {
        /// Own score.
        you: u32,
        /// Opponent score.
        enemy: u32,
    },
}

/// Match configuration payload.
///
/// Field names are camelCase on the wire, matching the lobby service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfigMsg {
    /// Easy levels in the match.
    pub easy_count: u32,
    /// Medium levels in the match.
    pub medium_count: u32,
    /// Hard levels in the match.
    pub hard_count: u32,
    /// Maximum achievable score.
    pub total_score: u32,
    /// Total levels in the match.
    pub level_count: u32,
}

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The local round is complete (all goals covered).
    Done,

    /// Player is leaving the match.
    Leave,
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
