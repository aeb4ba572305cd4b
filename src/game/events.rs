//! Game Events
//!
//! Events the round controller reports outward. The network session
//! translates the ones the server cares about (`RoundComplete`) into
//! outbound messages; the rest feed logging and the UI collaborator.

use serde::{Deserialize, Serialize};

use crate::game::powerup::PowerupKind;

/// How the match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Server declared this client the winner
    Victory,
    /// Server declared this client the loser
    Defeat,
    /// The opponent left mid-match
    OpponentForfeit,
}

/// An event produced by the round controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A level finished building and play began.
    LevelStarted {
        /// 1-based round index within the match
        round: u32,
        /// Entities created by the build
        entities: usize,
        /// Difficulty label from the level description
        difficulty: String,
    },

    /// The local win condition held for the first time this round.
    /// Emitted exactly once per round.
    RoundComplete {
        /// Round that was completed
        round: u32,
    },

    /// A level failed to build; the round was abandoned.
    RoundAborted {
        /// Human-readable build failure
        reason: String,
    },

    /// The round was reset to its initial layout.
    RoundReset {
        /// Round that was reset
        round: u32,
    },

    /// A rule modifier crossed its 0→1 edge.
    PowerupActivated {
        /// The modifier
        kind: PowerupKind,
    },

    /// A rule modifier crossed its 1→0 edge.
    PowerupDeactivated {
        /// The modifier
        kind: PowerupKind,
    },

    /// The match ended; a cutscene transition is running.
    MatchEnded {
        /// Final outcome
        outcome: MatchOutcome,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_serialize() {
        let events = vec![
            GameEvent::LevelStarted {
                round: 1,
                entities: 12,
                difficulty: "easy".to_string(),
            },
            GameEvent::RoundComplete { round: 1 },
            GameEvent::PowerupActivated {
                kind: PowerupKind::RandomHoles,
            },
            GameEvent::MatchEnded {
                outcome: MatchOutcome::OpponentForfeit,
            },
        ];

        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            let back: GameEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(back, event);
        }
    }
}
