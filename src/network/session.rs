//! Client Session
//!
//! Translates between the wire protocol and the round controller:
//! inbound [`ServerMessage`]s become controller calls, and controller
//! outcomes become outbound [`ClientMessage`]s collected in an outbox
//! the connection task drains after every step.
//!
//! Unknown or undecodable frames are logged and dropped; a malformed
//! message from the server must never take the session down.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::coord::Direction;
use crate::core::hash::short_hex;
use crate::game::events::GameEvent;
use crate::game::round::{RoundController, RoundPhase};
use crate::network::protocol::{ClientMessage, ServerMessage};

/// One client's view of a match, from room assignment to leave.
pub struct ClientSession {
    controller: RoundController,
    room: Option<Uuid>,
    outbox: Vec<ClientMessage>,
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSession {
    /// Create a session with an idle controller.
    pub fn new() -> Self {
        Self {
            controller: RoundController::new(),
            room: None,
            outbox: Vec::new(),
        }
    }

    /// The underlying round controller, read-only.
    pub fn controller(&self) -> &RoundController {
        &self.controller
    }

    /// The assigned room, if any.
    pub fn room(&self) -> Option<Uuid> {
        self.room
    }

    /// Take everything queued for the server.
    pub fn drain_outbox(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// Decode and dispatch one raw frame from the server.
    pub fn handle_text(&mut self, text: &str) -> Vec<GameEvent> {
        match ServerMessage::from_json(text) {
            Ok(msg) => self.handle_message(msg),
            Err(err) => {
                warn!(%err, "dropping undecodable server frame");
                Vec::new()
            }
        }
    }

    /// Dispatch one decoded server message.
    pub fn handle_message(&mut self, msg: ServerMessage) -> Vec<GameEvent> {
        match msg {
            ServerMessage::RoomAssigned { room } => {
                info!(%room, "room assigned");
                self.room = Some(room);
                self.controller.on_room_assigned(*room.as_bytes());
                Vec::new()
            }
            ServerMessage::Config(cfg) => {
                debug!(levels = cfg.level_count, score = cfg.total_score, "match config");
                self.controller.on_config(
                    cfg.easy_count,
                    cfg.medium_count,
                    cfg.hard_count,
                    cfg.total_score,
                    cfg.level_count,
                );
                Vec::new()
            }
            ServerMessage::NewLevel(level) => {
                info!(
                    entries = level.data.len(),
                    difficulty = %level.difficulty,
                    "new level"
                );
                let events = self.controller.on_new_level(level);
                self.log_state();
                events
            }
            ServerMessage::Wait => {
                info!("holding for next level");
                self.controller.on_wait();
                Vec::new()
            }
            ServerMessage::Win => self.controller.on_win(),
            ServerMessage::Lose => self.controller.on_lose(),
            ServerMessage::Forfeit => self.controller.on_forfeit(),
            ServerMessage::PowerupTarget { name } => {
                info!(kind = ?name, "targeted by powerup");
                self.controller.on_powerup_target(name);
                Vec::new()
            }
            ServerMessage::ProgressBar { you, enemy } => {
                self.controller.on_progress(you, enemy);
                Vec::new()
            }
        }
    }

    /// Dispatch a directional input from the local player.
    ///
    /// Returns false when the controller's movement gate is closed.
    pub fn move_player(&mut self, direction: Direction) -> bool {
        let moved = self.controller.try_move(direction);
        if moved {
            self.log_state();
        }
        moved
    }

    /// Advance the simulation one step.
    ///
    /// A round completion here queues `done` for the server.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let events = self.controller.tick();
        for event in &events {
            match event {
                GameEvent::RoundComplete { round } => {
                    info!(round, "round complete, notifying server");
                    self.outbox.push(ClientMessage::Done);
                }
                GameEvent::RoundAborted { reason } => {
                    warn!(%reason, "round aborted");
                }
                _ => debug!(?event, "game event"),
            }
        }
        events
    }

    /// Reset the current round to its initial layout.
    ///
    /// A no-op outside active play; completed rounds stay completed.
    pub fn reset_round(&mut self) -> Vec<GameEvent> {
        let events = self.controller.reset();
        if !events.is_empty() {
            self.log_state();
        }
        events
    }

    /// Leave the match cleanly.
    pub fn leave(&mut self) {
        info!("leaving match");
        self.outbox.push(ClientMessage::Leave);
    }

    /// Is the session in a state where the connection should stay open?
    pub fn is_active(&self) -> bool {
        self.room.is_some() && self.controller.phase() != RoundPhase::Idle
    }

    fn log_state(&self) {
        debug!(
            hash = %short_hex(&self.controller.state_hash()),
            "grid state"
        );
    }
}
