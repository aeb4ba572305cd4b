//! WebSocket Game Client
//!
//! Async connection task for a match. Owns the socket and the
//! [`ClientSession`], multiplexing three sources: frames from the
//! server, local input commands, and the fixed-rate simulation tick.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info};

use crate::core::coord::Direction;
use crate::network::session::ClientSession;
use crate::TICK_RATE;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the match server.
    pub server_url: String,
    /// Simulation tick rate (Hz).
    pub tick_rate: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8080".to_string(),
            tick_rate: TICK_RATE,
        }
    }
}

/// Commands the input layer feeds into the connection task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    /// Directional move.
    Move(Direction),
    /// Reset the current round.
    Reset,
    /// Leave the match and close the connection.
    Leave,
}

/// Game client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Message serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Server closed the connection mid-match.
    #[error("Connection closed by server")]
    ConnectionClosed,
}

/// The connection task for one match.
pub struct GameClient {
    config: ClientConfig,
}

impl GameClient {
    /// Create a client with the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Connect and run until the match ends or `Leave` arrives.
    ///
    /// The session's outbox is flushed after every inbound frame, tick,
    /// and command, so `done` reaches the server on the same iteration
    /// that detected the win.
    pub async fn run(
        self,
        mut commands: mpsc::Receiver<ClientCommand>,
    ) -> Result<(), ClientError> {
        info!(url = %self.config.server_url, "connecting");
        let (socket, _) = connect_async(&self.config.server_url).await?;
        let (mut write, mut read) = socket.split();

        let mut session = ClientSession::new();
        let mut ticker = interval(Duration::from_micros(
            1_000_000 / u64::from(self.config.tick_rate),
        ));

        loop {
            tokio::select! {
                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            session.handle_text(&text);
                        }
                        Some(Ok(Message::Ping(payload))) => {
                            write.send(Message::Pong(payload)).await?;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("server closed the connection");
                            return Err(ClientError::ConnectionClosed);
                        }
                        Some(Ok(other)) => {
                            debug!(?other, "ignoring non-text frame");
                        }
                        Some(Err(err)) => return Err(err.into()),
                    }
                }
                _ = ticker.tick() => {
                    session.tick();
                    // Post-cutscene the controller returns to idle; the
                    // match is over and the socket can close cleanly.
                    if session.room().is_some() && !session.is_active() {
                        info!("match finished, closing connection");
                        Self::flush(&mut session, &mut write).await?;
                        write.send(Message::Close(None)).await?;
                        return Ok(());
                    }
                }
                cmd = commands.recv() => {
                    match cmd {
                        Some(ClientCommand::Move(direction)) => {
                            if !session.move_player(direction) {
                                debug!(?direction, "move dropped, gate closed");
                            }
                        }
                        Some(ClientCommand::Reset) => {
                            // Local only; the server is not involved.
                            session.reset_round();
                        }
                        Some(ClientCommand::Leave) | None => {
                            session.leave();
                            Self::flush(&mut session, &mut write).await?;
                            write.send(Message::Close(None)).await?;
                            return Ok(());
                        }
                    }
                }
            }

            Self::flush(&mut session, &mut write).await?;
        }
    }

    async fn flush<S>(session: &mut ClientSession, write: &mut S) -> Result<(), ClientError>
    where
        S: SinkExt<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
    {
        for msg in session.drain_outbox() {
            write.send(Message::Text(msg.to_json()?)).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_tick_rate() {
        let config = ClientConfig::default();
        assert_eq!(config.tick_rate, TICK_RATE);
        assert!(config.server_url.starts_with("ws://"));
    }

    #[test]
    fn test_commands_are_comparable() {
        assert_eq!(
            ClientCommand::Move(Direction::Up),
            ClientCommand::Move(Direction::Up)
        );
        assert_ne!(ClientCommand::Leave, ClientCommand::Reset);
    }
}
