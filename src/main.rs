//! Gridlock Demo Client
//!
//! Runs a scripted two-level match against a simulated server feed and
//! verifies that a mirrored session produces identical grid hashes.

use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use gridlock::{
    game::{
        events::GameEvent,
        level::{Level as GridLevel, LevelEntry},
        powerup::PowerupKind,
    },
    network::{
        protocol::{MatchConfigMsg, ServerMessage},
        session::ClientSession,
    },
    Direction, CUTSCENE_TICKS, TICK_RATE, VERSION,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;

    info!("Gridlock Client v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    demo_match();
    Ok(())
}

fn entry(id: u32, x: i32, z: i32, kind: &str) -> LevelEntry {
    LevelEntry {
        id,
        x,
        z,
        kind: kind.to_string(),
    }
}

/// A short corridor with one detour around a block.
fn level_one() -> GridLevel {
    GridLevel {
        data: vec![
            entry(1, 0, 0, "player"),
            entry(2, 1, 0, "block"),
            entry(3, 0, 1, "floor"),
            entry(4, 1, 1, "floor"),
            entry(5, 2, 1, "floor"),
            entry(6, 2, 0, "goal"),
        ],
        size: 100,
        difficulty: "easy".to_string(),
    }
}

/// Two players, two adjacent goals. The players start five cells apart,
/// so the lead player must pin against the block while the trailing one
/// catches up.
fn level_two() -> GridLevel {
    GridLevel {
        data: vec![
            entry(1, 1, 0, "block"),
            entry(2, 2, 0, "player"),
            entry(3, 5, 0, "player"),
            entry(4, 4, 0, "floor"),
            entry(5, 2, 0, "goal"),
            entry(6, 3, 0, "goal"),
        ],
        size: 100,
        difficulty: "medium".to_string(),
    }
}

/// Scripted solution for the two levels.
fn solution() -> Vec<Vec<Direction>> {
    vec![
        vec![
            Direction::Down,
            Direction::Right,
            Direction::Right,
            Direction::Up,
        ],
        // The lead player is already pinned on the left goal; two Lefts
        // walk the trailing player onto the right goal.
        vec![Direction::Left, Direction::Left],
    ]
}

fn demo_match() {
    info!("=== Starting Demo Match ===");

    let room = Uuid::new_v4();
    info!("Room: {}", room);

    let hashes = run_scripted_session(room);

    info!("=== Verifying Determinism ===");
    let replay_hashes = run_scripted_session(room);

    for (round, (first, second)) in hashes.iter().zip(replay_hashes.iter()).enumerate() {
        info!("Round {}: {} / {}", round + 1, first, second);
    }
    if hashes == replay_hashes {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        info!("DETERMINISM FAILURE: Hashes differ!");
    }
}

/// Play the scripted match once, returning the end-of-round grid hashes.
fn run_scripted_session(room: Uuid) -> Vec<String> {
    let mut session = ClientSession::new();
    let mut hashes = Vec::new();

    session.handle_message(ServerMessage::RoomAssigned { room });
    session.handle_message(ServerMessage::Config(MatchConfigMsg {
        easy_count: 1,
        medium_count: 1,
        hard_count: 0,
        total_score: 200,
        level_count: 2,
    }));

    let levels = [level_one(), level_two()];
    let moves = solution();

    for (level, script) in levels.into_iter().zip(moves) {
        session.handle_message(ServerMessage::NewLevel(level));

        // Mid-round harassment on round two.
        if session.controller().stats().current_level == 2 {
            session.handle_message(ServerMessage::PowerupTarget {
                name: PowerupKind::InvertedKeyboard,
            });
            session.tick();
        }

        let inverted = session
            .controller()
            .powerups()
            .is_active(PowerupKind::InvertedKeyboard);

        let mut complete = false;
        for direction in script {
            // The script describes intended motion; pre-invert when the
            // keyboard is swapped so the intent survives the modifier.
            let command = if inverted {
                direction.inverted()
            } else {
                direction
            };
            session.move_player(command);
            for event in session.tick() {
                if let GameEvent::RoundComplete { round } = event {
                    info!("Round {} complete", round);
                    complete = true;
                }
            }
        }
        assert!(complete, "script failed to finish the round");

        hashes.push(hex::encode(session.controller().state_hash()));
        for msg in session.drain_outbox() {
            info!("-> server: {}", msg.to_json().unwrap_or_default());
        }
        session.handle_message(ServerMessage::Wait);
    }

    session.handle_message(ServerMessage::Win);
    for _ in 0..CUTSCENE_TICKS {
        session.tick();
    }
    info!("Match over, phase: {:?}", session.controller().phase());

    hashes
}
