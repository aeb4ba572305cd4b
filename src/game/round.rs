//! Round Lifecycle State Machine
//!
//! Drives the builder, movement resolver, win detector, and rule
//! modifier layer in response to server lifecycle events, and reports
//! local outcomes outward as [`GameEvent`]s.
//!
//! The movement gate lives here as explicit controller state; the input
//! layer queries [`RoundController::movement_allowed`] instead of sharing
//! a mutable flag with the state machine.

use serde::{Deserialize, Serialize};

use crate::core::coord::Direction;
use crate::core::hash::GridHash;
use crate::core::rng::derive_round_seed;
use crate::game::events::{GameEvent, MatchOutcome};
use crate::game::grid::GridModel;
use crate::game::level::{BuildReceipt, Level, LevelBuilder};
use crate::game::movement::resolve_move;
use crate::game::powerup::{PowerupKind, PowerupState};
use crate::game::win::has_won;
use crate::CUTSCENE_TICKS;

/// Where the controller is in the round lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No room assigned yet, or back from a finished match
    Idle,
    /// In a room, waiting for (or building) the next level
    AwaitingLevel,
    /// A level is live and accepting input
    Playing,
    /// Server declared victory; cutscene running
    Won,
    /// Server declared defeat; cutscene running
    Lost,
}

/// Match-scoped bookkeeping mirrored from server messages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    /// Total levels in the match
    pub level_count: u32,
    /// Easy levels in the match
    pub easy_count: u32,
    /// Medium levels in the match
    pub medium_count: u32,
    /// Hard levels in the match
    pub hard_count: u32,
    /// Maximum achievable score
    pub total_score: u32,
    /// 1-based index of the level currently (or last) played
    pub current_level: u32,
    /// Difficulty label of the current level
    pub difficulty: String,
    /// Own score, from `progress_bar`
    pub you: u32,
    /// Opponent score, from `progress_bar`
    pub enemy: u32,
}

/// Client-side round controller.
///
/// Owns the single grid instance. Only the level builder (create and
/// destroy) and the movement resolver / rule modifier layer (position and
/// flag mutation) touch it; win detection and rendering read it.
pub struct RoundController {
    grid: GridModel,
    builder: LevelBuilder,
    powerups: PowerupState,
    phase: RoundPhase,
    movement_allowed: bool,
    /// Latch: the round-complete signal fires at most once per round.
    round_complete: bool,
    round_index: u32,
    current_level: Option<Level>,
    room_id: [u8; 16],
    /// Active modifier countdowns, `(kind, ticks_remaining)`
    powerup_timers: Vec<(PowerupKind, u32)>,
    /// Remaining cutscene ticks while in `Won`/`Lost`
    cutscene: Option<u32>,
    stats: MatchStats,
}

impl Default for RoundController {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundController {
    /// Create an idle controller.
    pub fn new() -> Self {
        Self {
            grid: GridModel::new(),
            builder: LevelBuilder::new(),
            powerups: PowerupState::new(0),
            phase: RoundPhase::Idle,
            movement_allowed: false,
            round_complete: false,
            round_index: 0,
            current_level: None,
            room_id: [0; 16],
            powerup_timers: Vec::new(),
            cutscene: None,
            stats: MatchStats::default(),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Is directional input accepted right now?
    ///
    /// Queried by the input layer before dispatching a move; simultaneous
    /// inputs are not queued, only gated.
    pub fn movement_allowed(&self) -> bool {
        self.movement_allowed
    }

    /// The grid, read-only (for win display, rendering, hashing).
    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    /// Rule modifier state, read-only (for rendering).
    pub fn powerups(&self) -> &PowerupState {
        &self.powerups
    }

    /// Match bookkeeping, read-only (for the UI collaborator).
    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    /// Hash of the current grid for desync cross-checks.
    pub fn state_hash(&self) -> GridHash {
        self.grid.state_hash()
    }

    /// A room was assigned by the matchmaking server.
    pub fn on_room_assigned(&mut self, room_id: [u8; 16]) {
        self.room_id = room_id;
        self.phase = RoundPhase::AwaitingLevel;
    }

    /// Match configuration arrived.
    pub fn on_config(
        &mut self,
        easy_count: u32,
        medium_count: u32,
        hard_count: u32,
        total_score: u32,
        level_count: u32,
    ) {
        self.stats.easy_count = easy_count;
        self.stats.medium_count = medium_count;
        self.stats.hard_count = hard_count;
        self.stats.total_score = total_score;
        self.stats.level_count = level_count;
    }

    /// Score bars update.
    pub fn on_progress(&mut self, you: u32, enemy: u32) {
        self.stats.you = you;
        self.stats.enemy = enemy;
    }

    /// A new level arrived: tear down the previous round and build it.
    pub fn on_new_level(&mut self, level: Level) -> Vec<GameEvent> {
        self.phase = RoundPhase::AwaitingLevel;
        self.movement_allowed = false;
        self.round_index += 1;

        // Tear down first so an aborted build never leaves the previous
        // round's entities behind.
        self.builder.empty(&mut self.grid);

        let receipt = match self.builder.build(&level, &mut self.grid) {
            Ok(receipt) => receipt,
            Err(err) => {
                self.current_level = None;
                return vec![GameEvent::RoundAborted {
                    reason: err.to_string(),
                }];
            }
        };

        self.stats.current_level = self.round_index;
        self.stats.difficulty = level.difficulty.clone();
        self.current_level = Some(level);
        self.finish_build(receipt)
    }

    /// Handle a build completion signal.
    ///
    /// Public so an asynchronous level loader can feed its receipt back
    /// in. Receipts from superseded builds are ignored: only the most
    /// recently started build may transition the round to `Playing`.
    pub fn finish_build(&mut self, receipt: BuildReceipt) -> Vec<GameEvent> {
        if !self.builder.is_current(&receipt) {
            return Vec::new();
        }

        self.start_round();
        vec![GameEvent::LevelStarted {
            round: self.round_index,
            entities: receipt.entities_built,
            difficulty: self.stats.difficulty.clone(),
        }]
    }

    fn start_round(&mut self) {
        let seed = derive_round_seed(&self.room_id, self.round_index);
        self.powerups.reset(seed);
        self.powerup_timers.clear();
        self.movement_allowed = true;
        self.round_complete = false;
        self.phase = RoundPhase::Playing;
    }

    /// Dispatch a directional move command.
    ///
    /// Returns false when the gate is closed (mid-build, after a win,
    /// during cutscenes). While `inverted_keyboard` is active the command
    /// is remapped pairwise before resolution.
    pub fn try_move(&mut self, direction: Direction) -> bool {
        if !self.movement_allowed {
            return false;
        }

        let direction = if self.powerups.is_active(PowerupKind::InvertedKeyboard) {
            direction.inverted()
        } else {
            direction
        };
        resolve_move(&mut self.grid, direction);
        true
    }

    /// The opponent targeted this client with a powerup.
    ///
    /// The modifier activates on the next tick edge and expires after its
    /// fixed duration.
    pub fn on_powerup_target(&mut self, kind: PowerupKind) {
        self.powerups.set_active(kind, true);
        // Re-targeting an active modifier restarts its countdown.
        self.powerup_timers.retain(|(k, _)| *k != kind);
        self.powerup_timers.push((kind, kind.duration_ticks()));
    }

    /// Reset the round to the last received level definition.
    ///
    /// Clears all rule modifier state and rebuilds the grid. Only usable
    /// from `Playing` (user command or `reset_level` expiry): once the
    /// round completed or the match ended, a reset would reopen the input
    /// gate and re-arm the round-complete latch, so it is a no-op.
    pub fn reset(&mut self) -> Vec<GameEvent> {
        if self.phase != RoundPhase::Playing {
            return Vec::new();
        }
        let Some(level) = self.current_level.clone() else {
            return Vec::new();
        };

        match self.builder.build(&level, &mut self.grid) {
            Ok(_) => {
                self.start_round();
                vec![GameEvent::RoundReset {
                    round: self.round_index,
                }]
            }
            // The level built before, so this is unreachable in practice;
            // surface it rather than crash.
            Err(err) => vec![GameEvent::RoundAborted {
                reason: err.to_string(),
            }],
        }
    }

    /// The round ended server-side; hold for the next level.
    pub fn on_wait(&mut self) {
        self.phase = RoundPhase::AwaitingLevel;
        self.movement_allowed = false;
    }

    /// Server declared this client the match winner.
    pub fn on_win(&mut self) -> Vec<GameEvent> {
        self.end_match(RoundPhase::Won, MatchOutcome::Victory)
    }

    /// Server declared this client the match loser.
    pub fn on_lose(&mut self) -> Vec<GameEvent> {
        self.end_match(RoundPhase::Lost, MatchOutcome::Defeat)
    }

    /// The opponent forfeited; counts as a win.
    pub fn on_forfeit(&mut self) -> Vec<GameEvent> {
        self.end_match(RoundPhase::Won, MatchOutcome::OpponentForfeit)
    }

    fn end_match(&mut self, phase: RoundPhase, outcome: MatchOutcome) -> Vec<GameEvent> {
        self.phase = phase;
        self.movement_allowed = false;
        self.cutscene = Some(CUTSCENE_TICKS);
        vec![GameEvent::MatchEnded { outcome }]
    }

    /// Run one simulation step.
    ///
    /// Steps modifier edges and accumulators, polls the win condition,
    /// and advances cutscene/expiry countdowns. Returns the events
    /// produced this tick.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();

        // Cutscene countdown after win/lose.
        if let Some(remaining) = self.cutscene {
            if remaining <= 1 {
                self.cutscene = None;
                self.builder.empty(&mut self.grid);
                self.current_level = None;
                self.phase = RoundPhase::Idle;
            } else {
                self.cutscene = Some(remaining - 1);
            }
            return events;
        }

        if self.phase != RoundPhase::Playing {
            return events;
        }

        // Expire modifier countdowns.
        for (kind, remaining) in &mut self.powerup_timers {
            *remaining -= 1;
            if *remaining == 0 {
                self.powerups.set_active(*kind, false);
            }
        }
        self.powerup_timers.retain(|(_, remaining)| *remaining > 0);

        // Edge effects and accumulators.
        let transitions = self.powerups.tick(&mut self.grid);
        for kind in &transitions.activated {
            events.push(GameEvent::PowerupActivated { kind: *kind });
        }
        for kind in &transitions.deactivated {
            events.push(GameEvent::PowerupDeactivated { kind: *kind });
        }
        if transitions.reset_requested {
            events.extend(self.reset());
        }

        // Win poll, latched: emit once, close the gate, leave Playing.
        if !self.round_complete && has_won(&self.grid) {
            self.round_complete = true;
            self.movement_allowed = false;
            self.phase = RoundPhase::AwaitingLevel;
            events.push(GameEvent::RoundComplete {
                round: self.round_index,
            });
        }

        events
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coord::Coord;
    use crate::game::level::LevelEntry;

    fn level(entries: &[(u32, i32, i32, &str)]) -> Level {
        Level {
            data: entries
                .iter()
                .map(|&(id, x, z, kind)| LevelEntry {
                    id,
                    x,
                    z,
                    kind: kind.to_string(),
                })
                .collect(),
            size: 100,
            difficulty: "easy".to_string(),
        }
    }

    /// player at (0,0), open run to the goal at (2,0)
    fn simple_level() -> Level {
        level(&[
            (1, 0, 0, "player"),
            (2, 1, 0, "floor"),
            (3, 2, 0, "goal"),
        ])
    }

    fn playing_controller() -> RoundController {
        let mut c = RoundController::new();
        c.on_room_assigned([9; 16]);
        let events = c.on_new_level(simple_level());
        assert!(matches!(events[0], GameEvent::LevelStarted { .. }));
        c
    }

    #[test]
    fn test_round_complete_emitted_exactly_once() {
        let mut c = playing_controller();
        assert_eq!(c.phase(), RoundPhase::Playing);
        assert!(c.movement_allowed());

        assert!(c.try_move(Direction::Right));
        assert!(c.tick().is_empty());
        assert!(c.try_move(Direction::Right));

        let events = c.tick();
        assert_eq!(events, vec![GameEvent::RoundComplete { round: 1 }]);

        // Latched: no re-emit, input gated, phase left Playing.
        assert!(!c.movement_allowed());
        assert_eq!(c.phase(), RoundPhase::AwaitingLevel);
        assert!(!c.try_move(Direction::Left));
        for _ in 0..10 {
            assert!(c.tick().is_empty());
        }
    }

    #[test]
    fn test_move_gated_before_any_level() {
        let mut c = RoundController::new();
        assert!(!c.try_move(Direction::Up));
    }

    #[test]
    fn test_blocked_level_scenario() {
        let mut c = RoundController::new();
        c.on_room_assigned([1; 16]);
        c.on_new_level(level(&[
            (1, 0, 0, "player"),
            (2, 1, 0, "block"),
            (3, 2, 0, "goal"),
        ]));

        // Move accepted but resolves to a no-op; no win.
        assert!(c.try_move(Direction::Right));
        assert_eq!(c.grid().players[0].pos, Coord::new(0, 0));
        assert!(c.tick().is_empty());
    }

    #[test]
    fn test_win_at_build_time_fires_on_first_tick() {
        let mut c = RoundController::new();
        c.on_room_assigned([1; 16]);
        c.on_new_level(level(&[(1, 2, 0, "player"), (2, 2, 0, "goal")]));

        let events = c.tick();
        assert_eq!(events, vec![GameEvent::RoundComplete { round: 1 }]);
    }

    #[test]
    fn test_empty_level_aborts_round() {
        let mut c = RoundController::new();
        c.on_room_assigned([1; 16]);

        let events = c.on_new_level(level(&[]));
        assert!(matches!(events[0], GameEvent::RoundAborted { .. }));
        assert_eq!(c.phase(), RoundPhase::AwaitingLevel);
        assert!(!c.movement_allowed());
    }

    #[test]
    fn test_malformed_level_abort_names_entry() {
        let mut c = RoundController::new();
        c.on_room_assigned([1; 16]);

        let events = c.on_new_level(level(&[(41, 0, 0, "swamp")]));
        match &events[0] {
            GameEvent::RoundAborted { reason } => assert!(reason.contains("41")),
            other => panic!("expected abort, got {:?}", other),
        }
    }

    #[test]
    fn test_stale_build_receipt_is_ignored() {
        let mut c = playing_controller();

        // A receipt stamped with an old generation must not restart play.
        c.on_wait();
        let stale = BuildReceipt {
            generation: 0,
            entities_built: 3,
        };
        assert!(c.finish_build(stale).is_empty());
        assert_eq!(c.phase(), RoundPhase::AwaitingLevel);
        assert!(!c.movement_allowed());
    }

    #[test]
    fn test_inverted_keyboard_remaps_pairwise() {
        let mut c = playing_controller();

        c.on_powerup_target(PowerupKind::InvertedKeyboard);
        c.tick();

        // Commanded Left, resolved Right.
        c.try_move(Direction::Left);
        assert_eq!(c.grid().players[0].pos, Coord::new(1, 0));
    }

    #[test]
    fn test_powerup_expires_after_duration() {
        let mut c = playing_controller();

        c.on_powerup_target(PowerupKind::InvisiblePlayer);
        c.tick();
        assert!(!c.grid().players[0].visible);

        for _ in 0..PowerupKind::InvisiblePlayer.duration_ticks() {
            c.tick();
        }
        assert!(c.grid().players[0].visible);
        assert!(!c.powerups().is_active(PowerupKind::InvisiblePlayer));
    }

    #[test]
    fn test_reset_restores_initial_layout() {
        let mut c = playing_controller();

        c.try_move(Direction::Right);
        assert_eq!(c.grid().players[0].pos, Coord::new(1, 0));

        let events = c.reset();
        assert_eq!(events, vec![GameEvent::RoundReset { round: 1 }]);
        assert_eq!(c.grid().players[0].pos, Coord::new(0, 0));
        assert!(c.movement_allowed());
    }

    #[test]
    fn test_reset_after_round_complete_is_noop() {
        let mut c = playing_controller();

        c.try_move(Direction::Right);
        c.tick();
        c.try_move(Direction::Right);
        assert_eq!(c.tick(), vec![GameEvent::RoundComplete { round: 1 }]);

        // The latch must stay armed: a reset after completion would
        // reopen the gate and let the round signal completion twice.
        assert!(c.reset().is_empty());
        assert_eq!(c.phase(), RoundPhase::AwaitingLevel);
        assert!(!c.movement_allowed());
        assert!(!c.try_move(Direction::Left));
        for _ in 0..10 {
            assert!(c.tick().is_empty());
        }
    }

    #[test]
    fn test_reset_during_cutscene_is_noop() {
        let mut c = playing_controller();
        c.on_lose();

        assert!(c.reset().is_empty());
        assert!(!c.movement_allowed());
        assert_eq!(c.phase(), RoundPhase::Lost);

        // The cutscene still runs to completion undisturbed.
        for _ in 0..crate::CUTSCENE_TICKS {
            c.tick();
        }
        assert_eq!(c.phase(), RoundPhase::Idle);
    }

    #[test]
    fn test_aborted_build_discards_previous_grid() {
        let mut c = playing_controller();
        assert!(!c.grid().is_empty());

        let events = c.on_new_level(level(&[(9, 0, 0, "swamp")]));
        assert!(matches!(events[0], GameEvent::RoundAborted { .. }));

        // The failed round must not show the previous level's entities.
        assert!(c.grid().is_empty());
    }

    #[test]
    fn test_reset_level_powerup_resets_on_expiry() {
        let mut c = playing_controller();

        c.try_move(Direction::Right);
        c.on_powerup_target(PowerupKind::ResetLevel);

        let mut saw_reset = false;
        for _ in 0..=PowerupKind::ResetLevel.duration_ticks() + 1 {
            if c.tick().contains(&GameEvent::RoundReset { round: 1 }) {
                saw_reset = true;
            }
        }
        assert!(saw_reset);
        assert_eq!(c.grid().players[0].pos, Coord::new(0, 0));
    }

    #[test]
    fn test_match_end_cutscene_returns_to_idle() {
        let mut c = playing_controller();

        let events = c.on_lose();
        assert_eq!(
            events,
            vec![GameEvent::MatchEnded {
                outcome: MatchOutcome::Defeat
            }]
        );
        assert!(!c.movement_allowed());
        assert_eq!(c.phase(), RoundPhase::Lost);

        for _ in 0..crate::CUTSCENE_TICKS {
            c.tick();
        }
        assert_eq!(c.phase(), RoundPhase::Idle);
        assert!(c.grid().is_empty());
    }

    #[test]
    fn test_forfeit_counts_as_victory() {
        let mut c = playing_controller();
        let events = c.on_forfeit();
        assert_eq!(
            events,
            vec![GameEvent::MatchEnded {
                outcome: MatchOutcome::OpponentForfeit
            }]
        );
        assert_eq!(c.phase(), RoundPhase::Won);
    }

    #[test]
    fn test_stats_mirror_server_messages() {
        let mut c = RoundController::new();
        c.on_room_assigned([2; 16]);
        c.on_config(3, 2, 1, 600, 6);
        c.on_new_level(simple_level());
        c.on_progress(100, 200);

        let stats = c.stats();
        assert_eq!(stats.level_count, 6);
        assert_eq!(stats.easy_count, 3);
        assert_eq!(stats.current_level, 1);
        assert_eq!(stats.difficulty, "easy");
        assert_eq!((stats.you, stats.enemy), (100, 200));
    }

    #[test]
    fn test_new_level_supersedes_previous_round() {
        let mut c = playing_controller();
        c.try_move(Direction::Right);

        c.on_new_level(level(&[(1, 7, 7, "player"), (2, 8, 7, "goal")]));
        assert_eq!(c.grid().players.len(), 1);
        assert_eq!(c.grid().players[0].pos, Coord::new(7, 7));
        assert_eq!(c.stats().current_level, 2);
    }

    #[test]
    fn test_random_soak_never_breaks_invariants() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut c = RoundController::new();
        c.on_room_assigned([3; 16]);
        c.on_new_level(level(&[
            (1, 0, 0, "player"),
            (2, 3, 1, "player"),
            (3, 1, 0, "block"),
            (4, 2, 2, "block"),
            (5, 5, 5, "goal"),
        ]));

        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..2000 {
            let dir = Direction::ALL[rng.gen_range(0..4)];
            c.try_move(dir);
            c.tick();
            for p in &c.grid().players {
                assert!(!c.grid().block_at(p.pos));
            }
        }
    }
}
