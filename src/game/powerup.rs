//! Rule Modifier Layer (Powerups)
//!
//! Named toggles the opponent inflicts via `powerup_target`. Each
//! modifier is a boolean flag plus a previous-tick shadow flag used to
//! detect 0→1 and 1→0 edges: one-time side effects (punching holes,
//! reskinning goals, hiding players) fire exactly once per transition,
//! never per tick while the flag stays constant.
//!
//! Continuous modifiers (`camera_rotation`, `dark_screen`) accumulate
//! whole ticks while active; the presentation layer converts ticks to
//! angles and intensities so this module stays float-free.

use serde::{Deserialize, Serialize};

use crate::core::rng::DeterministicRng;
use crate::game::grid::GridModel;

/// Probability, in permille, that `random_holes` opens a given floor.
pub const HOLE_CHANCE_PERMILLE: u32 = 150;

/// The rule modifiers a player can be targeted with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PowerupKind {
    /// Movement directions swapped pairwise
    InvertedKeyboard = 0,
    /// Random floors become holes
    RandomHoles = 1,
    /// Goals disguised as ordinary floor (win semantics untouched)
    SwitchGoalToFloor = 2,
    /// Player avatars hidden
    InvisiblePlayer = 3,
    /// Camera orbits the board while active
    CameraRotation = 4,
    /// Camera jitters while active
    CameraShake = 5,
    /// Lighting ramps dark while active
    DarkScreen = 6,
    /// Full round reset, fired when the modifier expires
    ResetLevel = 7,
}

impl PowerupKind {
    /// All modifiers, in flag-index order.
    pub const ALL: [PowerupKind; 8] = [
        PowerupKind::InvertedKeyboard,
        PowerupKind::RandomHoles,
        PowerupKind::SwitchGoalToFloor,
        PowerupKind::InvisiblePlayer,
        PowerupKind::CameraRotation,
        PowerupKind::CameraShake,
        PowerupKind::DarkScreen,
        PowerupKind::ResetLevel,
    ];

    /// How long the modifier stays active once targeted.
    pub fn duration_ticks(self) -> u32 {
        match self {
            PowerupKind::InvertedKeyboard => 600,
            PowerupKind::RandomHoles => 600,
            PowerupKind::SwitchGoalToFloor => 600,
            PowerupKind::InvisiblePlayer => 480,
            PowerupKind::CameraRotation => 600,
            PowerupKind::CameraShake => 360,
            PowerupKind::DarkScreen => 480,
            // Short fuse: the reset fires on the expiry edge.
            PowerupKind::ResetLevel => 60,
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Edge transitions observed during one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PowerupTick {
    /// Modifiers that crossed 0→1 this tick
    pub activated: Vec<PowerupKind>,
    /// Modifiers that crossed 1→0 this tick
    pub deactivated: Vec<PowerupKind>,
    /// True when `reset_level` expired this tick; the round controller
    /// must perform a full round reset
    pub reset_requested: bool,
}

/// All rule modifier state for one round.
#[derive(Clone, Debug)]
pub struct PowerupState {
    active: [bool; 8],
    was_active: [bool; 8],
    /// Ticks `camera_rotation` has been active; 0 while inactive
    rotation_ticks: u32,
    /// Ticks `dark_screen` has been active; 0 while inactive
    dark_ticks: u32,
    rng: DeterministicRng,
}

impl PowerupState {
    /// Create modifier state for a round, seeded for hole placement.
    pub fn new(seed: u64) -> Self {
        Self {
            active: [false; 8],
            was_active: [false; 8],
            rotation_ticks: 0,
            dark_ticks: 0,
            rng: DeterministicRng::new(seed),
        }
    }

    /// Is `kind` currently active?
    pub fn is_active(&self, kind: PowerupKind) -> bool {
        self.active[kind.index()]
    }

    /// Set a modifier's active flag.
    ///
    /// Side effects do not fire here; they fire on the next [`tick`](Self::tick)
    /// when the edge is observed. Setting the same value twice is a no-op.
    pub fn set_active(&mut self, kind: PowerupKind, active: bool) {
        self.active[kind.index()] = active;
    }

    /// Ticks `camera_rotation` has been accumulating.
    pub fn rotation_ticks(&self) -> u32 {
        self.rotation_ticks
    }

    /// Ticks `dark_screen` has been accumulating.
    pub fn dark_ticks(&self) -> u32 {
        self.dark_ticks
    }

    /// Clear every flag, shadow, and accumulator, and reseed.
    ///
    /// Grid-side effects are not reverted here: the round controller
    /// resets modifiers only together with a grid rebuild.
    pub fn reset(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Run one simulation step: fire edge side effects, advance
    /// accumulators.
    pub fn tick(&mut self, grid: &mut GridModel) -> PowerupTick {
        let mut out = PowerupTick::default();

        for kind in PowerupKind::ALL {
            let now = self.active[kind.index()];
            let before = self.was_active[kind.index()];

            if now && !before {
                self.on_activate(kind, grid);
                out.activated.push(kind);
            } else if !now && before {
                self.on_deactivate(kind, grid, &mut out);
                out.deactivated.push(kind);
            }

            self.was_active[kind.index()] = now;
        }

        // Time-based accumulators, not edge-triggered.
        if self.active[PowerupKind::CameraRotation.index()] {
            self.rotation_ticks += 1;
        } else {
            self.rotation_ticks = 0;
        }
        if self.active[PowerupKind::DarkScreen.index()] {
            self.dark_ticks += 1;
        } else {
            self.dark_ticks = 0;
        }

        out
    }

    fn on_activate(&mut self, kind: PowerupKind, grid: &mut GridModel) {
        match kind {
            PowerupKind::RandomHoles => {
                for floor in &mut grid.floors {
                    if self.rng.chance(HOLE_CHANCE_PERMILLE) {
                        floor.solid = false;
                        floor.visible = false;
                    }
                }
            }
            PowerupKind::SwitchGoalToFloor => {
                for goal in &mut grid.goals {
                    goal.floor_skin = true;
                }
            }
            PowerupKind::InvisiblePlayer => {
                for player in &mut grid.players {
                    player.visible = false;
                }
            }
            // Flag- or accumulator-only modifiers; consumed elsewhere.
            PowerupKind::InvertedKeyboard
            | PowerupKind::CameraRotation
            | PowerupKind::CameraShake
            | PowerupKind::DarkScreen
            | PowerupKind::ResetLevel => {}
        }
    }

    fn on_deactivate(&mut self, kind: PowerupKind, grid: &mut GridModel, out: &mut PowerupTick) {
        match kind {
            PowerupKind::RandomHoles => {
                for floor in &mut grid.floors {
                    floor.solid = true;
                    floor.visible = true;
                }
            }
            PowerupKind::SwitchGoalToFloor => {
                for goal in &mut grid.goals {
                    goal.floor_skin = false;
                }
            }
            PowerupKind::InvisiblePlayer => {
                for player in &mut grid.players {
                    player.visible = true;
                }
            }
            PowerupKind::ResetLevel => {
                out.reset_requested = true;
            }
            PowerupKind::InvertedKeyboard
            | PowerupKind::CameraRotation
            | PowerupKind::CameraShake
            | PowerupKind::DarkScreen => {}
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coord::Coord;
    use crate::game::entity::{FloorTile, GoalTile, PlayerTile};

    fn grid_with_floors(n: usize) -> GridModel {
        let mut grid = GridModel::new();
        for i in 0..n {
            let id = grid.alloc_id();
            grid.floors.push(FloorTile::new(id, Coord::new(i as i32, 0)));
        }
        grid
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&PowerupKind::InvertedKeyboard).unwrap();
        assert_eq!(json, "\"inverted_keyboard\"");
        let parsed: PowerupKind = serde_json::from_str("\"switch_goal_to_floor\"").unwrap();
        assert_eq!(parsed, PowerupKind::SwitchGoalToFloor);
        assert!(serde_json::from_str::<PowerupKind>("\"mystery\"").is_err());
    }

    #[test]
    fn test_edge_fires_exactly_once_while_flag_constant() {
        let mut state = PowerupState::new(1);
        let mut grid = grid_with_floors(100);

        state.set_active(PowerupKind::RandomHoles, true);
        let first = state.tick(&mut grid);
        assert_eq!(first.activated, vec![PowerupKind::RandomHoles]);

        // Flag unchanged across many ticks: nothing re-fires.
        let holes_after_first = grid.floors.iter().filter(|f| !f.solid).count();
        for _ in 0..10 {
            let t = state.tick(&mut grid);
            assert!(t.activated.is_empty() && t.deactivated.is_empty());
        }
        assert_eq!(
            grid.floors.iter().filter(|f| !f.solid).count(),
            holes_after_first
        );
    }

    #[test]
    fn test_double_toggle_fires_two_of_each() {
        // active→inactive→active→inactive: exactly two activate and two
        // restore effects, never more.
        let mut state = PowerupState::new(7);
        let mut grid = grid_with_floors(200);
        let mut activations = 0;
        let mut restores = 0;

        for _ in 0..2 {
            state.set_active(PowerupKind::RandomHoles, true);
            let t = state.tick(&mut grid);
            activations += t.activated.len();

            state.set_active(PowerupKind::RandomHoles, false);
            let t = state.tick(&mut grid);
            restores += t.deactivated.len();

            // Restore really restores.
            assert!(grid.floors.iter().all(|f| f.solid && f.visible));
        }

        assert_eq!(activations, 2);
        assert_eq!(restores, 2);
    }

    #[test]
    fn test_random_holes_probability_and_determinism() {
        let punch = |seed: u64| {
            let mut state = PowerupState::new(seed);
            let mut grid = grid_with_floors(1000);
            state.set_active(PowerupKind::RandomHoles, true);
            state.tick(&mut grid);
            grid.floors
                .iter()
                .map(|f| f.solid)
                .collect::<Vec<_>>()
        };

        // Mirrored clients with the same round seed punch identical holes.
        assert_eq!(punch(42), punch(42));
        assert_ne!(punch(42), punch(43));

        // Roughly 15% of floors open.
        let holes = punch(42).iter().filter(|&&solid| !solid).count();
        assert!((75..250).contains(&holes), "holes = {}", holes);
    }

    #[test]
    fn test_goal_reskin_is_presentational_only() {
        let mut state = PowerupState::new(0);
        let mut grid = GridModel::new();
        let id = grid.alloc_id();
        grid.goals.push(GoalTile::new(id, Coord::new(0, 0)));
        let id = grid.alloc_id();
        grid.players.push(PlayerTile::new(id, Coord::new(0, 0)));

        state.set_active(PowerupKind::SwitchGoalToFloor, true);
        state.tick(&mut grid);
        assert!(grid.goals[0].floor_skin);

        // Still a goal for win detection.
        assert!(crate::game::win::has_won(&grid));

        state.set_active(PowerupKind::SwitchGoalToFloor, false);
        state.tick(&mut grid);
        assert!(!grid.goals[0].floor_skin);
    }

    #[test]
    fn test_invisible_player_round_trip() {
        let mut state = PowerupState::new(0);
        let mut grid = GridModel::new();
        let id = grid.alloc_id();
        grid.players.push(PlayerTile::new(id, Coord::new(0, 0)));

        state.set_active(PowerupKind::InvisiblePlayer, true);
        state.tick(&mut grid);
        assert!(!grid.players[0].visible);

        state.set_active(PowerupKind::InvisiblePlayer, false);
        state.tick(&mut grid);
        assert!(grid.players[0].visible);
    }

    #[test]
    fn test_accumulators_run_while_active_and_reset() {
        let mut state = PowerupState::new(0);
        let mut grid = GridModel::new();

        state.set_active(PowerupKind::CameraRotation, true);
        state.set_active(PowerupKind::DarkScreen, true);
        for _ in 0..30 {
            state.tick(&mut grid);
        }
        assert_eq!(state.rotation_ticks(), 30);
        assert_eq!(state.dark_ticks(), 30);

        state.set_active(PowerupKind::CameraRotation, false);
        state.tick(&mut grid);
        assert_eq!(state.rotation_ticks(), 0);
        // dark_screen still running
        assert_eq!(state.dark_ticks(), 31);

        state.set_active(PowerupKind::DarkScreen, false);
        state.tick(&mut grid);
        assert_eq!(state.dark_ticks(), 0);
    }

    #[test]
    fn test_reset_level_fires_on_expiry_edge_only() {
        let mut state = PowerupState::new(0);
        let mut grid = GridModel::new();

        state.set_active(PowerupKind::ResetLevel, true);
        let t = state.tick(&mut grid);
        assert!(!t.reset_requested);

        // Stays armed while active.
        assert!(!state.tick(&mut grid).reset_requested);

        state.set_active(PowerupKind::ResetLevel, false);
        assert!(state.tick(&mut grid).reset_requested);

        // Only on the edge.
        assert!(!state.tick(&mut grid).reset_requested);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = PowerupState::new(5);
        let mut grid = grid_with_floors(10);

        state.set_active(PowerupKind::CameraRotation, true);
        state.set_active(PowerupKind::InvertedKeyboard, true);
        state.tick(&mut grid);

        state.reset(6);
        assert!(!state.is_active(PowerupKind::CameraRotation));
        assert!(!state.is_active(PowerupKind::InvertedKeyboard));
        assert_eq!(state.rotation_ticks(), 0);

        // Post-reset, re-activating is a fresh 0→1 edge.
        state.set_active(PowerupKind::InvertedKeyboard, true);
        let t = state.tick(&mut grid);
        assert_eq!(t.activated, vec![PowerupKind::InvertedKeyboard]);
    }
}
