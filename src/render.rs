//! Presentation Layer
//!
//! Read-only bridge between the deterministic grid and whatever draws
//! it. The game layer is float-free on purpose; every conversion from
//! ticks to angles and intensities happens here, so two clients with
//! equal grids always hash equal even if their frames differ.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::game::entity::EntityId;
use crate::game::grid::GridModel;
use crate::game::powerup::{PowerupKind, PowerupState};
use crate::TICK_RATE;

/// Camera orbit speed while `camera_rotation` is active, radians/second.
pub const ROTATION_RATE: f64 = PI / 3.0;

/// Phase speed of the `dark_screen` lighting wave, radians/second.
pub const DARKNESS_RATE: f64 = PI / 2.5;

/// Sharpness of the darkness pulse: high odd power keeps the screen lit
/// most of the wave and snaps it dark near the peak.
const DARKNESS_EXPONENT: i32 = 31;

/// Opaque handle to a renderer-side object (mesh, sprite, node id).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

/// Maps logical entities to renderer-side objects.
///
/// The builder tears entities down wholesale; a renderer keeps this
/// table beside the grid and drops the handles `clear` returns.
#[derive(Debug, Default)]
pub struct PresentationTable {
    bindings: HashMap<EntityId, RenderHandle>,
}

impl PresentationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate an entity with a renderer object.
    ///
    /// Returns the previous handle if the entity was already bound.
    pub fn bind(&mut self, entity: EntityId, handle: RenderHandle) -> Option<RenderHandle> {
        self.bindings.insert(entity, handle)
    }

    /// Remove one entity's binding.
    pub fn unbind(&mut self, entity: EntityId) -> Option<RenderHandle> {
        self.bindings.remove(&entity)
    }

    /// Look up an entity's renderer object.
    pub fn handle_for(&self, entity: EntityId) -> Option<RenderHandle> {
        self.bindings.get(&entity).copied()
    }

    /// Drop every binding, returning the orphaned handles for disposal.
    pub fn clear(&mut self) -> Vec<RenderHandle> {
        self.bindings.drain().map(|(_, handle)| handle).collect()
    }

    /// Number of live bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// One drawable tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileView {
    /// Logical entity behind this tile.
    pub entity: EntityId,
    /// Grid x, in cells.
    pub x: i32,
    /// Grid z, in cells.
    pub z: i32,
    /// Whether the tile should be drawn at all.
    pub visible: bool,
    /// Draw with the plain floor skin instead of the goal skin.
    pub as_floor: bool,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, Default)]
pub struct FrameView {
    /// Floor tiles, holes already hidden.
    pub floors: Vec<TileView>,
    /// Block tiles.
    pub blocks: Vec<TileView>,
    /// Player tiles, invisibility applied.
    pub players: Vec<TileView>,
    /// Goal tiles, reskin applied.
    pub goals: Vec<TileView>,
    /// Accumulated camera orbit angle, radians.
    pub camera_rotation: f64,
    /// Whether the camera should jitter this frame.
    pub shake: bool,
    /// Scene light intensity in `[0, 1]`.
    pub light_intensity: f64,
}

impl FrameView {
    /// Snapshot the grid and modifier state for drawing.
    pub fn capture(grid: &GridModel, powerups: &PowerupState) -> Self {
        let floors = grid
            .floors
            .iter()
            .map(|f| TileView {
                entity: f.id,
                x: f.pos.x,
                z: f.pos.z,
                visible: f.visible,
                as_floor: false,
            })
            .collect();
        let blocks = grid
            .blocks
            .iter()
            .map(|b| TileView {
                entity: b.id,
                x: b.pos.x,
                z: b.pos.z,
                visible: true,
                as_floor: false,
            })
            .collect();
        let players = grid
            .players
            .iter()
            .map(|p| TileView {
                entity: p.id,
                x: p.pos.x,
                z: p.pos.z,
                visible: p.visible,
                as_floor: false,
            })
            .collect();
        let goals = grid
            .goals
            .iter()
            .map(|g| TileView {
                entity: g.id,
                x: g.pos.x,
                z: g.pos.z,
                visible: true,
                as_floor: g.floor_skin,
            })
            .collect();

        Self {
            floors,
            blocks,
            players,
            goals,
            camera_rotation: rotation_angle(powerups.rotation_ticks()),
            shake: powerups.is_active(PowerupKind::CameraShake),
            light_intensity: light_intensity(powerups.dark_ticks()),
        }
    }
}

/// Camera orbit angle after `ticks` of active rotation.
pub fn rotation_angle(ticks: u32) -> f64 {
    f64::from(ticks) / f64::from(TICK_RATE) * ROTATION_RATE
}

/// Scene light intensity after `ticks` of active darkness.
///
/// The negative half-wave is clamped out so light never overshoots 1.
pub fn light_intensity(ticks: u32) -> f64 {
    let phase = f64::from(ticks) / f64::from(TICK_RATE) * DARKNESS_RATE;
    let darkness = phase.sin().max(0.0).powi(DARKNESS_EXPONENT);
    1.0 - darkness
}
