//! Block Arena - a grid-based block-pushing arena game
//!
//! Core modules:
//! - `sim`: Fixed-step simulation (columns, slides, bombs, block rain, players)
//! - `settings`: Data-driven arena tuning loaded from JSON
//! - `error`: Error types shared by the grid and settings layers

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{GridError, SettingsError};
pub use settings::ArenaSettings;

use glam::{IVec3, Vec3};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions (columns along x, rows along z)
    pub const WIDTH: i32 = 10;
    pub const DEPTH: i32 = 3;

    /// Row z-indices
    pub const BLUE_TEAM_Z_INDEX: i32 = 0;
    pub const WALL_Z_INDEX: i32 = 1;
    pub const PURPLE_TEAM_Z_INDEX: i32 = 2;

    /// Time for a block to slide one cell (seconds)
    pub const SLIDE_BLOCK_DURATION: f32 = 0.25;
    /// Delay before a freshly spawned block starts to fall
    pub const FALL_DELAY: f32 = 0.3;
    /// Rain cooldown bounds (seconds)
    pub const SPAWN_MIN_DELAY: f32 = 1.0;
    pub const SPAWN_MAX_DELAY: f32 = 2.0;
    /// Height at which rain blocks appear
    pub const SPAWN_HEIGHT: f32 = 8.0;

    /// Bomb countdown cycles before the blast
    pub const BOMB_TICKS: u32 = 5;
    /// Blast box half-extents (2x2x2 box around the bomb)
    pub const BLAST_HALF_EXTENT: f32 = 1.0;
    /// Force pushing players out of a blast, applied over one fixed step
    pub const KNOCKBACK_FORCE: f32 = 100.0;

    /// Blocks are unit cubes
    pub const BLOCK_HALF_EXTENT: f32 = 0.5;
    /// Height of the lowest stack slot; the floor support sits below it
    pub const BASE_HEIGHT: f32 = 0.0;
    /// Gravity (units/s²)
    pub const GRAVITY: f32 = 9.81;
    /// Duration of the "blocked" flash when a push is refused
    pub const BLOCKED_FLASH_DURATION: f32 = 0.2;

    /// Player tuning
    pub const PLAYER_SPEED: f32 = 4.0;
    pub const PLAYER_DRAG: f32 = 4.0;
    pub const PUSH_DELAY: f32 = 0.1;
    /// Upward speed of a jump (also used by the pull hop)
    pub const JUMP_SPEED: f32 = 5.0;
    pub const CAST_RADIUS: f32 = 0.2;
    pub const GROUND_CHECK: f32 = 0.5;
}

/// Round a world position to the nearest integer grid point
#[inline]
pub fn round_to_grid(pos: Vec3) -> Vec3 {
    pos.round()
}

/// Integer cell of a world position (nearest grid point)
#[inline]
pub fn cell_of(pos: Vec3) -> IVec3 {
    pos.round().as_ivec3()
}

/// Linear interpolation between two points, `t` clamped to [0, 1]
#[inline]
pub fn lerp(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from.lerp(to, t.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_of_rounds_to_nearest() {
        assert_eq!(cell_of(Vec3::new(2.4, 0.6, -0.4)), IVec3::new(2, 1, 0));
        assert_eq!(cell_of(Vec3::new(-0.6, 3.0, 1.49)), IVec3::new(-1, 3, 1));
    }

    #[test]
    fn test_lerp_clamps() {
        let a = Vec3::ZERO;
        let b = Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(lerp(a, b, 2.0), b);
        assert_eq!(lerp(a, b, -1.0), a);
        assert!((lerp(a, b, 0.5).z - 0.5).abs() < 1e-6);
    }
}
