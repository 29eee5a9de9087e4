//! Players
//!
//! A player lives in its team's row, faces a cardinal direction and pushes
//! or pulls the block in front of it. Blasts knock players back with an
//! impulse that decays through linear drag; gravity pulls unsupported
//! players down until they land on a block or the floor support.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::coord::{Direction, Team};
use crate::consts::{BLOCK_HALF_EXTENT, PLAYER_DRAG};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Player actions for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Walk along the row; `dx` is -1.0 (left) to 1.0 (right)
    Move { dx: f32 },
    Turn(Direction),
    /// Upward impulse, only from the ground
    Jump,
    Push,
    Pull,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub team: Team,
    pub position: Vec3,
    pub velocity: Vec3,
    pub facing: Direction,
    /// Seconds until the next push/pull is allowed
    pub action_cooldown: f32,
}

impl Player {
    pub fn new(id: PlayerId, team: Team, position: Vec3) -> Self {
        Self {
            id,
            team,
            position,
            velocity: Vec3::ZERO,
            facing: Direction::default(),
            action_cooldown: 0.0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.position, Vec3::splat(BLOCK_HALF_EXTENT))
    }

    pub fn can_act(&self) -> bool {
        self.action_cooldown <= 0.0
    }

    pub fn start_cooldown(&mut self, seconds: f32) {
        self.action_cooldown = seconds;
    }

    /// Face a direction. Returns false if already facing it.
    pub fn turn(&mut self, direction: Direction) -> bool {
        if self.facing == direction {
            return false;
        }
        self.facing = direction;
        true
    }

    /// Cell centre directly in front of the player, `cells` steps away
    pub fn ahead(&self, cells: f32) -> Vec3 {
        self.position + self.facing.to_vec3() * cells
    }

    /// Orientation back to default
    pub fn reset_orientation(&mut self) {
        self.facing = Direction::default();
    }

    /// Instantaneous velocity change (unit mass)
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse;
    }

    /// Leave the ground with `speed` upward
    pub fn jump(&mut self, speed: f32) {
        self.apply_impulse(Vec3::Y * speed);
    }

    /// Rising or falling
    pub fn is_airborne(&self) -> bool {
        self.velocity.y != 0.0
    }

    /// Integrate velocity and count down the action cooldown. `supported` is
    /// true when something solid is directly under the player's feet.
    pub fn integrate(&mut self, dt: f32, gravity: f32, supported: bool) {
        if self.action_cooldown > 0.0 {
            self.action_cooldown = (self.action_cooldown - dt).max(0.0);
        }

        if supported && self.velocity.y <= 0.0 {
            self.velocity.y = 0.0;
        } else {
            self.velocity.y -= gravity * dt;
        }
        if self.velocity == Vec3::ZERO {
            return;
        }
        self.position += self.velocity * dt;

        // Drag only acts on knock-back
        let drag = (1.0 - PLAYER_DRAG * dt).max(0.0);
        self.velocity.x *= drag;
        self.velocity.z *= drag;
        if self.velocity.x * self.velocity.x + self.velocity.z * self.velocity.z < 1e-4 {
            self.velocity.x = 0.0;
            self.velocity.z = 0.0;
        }
    }

    /// Stop a fall standing at height `y`
    pub fn land(&mut self, y: f32) {
        self.position.y = y;
        self.velocity.y = 0.0;
    }

    pub fn respawn(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.reset_orientation();
        self.action_cooldown = 0.0;
    }
}
