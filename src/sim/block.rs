//! Block entities
//!
//! A block is owned by value: by exactly one `Column`, by a slide task while
//! in flight, or by nobody once destroyed.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::bomb::{Fuse, FuseSignal};
use super::coord::Row;
use crate::consts::BLOCKED_FLASH_DURATION;

/// Unique block identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Block types
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BlockKind {
    #[default]
    Standard,
    /// Can never be pushed or pulled
    Immovable,
    Bomb(Fuse),
}

/// Display colours (the host maps these to materials)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockColor {
    #[default]
    Neutral,
    Blue,
    Purple,
    Locked,
    Tick,
}

impl BlockColor {
    /// Base colour of a column in the given row
    pub fn for_row(row: Option<Row>) -> Self {
        match row {
            Some(Row::Blue) => BlockColor::Blue,
            Some(Row::Purple) => BlockColor::Purple,
            Some(Row::Wall) | None => BlockColor::Neutral,
        }
    }
}

/// Vertical motion state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Motion {
    #[default]
    Resting,
    /// Hanging at spawn height until the delay runs out
    Pending { delay: f32 },
    Falling,
}

/// A single block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub position: Vec3,
    pub motion: Motion,
    /// Vertical velocity (negative while falling)
    pub vertical_velocity: f32,
    /// Locked blocks refuse pushes and pulls
    pub locked: bool,
    pub base_color: BlockColor,
    /// Remaining time of the "blocked" flash
    #[serde(default)]
    pub blocked_timer: f32,
}

impl Block {
    pub fn new(id: BlockId, kind: BlockKind, position: Vec3) -> Self {
        Self {
            id,
            kind,
            position,
            motion: Motion::Resting,
            vertical_velocity: 0.0,
            locked: matches!(kind, BlockKind::Immovable),
            base_color: BlockColor::Neutral,
            blocked_timer: 0.0,
        }
    }

    pub fn is_bomb(&self) -> bool {
        matches!(self.kind, BlockKind::Bomb(_))
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Bomb fuse, if this block is a bomb
    pub fn fuse(&self) -> Option<&Fuse> {
        match &self.kind {
            BlockKind::Bomb(fuse) => Some(fuse),
            _ => None,
        }
    }

    pub fn fuse_mut(&mut self) -> Option<&mut Fuse> {
        match &mut self.kind {
            BlockKind::Bomb(fuse) => Some(fuse),
            _ => None,
        }
    }

    /// Arm a bomb's countdown. No-op for other blocks.
    pub fn set_bomb_active(&mut self) -> bool {
        self.fuse_mut().is_some_and(Fuse::arm)
    }

    /// Vertical velocity is zero
    pub fn is_at_rest(&self) -> bool {
        self.vertical_velocity == 0.0 && !matches!(self.motion, Motion::Falling)
    }

    /// Colour to display right now
    pub fn color(&self) -> BlockColor {
        if self.blocked_timer > 0.0 {
            return BlockColor::Locked;
        }
        if let Some(color) = self.fuse().and_then(Fuse::color) {
            return color;
        }
        if self.locked {
            BlockColor::Locked
        } else {
            self.base_color
        }
    }

    pub fn make_fall_immediately(&mut self) {
        self.motion = Motion::Falling;
    }

    pub fn make_fall_after_delay(&mut self, delay: f32) {
        self.motion = Motion::Pending { delay };
        self.vertical_velocity = 0.0;
    }

    /// Flash to show a refused push
    pub fn animate_blocked(&mut self) {
        self.blocked_timer = BLOCKED_FLASH_DURATION;
    }

    /// Advance motion and fuse by one frame. `rest_height` is the height of
    /// the block's stack slot.
    pub fn advance(&mut self, dt: f32, rest_height: f32, gravity: f32) -> Option<FuseSignal> {
        if self.blocked_timer > 0.0 {
            self.blocked_timer = (self.blocked_timer - dt).max(0.0);
        }

        match self.motion {
            Motion::Pending { delay } => {
                let delay = delay - dt;
                self.motion = if delay <= 0.0 {
                    Motion::Falling
                } else {
                    Motion::Pending { delay }
                };
            }
            Motion::Falling => self.fall(dt, rest_height, gravity),
            Motion::Resting => {
                if self.position.y > rest_height {
                    // Support below was removed
                    self.motion = Motion::Falling;
                    self.fall(dt, rest_height, gravity);
                } else if self.position.y < rest_height {
                    log::debug!(
                        "block {} below its slot ({} < {}), snapping up",
                        self.id,
                        self.position.y,
                        rest_height
                    );
                    self.position.y = rest_height;
                }
            }
        }

        let at_rest = self.is_at_rest();
        self.fuse_mut().and_then(|fuse| fuse.advance(dt, at_rest))
    }

    fn fall(&mut self, dt: f32, rest_height: f32, gravity: f32) {
        self.vertical_velocity -= gravity * dt;
        self.position.y += self.vertical_velocity * dt;
        if self.position.y <= rest_height {
            self.position.y = rest_height;
            self.vertical_velocity = 0.0;
            self.motion = Motion::Resting;
        }
    }
}
