//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (column index, then stack index; tasks in registration order)
//! - No rendering or platform dependencies

pub mod block;
pub mod bomb;
pub mod collision;
pub mod column;
pub mod coord;
pub mod detonation;
pub mod grid;
pub mod player;
pub mod rain;
pub mod slide;
pub mod state;
pub mod task;
pub mod tick;

pub use block::{Block, BlockColor, BlockId, BlockKind, Motion};
pub use bomb::{Fuse, FusePhase, FuseSignal};
pub use collision::{Aabb, Overlap, is_open, overlap_box};
pub use column::Column;
pub use coord::{Direction, GridCoord, Row, Team};
pub use detonation::{BlastReport, detonate};
pub use grid::GridManager;
pub use player::{Player, PlayerAction, PlayerId};
pub use rain::{RainGenerator, Spawned};
pub use slide::{SlideOutcome, SlideTask};
pub use state::{ArenaEvent, ArenaState};
pub use task::{Scheduler, Task, TaskStatus};
pub use tick::{TickInput, tick};
