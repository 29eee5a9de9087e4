//! Slide resolver
//!
//! Moves one block a single cell in a cardinal direction. The block is
//! detached from its column when the slide starts and owned by the task
//! until it completes, so no column query can see it mid-flight.

use glam::Vec3;

use super::block::{Block, BlockId};
use super::coord::{Direction, GridCoord};
use super::grid::GridManager;
use super::task::TaskStatus;
use crate::error::GridError;
use crate::{lerp, round_to_grid};

#[derive(Debug, Clone)]
pub struct SlideTask {
    block: Block,
    origin: Vec3,
    direction: Direction,
    source: GridCoord,
    destination: Option<GridCoord>,
    elapsed: f32,
    duration: f32,
}

/// How a slide ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlideOutcome {
    /// Re-parented into the destination column
    Landed {
        id: BlockId,
        coord: GridCoord,
        /// A bomb was armed by this slide
        armed: bool,
    },
    /// Pushed off the edge of the grid, out of play
    Lost { id: BlockId },
}

impl SlideTask {
    /// Detach the block at `position` and begin sliding it.
    pub fn start(
        grid: &mut GridManager,
        position: Vec3,
        direction: Direction,
        duration: f32,
    ) -> Result<Self, GridError> {
        let source = GridCoord::from_position(position);
        let target = source.step(direction);
        let destination = grid.column_at(target).map(|c| c.coord());
        let block = grid.remove(source, position)?;

        log::debug!(
            "slide {} from {} toward {:?} (destination {:?})",
            block.id,
            source,
            direction,
            destination
        );

        Ok(Self {
            origin: block.position,
            block,
            direction,
            source,
            destination,
            elapsed: 0.0,
            duration,
        })
    }

    pub fn id(&self) -> BlockId {
        self.block.id
    }

    pub fn source(&self) -> GridCoord {
        self.source
    }

    pub fn destination(&self) -> Option<GridCoord> {
        self.destination
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current (interpolated) position
    pub fn position(&self) -> Vec3 {
        self.block.position
    }

    fn target(&self) -> Vec3 {
        self.origin + self.direction.to_vec3()
    }

    /// Interpolate toward the neighbouring cell
    pub fn advance(&mut self, dt: f32) -> TaskStatus {
        self.elapsed += dt;
        if self.elapsed <= self.duration {
            self.block.position = lerp(self.origin, self.target(), self.elapsed / self.duration);
            TaskStatus::Running
        } else {
            TaskStatus::Done
        }
    }

    /// Snap to the grid and hand the block to its destination column
    pub fn complete(self, grid: &mut GridManager) -> SlideOutcome {
        let target = self.target();
        let mut block = self.block;
        block.position = round_to_grid(target);
        let id = block.id;

        let Some(coord) = self.destination else {
            log::debug!("block {} slid off the grid at {}", id, block.position);
            return SlideOutcome::Lost { id };
        };

        let armed = block.set_bomb_active();
        if armed {
            log::info!("bomb {} armed at {}", id, coord);
        }

        match grid.add(block, coord) {
            Ok(()) => SlideOutcome::Landed { id, coord, armed },
            Err(err) => {
                log::error!("slide of {} could not land: {err}", id);
                SlideOutcome::Lost { id }
            }
        }
    }
}
