//! Grid manager
//!
//! Owns the Width x Depth array of columns. Constructed once per arena and
//! passed by reference to everything that needs it; columns are created in
//! `new` and never replaced.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::block::{Block, BlockId, BlockKind};
use super::bomb::FuseSignal;
use super::column::Column;
use super::coord::{GridCoord, Team};
use crate::consts::{BASE_HEIGHT, DEPTH};
use crate::error::GridError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridManager {
    width: i32,
    /// Column-major: index = x * DEPTH + z
    columns: Vec<Column>,
    next_block_id: u32,
}

impl GridManager {
    /// Create an empty grid `width` columns wide
    pub fn new(width: i32) -> Self {
        let width = width.max(1);
        let mut columns = Vec::with_capacity((width * DEPTH) as usize);
        for x in 0..width {
            for z in 0..DEPTH {
                columns.push(Column::new(GridCoord::new(x, z)));
            }
        }
        log::debug!("Created {}x{} block grid", width, DEPTH);
        Self {
            width,
            columns,
            next_block_id: 1,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn depth(&self) -> i32 {
        DEPTH
    }

    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        (0..self.width).contains(&coord.x) && (0..DEPTH).contains(&coord.z)
    }

    fn index(&self, coord: GridCoord) -> Option<usize> {
        self.in_bounds(coord)
            .then(|| (coord.x * DEPTH + coord.z) as usize)
    }

    /// Column at a grid coordinate; `None` outside the arena
    pub fn column_at(&self, coord: GridCoord) -> Option<&Column> {
        self.index(coord).map(|i| &self.columns[i])
    }

    pub(crate) fn column_at_mut(&mut self, coord: GridCoord) -> Option<&mut Column> {
        self.index(coord).map(move |i| &mut self.columns[i])
    }

    /// Column containing a world position
    pub fn column_at_position(&self, position: Vec3) -> Option<&Column> {
        self.column_at(GridCoord::from_position(position))
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Columns of one row in increasing x
    pub fn row(&self, z: i32) -> impl Iterator<Item = &Column> {
        (0..self.width).filter_map(move |x| self.column_at(GridCoord::new(x, z)))
    }

    /// Total number of blocks owned by columns
    pub fn block_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Column currently owning the block
    pub fn owner_of(&self, id: BlockId) -> Option<GridCoord> {
        self.columns
            .iter()
            .find(|c| c.contains(id))
            .map(Column::coord)
    }

    /// Find a block anywhere in the grid
    pub fn locate(&self, id: BlockId) -> Option<(GridCoord, &Block)> {
        self.columns.iter().find_map(|c| {
            c.blocks()
                .iter()
                .find(|b| b.id == id)
                .map(|b| (c.coord(), b))
        })
    }

    /// Block occupying the grid point nearest to `position`
    pub fn block_at(&self, position: Vec3) -> Option<&Block> {
        self.column_at_position(position)?.find(position)
    }

    pub fn block_at_mut(&mut self, position: Vec3) -> Option<&mut Block> {
        let cell = crate::cell_of(position);
        self.column_at_mut(GridCoord::from_position(position))?
            .blocks_mut()
            .iter_mut()
            .find(|b| crate::cell_of(b.position) == cell)
    }

    /// Allocate a fresh block id
    pub fn allocate_id(&mut self) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        id
    }

    /// Append a block to the top of a column
    pub fn add(&mut self, block: Block, coord: GridCoord) -> Result<(), GridError> {
        if let Some(owner) = self.owner_of(block.id) {
            return Err(GridError::InvalidState {
                id: block.id,
                owner,
            });
        }
        let column = self
            .column_at_mut(coord)
            .ok_or(GridError::OutOfBounds(coord))?;
        column.add(block);
        Ok(())
    }

    /// Detach the block at `position` from a column, handing it to the caller
    pub fn remove(&mut self, coord: GridCoord, position: Vec3) -> Result<Block, GridError> {
        self.column_at_mut(coord)
            .ok_or(GridError::OutOfBounds(coord))?
            .remove(position)
    }

    /// Remove and drop a block. Failures are logged and reported as `None`.
    pub fn destroy_block(&mut self, coord: GridCoord, position: Vec3) -> Option<BlockId> {
        match self.remove(coord, position) {
            Ok(block) => {
                log::debug!("removed block {} at {}", block.id, block.position);
                Some(block.id)
            }
            Err(err) => {
                log::warn!("no block to remove: {err}");
                None
            }
        }
    }

    /// Create a block at `position` and add it to the column at `coord`
    pub fn spawn_block(
        &mut self,
        kind: BlockKind,
        coord: GridCoord,
        position: Vec3,
    ) -> Result<BlockId, GridError> {
        if !self.in_bounds(coord) {
            return Err(GridError::OutOfBounds(coord));
        }
        let id = self.allocate_id();
        self.add(Block::new(id, kind, position), coord)?;
        Ok(id)
    }

    /// Stack a block on top of a column, resting in its slot
    pub fn stack_block(&mut self, kind: BlockKind, coord: GridCoord) -> Result<BlockId, GridError> {
        let height = self
            .column_at(coord)
            .ok_or(GridError::OutOfBounds(coord))?
            .len();
        self.spawn_block(kind, coord, coord.slot_position(height))
    }

    /// Position one unit above the topmost block of the tallest column in the
    /// team's row. Ties go to the lowest x.
    pub fn respawn_point(&self, team: Team) -> Vec3 {
        let z = team.z_index();
        let mut highest: Option<&Column> = None;
        for column in self.row(z) {
            if highest.is_none_or(|h| column.len() > h.len()) {
                highest = Some(column);
            }
        }

        match highest.and_then(|c| c.top()) {
            Some(top) => top.position + Vec3::Y,
            None => GridCoord::new(0, z).slot_position(0),
        }
    }

    /// Advance gravity and fuses of every owned block, bottom to top.
    /// Returns fuse signals in column order.
    pub fn advance_blocks(&mut self, dt: f32, gravity: f32) -> Vec<(BlockId, FuseSignal)> {
        let mut signals = Vec::new();
        for column in &mut self.columns {
            for (index, block) in column.blocks_mut().iter_mut().enumerate() {
                let rest_height = BASE_HEIGHT + index as f32;
                if let Some(signal) = block.advance(dt, rest_height, gravity) {
                    signals.push((block.id, signal));
                }
            }
        }
        signals
    }
}
