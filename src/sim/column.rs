//! Block columns
//!
//! A column is the ordered stack of blocks (bottom to top) at one grid cell.
//! Its contents change only through `add` and `remove`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::block::{Block, BlockColor, BlockId};
use super::coord::GridCoord;
use crate::cell_of;
use crate::error::GridError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    coord: GridCoord,
    base_color: BlockColor,
    blocks: Vec<Block>,
}

impl Column {
    pub fn new(coord: GridCoord) -> Self {
        Self {
            coord,
            base_color: BlockColor::for_row(coord.row()),
            blocks: Vec::new(),
        }
    }

    pub fn coord(&self) -> GridCoord {
        self.coord
    }

    pub fn base_color(&self) -> BlockColor {
        self.base_color
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn top(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.iter().any(|b| b.id == id)
    }

    /// Block whose position rounds to the same grid point as `position`
    pub fn find(&self, position: Vec3) -> Option<&Block> {
        let cell = cell_of(position);
        self.blocks.iter().find(|b| cell_of(b.position) == cell)
    }

    /// Push a block onto the top of the stack. The block takes the column's
    /// colour.
    pub(crate) fn add(&mut self, mut block: Block) {
        block.base_color = self.base_color;
        self.blocks.push(block);
    }

    /// Detach the block at `position` (compared after rounding)
    pub(crate) fn remove(&mut self, position: Vec3) -> Result<Block, GridError> {
        let cell = cell_of(position);
        let index = self
            .blocks
            .iter()
            .position(|b| cell_of(b.position) == cell)
            .ok_or(GridError::NotFound {
                coord: self.coord,
                position,
            })?;
        Ok(self.blocks.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::block::BlockKind;

    fn block_at(id: u32, coord: GridCoord, height: usize) -> Block {
        Block::new(BlockId(id), BlockKind::Standard, coord.slot_position(height))
    }

    #[test]
    fn test_add_keeps_order_and_colour() {
        let coord = GridCoord::new(2, 0);
        let mut column = Column::new(coord);
        column.add(block_at(1, coord, 0));
        column.add(block_at(2, coord, 1));

        assert_eq!(column.len(), 2);
        assert_eq!(column.top().map(|b| b.id), Some(BlockId(2)));
        assert!(column.blocks().iter().all(|b| b.base_color == BlockColor::Blue));
    }

    #[test]
    fn test_remove_by_position_splices() {
        let coord = GridCoord::new(0, 1);
        let mut column = Column::new(coord);
        for i in 0..3 {
            column.add(block_at(i + 1, coord, i as usize));
        }

        // Slightly off the grid point still matches after rounding
        let removed = column.remove(Vec3::new(0.1, 1.2, 0.9)).unwrap();
        assert_eq!(removed.id, BlockId(2));
        let ids: Vec<_> = column.blocks().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![BlockId(1), BlockId(3)]);
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let coord = GridCoord::new(4, 2);
        let mut column = Column::new(coord);
        column.add(block_at(1, coord, 0));

        let err = column.remove(coord.slot_position(5)).unwrap_err();
        assert!(matches!(err, GridError::NotFound { .. }));
        assert_eq!(column.len(), 1);
    }
}
