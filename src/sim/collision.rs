//! Spatial queries over the block grid
//!
//! The arena is grid-aligned, so the columns themselves serve as the spatial
//! index: a query only visits the columns whose cells its volume can reach.
//! Blocks are unit cubes; players are treated as unit boxes centred on their
//! position.

use glam::Vec3;

use super::block::BlockId;
use super::coord::GridCoord;
use super::grid::GridManager;
use super::player::{Player, PlayerId};
use crate::consts::BLOCK_HALF_EXTENT;

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Aabb {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Unit cube of a block at `center`
    pub fn block(center: Vec3) -> Self {
        Self::new(center, Vec3::splat(BLOCK_HALF_EXTENT))
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Boxes overlap (touching faces do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let reach = self.half_extents + other.half_extents;
        d.x < reach.x && d.y < reach.y && d.z < reach.z
    }

    /// Sphere intersects the box (touching does not count)
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min(), self.max());
        closest.distance_squared(center) < radius * radius
    }

    /// Grid cells whose block cube could overlap this box
    fn cells(&self) -> impl Iterator<Item = GridCoord> {
        let lo = (self.min() - Vec3::splat(BLOCK_HALF_EXTENT)).floor();
        let hi = (self.max() + Vec3::splat(BLOCK_HALF_EXTENT)).ceil();
        let (x0, x1) = (lo.x as i32, hi.x as i32);
        let (z0, z1) = (lo.z as i32, hi.z as i32);
        (x0..=x1).flat_map(move |x| (z0..=z1).map(move |z| GridCoord::new(x, z)))
    }
}

/// Something found by an overlap query
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlap {
    Block {
        id: BlockId,
        coord: GridCoord,
        position: Vec3,
        is_bomb: bool,
    },
    Player(PlayerId),
}

/// All column-owned blocks and players overlapping `volume`.
/// Blocks are reported in column order (x, then z, bottom to top), players
/// after them.
pub fn overlap_box(grid: &GridManager, players: &[Player], volume: &Aabb) -> Vec<Overlap> {
    let mut hits = Vec::new();

    for coord in volume.cells() {
        let Some(column) = grid.column_at(coord) else {
            continue;
        };
        for block in column.blocks() {
            if volume.overlaps(&Aabb::block(block.position)) {
                hits.push(Overlap::Block {
                    id: block.id,
                    coord,
                    position: block.position,
                    is_bomb: block.is_bomb(),
                });
            }
        }
    }

    for player in players {
        if volume.overlaps(&player.bounds()) {
            hits.push(Overlap::Player(player.id));
        }
    }

    hits
}

/// True if no solid (block or floor support) intersects a small sphere at
/// `point`. `in_flight` are the positions of blocks currently sliding.
pub fn is_open(
    grid: &GridManager,
    in_flight: impl IntoIterator<Item = Vec3>,
    point: Vec3,
    radius: f32,
) -> bool {
    // Floor support under the bottom slot
    if point.y - radius < crate::consts::BASE_HEIGHT - BLOCK_HALF_EXTENT {
        return false;
    }

    let reach = Aabb::new(point, Vec3::splat(radius));
    for coord in reach.cells() {
        let Some(column) = grid.column_at(coord) else {
            continue;
        };
        if column
            .blocks()
            .iter()
            .any(|b| Aabb::block(b.position).intersects_sphere(point, radius))
        {
            return false;
        }
    }

    !in_flight
        .into_iter()
        .any(|pos| Aabb::block(pos).intersects_sphere(point, radius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::block::BlockKind;

    fn wall_grid() -> GridManager {
        let mut grid = GridManager::new(WIDTH);
        for x in 0..WIDTH {
            grid.stack_block(BlockKind::Standard, GridCoord::new(x, WALL_Z_INDEX))
                .unwrap();
        }
        grid
    }

    #[test]
    fn test_aabb_overlap_excludes_touching() {
        let a = Aabb::block(Vec3::ZERO);
        assert!(a.overlaps(&Aabb::block(Vec3::new(0.9, 0.0, 0.0))));
        assert!(!a.overlaps(&Aabb::block(Vec3::new(1.0, 0.0, 0.0))));
    }

    #[test]
    fn test_blast_box_reaches_direct_neighbours_only() {
        let grid = wall_grid();
        let blast = Aabb::new(Vec3::new(4.0, 0.0, 1.0), Vec3::splat(BLAST_HALF_EXTENT));
        let hits = overlap_box(&grid, &[], &blast);

        let xs: Vec<i32> = hits
            .iter()
            .filter_map(|h| match h {
                Overlap::Block { coord, .. } => Some(coord.x),
                Overlap::Player(_) => None,
            })
            .collect();
        assert_eq!(xs, vec![3, 4, 5]);
    }

    #[test]
    fn test_overlap_finds_players() {
        let grid = GridManager::new(WIDTH);
        let players = vec![
            Player::new(PlayerId(1), crate::sim::coord::Team::Blue, Vec3::new(2.0, 1.0, 0.0)),
            Player::new(PlayerId(2), crate::sim::coord::Team::Purple, Vec3::new(8.0, 1.0, 2.0)),
        ];
        let blast = Aabb::new(Vec3::new(2.0, 1.0, 1.0), Vec3::splat(BLAST_HALF_EXTENT));
        assert_eq!(overlap_box(&grid, &players, &blast), vec![Overlap::Player(PlayerId(1))]);
    }

    #[test]
    fn test_is_open() {
        let grid = wall_grid();
        // Inside a wall block
        assert!(!is_open(&grid, [], Vec3::new(3.0, 0.0, 1.0), CAST_RADIUS));
        // Above the wall
        assert!(is_open(&grid, [], Vec3::new(3.0, 1.0, 1.0), CAST_RADIUS));
        // Below the floor
        assert!(!is_open(&grid, [], Vec3::new(3.0, -0.5, 0.0), CAST_RADIUS));
        // A sliding block blocks the cell it passes through
        assert!(!is_open(&grid, [Vec3::new(6.0, 1.0, 1.0)], Vec3::new(6.0, 1.0, 1.0), CAST_RADIUS));
    }
}
