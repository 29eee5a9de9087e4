//! Block rain
//!
//! On a randomized cooldown, drops a new block into a random open column of
//! each team row. The cooldown is resampled only when a block is spawned.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::block::{Block, BlockId, BlockKind};
use super::bomb::Fuse;
use super::coord::{GridCoord, Team};
use super::grid::GridManager;
use crate::round_to_grid;
use crate::settings::ArenaSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RainGenerator {
    cooldown: f32,
}

/// A block dropped by the rain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawned {
    pub id: BlockId,
    pub coord: GridCoord,
    pub bomb: bool,
}

impl RainGenerator {
    pub fn new(rng: &mut Pcg32, settings: &ArenaSettings) -> Self {
        let mut rain = Self { cooldown: 0.0 };
        rain.setup_next_spawn(rng, settings);
        rain
    }

    /// Seconds until the next spawn attempt
    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    fn setup_next_spawn(&mut self, rng: &mut Pcg32, settings: &ArenaSettings) {
        self.cooldown = rng.random_range(settings.spawn_min_delay..=settings.spawn_max_delay);
    }

    /// Count down and, once due, try both team rows (Blue first)
    pub fn update(
        &mut self,
        dt: f32,
        grid: &mut GridManager,
        rng: &mut Pcg32,
        settings: &ArenaSettings,
    ) -> Vec<Spawned> {
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return Vec::new();
        }

        [Team::Blue, Team::Purple]
            .into_iter()
            .filter_map(|team| self.try_spawn(team.z_index(), grid, rng, settings))
            .collect()
    }

    /// Columns of row `z` with room for a block at `spawn_height`: empty, or
    /// topmost block at least one unit below it
    pub fn open_columns(grid: &GridManager, z: i32, spawn_height: f32) -> Vec<GridCoord> {
        grid.row(z)
            .filter(|column| match column.top() {
                None => true,
                Some(top) => spawn_height - top.position.y >= 1.0,
            })
            .map(|column| column.coord())
            .collect()
    }

    fn try_spawn(
        &mut self,
        z: i32,
        grid: &mut GridManager,
        rng: &mut Pcg32,
        settings: &ArenaSettings,
    ) -> Option<Spawned> {
        let open = Self::open_columns(grid, z, settings.spawn_height);
        if open.is_empty() {
            return None;
        }

        let coord = open[rng.random_range(0..open.len())];
        let bomb = settings.bomb_chance > 0.0 && rng.random_bool(settings.bomb_chance);
        let kind = if bomb {
            BlockKind::Bomb(Fuse::new(settings.bomb_ticks))
        } else {
            BlockKind::Standard
        };

        let position = round_to_grid(Vec3::new(
            coord.x as f32,
            settings.spawn_height,
            coord.z as f32,
        ));
        let id = grid.allocate_id();
        let mut block = Block::new(id, kind, position);
        block.make_fall_after_delay(settings.fall_delay);

        if let Err(err) = grid.add(block, coord) {
            log::error!("rain spawn failed: {err}");
            return None;
        }
        log::debug!("rain spawned {} at {}{}", id, coord, if bomb { " (bomb)" } else { "" });

        self.setup_next_spawn(rng, settings);
        Some(Spawned { id, coord, bomb })
    }
}
