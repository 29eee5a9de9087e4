//! Arena state
//!
//! Everything the tick driver mutates lives here: the grid, players, the
//! task scheduler, the rain generator and the seeded RNG.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::block::{BlockColor, BlockId, BlockKind};
use super::collision;
use super::coord::{Direction, GridCoord, Team};
use super::grid::GridManager;
use super::player::{Player, PlayerId};
use super::rain::RainGenerator;
use super::slide::SlideTask;
use super::task::{Scheduler, Task};
use crate::consts::{CAST_RADIUS, DEPTH};
use crate::error::GridError;
use crate::settings::ArenaSettings;

/// Things that happened during a tick, for hosts (audio, effects) and tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArenaEvent {
    BlockSpawned { id: BlockId, coord: GridCoord, bomb: bool },
    SlideStarted { id: BlockId, from: GridCoord, direction: Direction },
    SlideFinished { id: BlockId, coord: GridCoord },
    /// Slid off the edge of the grid
    BlockLost { id: BlockId },
    /// Push refused because the cell beyond the block is occupied
    BlockBlocked { id: BlockId },
    BlockDestroyed { id: BlockId, coord: GridCoord },
    BombArmed { id: BlockId },
    BombTick { id: BlockId, tick: u32 },
    /// Fuse colour flip, for rendering the flicker
    BombFlash { id: BlockId, color: BlockColor },
    Detonated { id: BlockId, position: Vec3 },
    PlayerKnockedBack { player: PlayerId, impulse: Vec3 },
    PlayerRespawned { player: PlayerId, position: Vec3 },
}

/// Complete arena state
#[derive(Debug, Clone)]
pub struct ArenaState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub settings: ArenaSettings,
    pub grid: GridManager,
    pub players: Vec<Player>,
    pub tasks: Scheduler,
    pub rain: RainGenerator,
    /// Events produced since the last drain
    pub events: Vec<ArenaEvent>,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) rng: Pcg32,
    next_player_id: u8,
}

impl ArenaState {
    /// Arena with one floor block per column
    pub fn new(seed: u64, settings: ArenaSettings) -> Self {
        let mut state = Self::empty(seed, settings);
        let width = state.grid.width();
        for x in 0..width {
            for z in 0..DEPTH {
                let coord = GridCoord::new(x, z);
                match state.grid.stack_block(BlockKind::Standard, coord) {
                    Ok(_) => {
                        if let Some(block) = state.grid.block_at_mut(coord.slot_position(0)) {
                            block.make_fall_immediately();
                        }
                    }
                    Err(err) => log::error!("failed to place floor block: {err}"),
                }
            }
        }
        log::info!("Arena initialized with seed {} ({}x{})", seed, width, DEPTH);
        state
    }

    /// Arena with no blocks (scripted layouts)
    pub fn empty(seed: u64, settings: ArenaSettings) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let rain = RainGenerator::new(&mut rng, &settings);
        Self {
            seed,
            grid: GridManager::new(settings.width),
            settings,
            players: Vec::new(),
            tasks: Scheduler::new(),
            rain,
            events: Vec::new(),
            time_ticks: 0,
            rng,
            next_player_id: 1,
        }
    }

    /// Add a player at its team's respawn point
    pub fn add_player(&mut self, team: Team) -> PlayerId {
        let id = PlayerId(self.next_player_id);
        self.next_player_id = self.next_player_id.wrapping_add(1);
        let position = self.grid.respawn_point(team);
        self.players.push(Player::new(id, team, position));
        id
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Start sliding the block at `position` one cell in `direction`
    pub fn slide_block(&mut self, position: Vec3, direction: Direction) -> Result<BlockId, GridError> {
        let task = SlideTask::start(
            &mut self.grid,
            position,
            direction,
            self.settings.slide_block_duration,
        )?;
        let id = task.id();
        self.events.push(ArenaEvent::SlideStarted {
            id,
            from: task.source(),
            direction,
        });
        self.tasks.spawn(Task::Slide(task));
        Ok(id)
    }

    /// Remove and drop the block at `position` in the column at `coord`
    pub fn destroy_block(&mut self, coord: GridCoord, position: Vec3) -> bool {
        match self.grid.destroy_block(coord, position) {
            Some(id) => {
                self.events.push(ArenaEvent::BlockDestroyed { id, coord });
                true
            }
            None => false,
        }
    }

    /// No block (resting or sliding) or floor at `point`
    pub fn is_open(&self, point: Vec3) -> bool {
        collision::is_open(
            &self.grid,
            self.tasks.slides().map(SlideTask::position),
            point,
            CAST_RADIUS,
        )
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<ArenaEvent> {
        std::mem::take(&mut self.events)
    }
}
