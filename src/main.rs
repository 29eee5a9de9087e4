//! Block Arena entry point
//!
//! Runs a headless match between two scripted players and logs what happens.
//! Usage: `block-arena [settings.json] [seconds]`

use std::collections::BTreeMap;

use block_arena::ArenaSettings;
use block_arena::consts::*;
use block_arena::sim::{ArenaEvent, ArenaState, Direction, PlayerAction, PlayerId, Team, TickInput, tick};

/// Host frame length; the simulation catches up in fixed steps
const FRAME_DT: f32 = 1.0 / 30.0;
const DEFAULT_SECONDS: f32 = 60.0;

/// Walks its row, turning toward the wall, hopping and pushing on a fixed rhythm
struct ScriptedPlayer {
    id: PlayerId,
    heading: f32,
    timer: f32,
}

impl ScriptedPlayer {
    fn new(id: PlayerId) -> Self {
        Self {
            id,
            heading: 1.0,
            timer: 0.0,
        }
    }

    fn actions(&mut self, state: &ArenaState, dt: f32) -> Vec<(PlayerId, PlayerAction)> {
        let Some(player) = state.player(self.id) else {
            return Vec::new();
        };
        self.timer += dt;

        let x = player.position.x;
        let max_x = (state.grid.width() - 1) as f32;
        if (x >= max_x && self.heading > 0.0) || (x <= 0.0 && self.heading < 0.0) {
            self.heading = -self.heading;
        }

        let toward_wall = match player.team {
            Team::Blue => Direction::Forward,
            Team::Purple => Direction::Back,
        };
        let mut actions = vec![(self.id, PlayerAction::Turn(toward_wall))];
        if self.timer >= 1.5 {
            self.timer = 0.0;
            actions.push((self.id, PlayerAction::Push));
        } else if self.timer >= 1.2 && self.timer < 1.2 + dt {
            actions.push((self.id, PlayerAction::Jump));
        } else {
            actions.push((self.id, PlayerAction::Move { dx: self.heading }));
        }
        actions
    }
}

fn load_settings(path: Option<&str>) -> ArenaSettings {
    let Some(path) = path else {
        return ArenaSettings::default();
    };
    match ArenaSettings::load_from(path) {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("Failed to load settings from {}: {err}; using defaults", path);
            ArenaSettings::default()
        }
    }
}

fn event_name(event: &ArenaEvent) -> &'static str {
    match event {
        ArenaEvent::BlockSpawned { .. } => "block_spawned",
        ArenaEvent::SlideStarted { .. } => "slide_started",
        ArenaEvent::SlideFinished { .. } => "slide_finished",
        ArenaEvent::BlockLost { .. } => "block_lost",
        ArenaEvent::BlockBlocked { .. } => "block_blocked",
        ArenaEvent::BlockDestroyed { .. } => "block_destroyed",
        ArenaEvent::BombArmed { .. } => "bomb_armed",
        ArenaEvent::BombTick { .. } => "bomb_tick",
        ArenaEvent::BombFlash { .. } => "bomb_flash",
        ArenaEvent::Detonated { .. } => "detonated",
        ArenaEvent::PlayerKnockedBack { .. } => "player_knocked_back",
        ArenaEvent::PlayerRespawned { .. } => "player_respawned",
    }
}

fn main() {
    env_logger::init();
    log::info!("Block Arena (headless) starting...");

    let args: Vec<String> = std::env::args().collect();
    let settings = load_settings(args.get(1).map(String::as_str));
    let seconds = args
        .get(2)
        .and_then(|s| s.parse::<f32>().ok())
        .unwrap_or(DEFAULT_SECONDS);

    let seed = 0x5eed_b10c;
    let mut state = ArenaState::new(seed, settings);
    let mut bots = vec![
        ScriptedPlayer::new(state.add_player(Team::Blue)),
        ScriptedPlayer::new(state.add_player(Team::Purple)),
    ];

    let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
    let mut accumulator = 0.0;
    let mut elapsed = 0.0;

    while elapsed < seconds {
        elapsed += FRAME_DT;
        accumulator += FRAME_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let mut input = TickInput::default();
            for bot in &mut bots {
                input.actions.extend(bot.actions(&state, SIM_DT));
            }
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in state.drain_events() {
            if let ArenaEvent::Detonated { id, position } = &event {
                log::info!("t={:.2}s bomb {} went off at {}", elapsed, id, position);
            }
            *counts.entry(event_name(&event)).or_default() += 1;
        }
    }

    log::info!(
        "Simulated {} ticks; {} blocks remain",
        state.time_ticks,
        state.grid.block_count()
    );
    for (name, count) in &counts {
        log::info!("{:>20}: {}", name, count);
    }
}
