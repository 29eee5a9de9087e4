//! Detonation resolver
//!
//! Runs when a bomb's fuse burns out. Everything overlapping the blast box
//! is classified by row: wall blocks are destroyed, team-row blocks are slid
//! one cell away from the wall (off the arena), players are reoriented and
//! knocked outward. The bomb then destroys itself.

use std::collections::BTreeSet;

use glam::Vec3;

use super::block::BlockId;
use super::collision::{Aabb, Overlap, overlap_box};
use super::coord::{GridCoord, Row};
use super::player::PlayerId;
use super::state::{ArenaEvent, ArenaState};
use crate::consts::SIM_DT;

/// What a blast did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlastReport {
    pub destroyed: Vec<BlockId>,
    pub pushed: Vec<BlockId>,
    pub knocked_back: Vec<PlayerId>,
}

/// Resolve the blast of bomb `bomb`. Returns `None` if the bomb is no
/// longer in the grid (destroyed earlier in the same frame).
pub fn detonate(state: &mut ArenaState, bomb: BlockId) -> Option<BlastReport> {
    let Some((bomb_coord, block)) = state.grid.locate(bomb) else {
        log::debug!("bomb {} already gone, skipping blast", bomb);
        return None;
    };
    let center = block.position;
    log::info!("bomb {} detonated at {}", bomb, center);
    state.events.push(ArenaEvent::Detonated {
        id: bomb,
        position: center,
    });

    let volume = Aabb::new(center, Vec3::splat(state.settings.blast_half_extent));
    let hits = overlap_box(&state.grid, &state.players, &volume);

    let mut report = BlastReport::default();
    let mut handled = BTreeSet::new();

    for hit in hits {
        match hit {
            Overlap::Block {
                id,
                coord,
                position,
                ..
            } => {
                if id == bomb || !handled.insert(id) {
                    continue;
                }
                blast_block(state, &mut report, id, coord, position);
            }
            Overlap::Player(player) => knock_back(state, &mut report, player),
        }
    }

    if let Some(fuse) = state
        .grid
        .block_at_mut(center)
        .filter(|b| b.id == bomb)
        .and_then(|b| b.fuse_mut())
    {
        fuse.spend();
    }
    if state.destroy_block(bomb_coord, center) {
        report.destroyed.push(bomb);
    }

    Some(report)
}

fn blast_block(
    state: &mut ArenaState,
    report: &mut BlastReport,
    id: BlockId,
    coord: GridCoord,
    position: Vec3,
) {
    match coord.row() {
        Some(Row::Wall) => {
            if state.destroy_block(coord, position) {
                report.destroyed.push(id);
            }
        }
        Some(row) => {
            let Some(team) = row.team() else {
                return;
            };
            match state.slide_block(position, team.outward()) {
                Ok(_) => report.pushed.push(id),
                Err(err) => log::warn!("blast could not push {}: {err}", id),
            }
        }
        None => log::warn!("block {} at {} is outside every row", id, coord),
    }
}

fn knock_back(state: &mut ArenaState, report: &mut BlastReport, id: PlayerId) {
    let force = state.settings.knockback_force;
    let Some(player) = state.player_mut(id) else {
        return;
    };
    player.reset_orientation();
    let impulse = player.team.outward().to_vec3() * force * SIM_DT;
    player.apply_impulse(impulse);

    log::debug!("player {} knocked back by {}", id, impulse);
    state.events.push(ArenaEvent::PlayerKnockedBack {
        player: id,
        impulse,
    });
    report.knocked_back.push(id);
}
