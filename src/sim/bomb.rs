//! Bomb fuse state machine
//!
//! Idle -> Armed -> Ticking (N cycles) -> Igniting -> Detonating -> Spent.
//! The fuse only tracks timing and colours; the blast itself lives in
//! `detonation`.

use serde::{Deserialize, Serialize};

use super::block::BlockColor;

/// Time a colour change takes before the flash starts counting
pub const CHANGE_TIME: f32 = 0.01;
/// Duration the tick colour is shown each cycle
pub const FLASH_DURATION_DETONATION: f32 = 0.1;
/// Initial duration of the locked-colour half of a cycle
pub const FLASH_DURATION_NORMAL: f32 = 0.3;
/// Lower bound of the locked-colour half as the flicker accelerates
pub const FLASH_DURATION_FLOOR: f32 = 0.1;

/// Which half of a tick cycle is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flash {
    Tick,
    Locked,
}

/// Fuse phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum FusePhase {
    /// Ordinary pushable block
    #[default]
    Idle,
    /// Slid into place; waits until the block is at rest
    Armed,
    /// Countdown: `tick` is 0-based
    Ticking {
        tick: u32,
        flash: Flash,
        elapsed: f32,
        normal_duration: f32,
    },
    /// Final tick-colour change before the blast
    Igniting { elapsed: f32 },
    /// Blast pending; the detonation resolver takes over
    Detonating,
    /// Terminal
    Spent,
}

/// Signal produced by advancing a fuse
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FuseSignal {
    /// A new countdown cycle started (1-based)
    Tick(u32),
    /// Colour flipped mid-cycle
    Flash(BlockColor),
    /// Countdown over, blast now
    Detonate,
}

/// Bomb fuse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Fuse {
    pub phase: FusePhase,
    /// Number of countdown cycles
    pub ticks: u32,
}

impl Fuse {
    pub fn new(ticks: u32) -> Self {
        Self {
            phase: FusePhase::Idle,
            ticks,
        }
    }

    /// Trigger the countdown (after a slide). Only an idle fuse can be armed.
    pub fn arm(&mut self) -> bool {
        if self.phase == FusePhase::Idle {
            self.phase = FusePhase::Armed;
            true
        } else {
            false
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == FusePhase::Idle
    }

    /// Mark the fuse as used up once the blast has been resolved
    pub fn spend(&mut self) {
        self.phase = FusePhase::Spent;
    }

    /// Colour override while the fuse burns
    pub fn color(&self) -> Option<BlockColor> {
        match self.phase {
            FusePhase::Ticking { flash: Flash::Tick, .. }
            | FusePhase::Igniting { .. }
            | FusePhase::Detonating => Some(BlockColor::Tick),
            FusePhase::Ticking { flash: Flash::Locked, .. } => Some(BlockColor::Locked),
            _ => None,
        }
    }

    /// Advance by `dt`. `at_rest` is true when the block's vertical velocity
    /// is zero.
    pub fn advance(&mut self, dt: f32, at_rest: bool) -> Option<FuseSignal> {
        match self.phase {
            FusePhase::Idle | FusePhase::Detonating | FusePhase::Spent => None,
            FusePhase::Armed => {
                if !at_rest {
                    return None;
                }
                if self.ticks == 0 {
                    self.phase = FusePhase::Igniting { elapsed: 0.0 };
                    return None;
                }
                self.phase = FusePhase::Ticking {
                    tick: 0,
                    flash: Flash::Tick,
                    elapsed: 0.0,
                    normal_duration: FLASH_DURATION_NORMAL,
                };
                Some(FuseSignal::Tick(1))
            }
            FusePhase::Ticking {
                tick,
                flash,
                elapsed,
                normal_duration,
            } => {
                let elapsed = elapsed + dt;
                match flash {
                    Flash::Tick => {
                        if elapsed < CHANGE_TIME + FLASH_DURATION_DETONATION {
                            self.phase = FusePhase::Ticking {
                                tick,
                                flash,
                                elapsed,
                                normal_duration,
                            };
                            return None;
                        }
                        self.phase = FusePhase::Ticking {
                            tick,
                            flash: Flash::Locked,
                            elapsed: 0.0,
                            normal_duration,
                        };
                        Some(FuseSignal::Flash(BlockColor::Locked))
                    }
                    Flash::Locked => {
                        if elapsed < CHANGE_TIME + normal_duration {
                            self.phase = FusePhase::Ticking {
                                tick,
                                flash,
                                elapsed,
                                normal_duration,
                            };
                            return None;
                        }
                        let normal_duration = if normal_duration > FLASH_DURATION_FLOOR {
                            (normal_duration * 0.5).max(FLASH_DURATION_FLOOR)
                        } else {
                            normal_duration
                        };
                        let next = tick + 1;
                        if next >= self.ticks {
                            self.phase = FusePhase::Igniting { elapsed: 0.0 };
                            return Some(FuseSignal::Flash(BlockColor::Tick));
                        }
                        self.phase = FusePhase::Ticking {
                            tick: next,
                            flash: Flash::Tick,
                            elapsed: 0.0,
                            normal_duration,
                        };
                        Some(FuseSignal::Tick(next + 1))
                    }
                }
            }
            FusePhase::Igniting { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed < CHANGE_TIME {
                    self.phase = FusePhase::Igniting { elapsed };
                    return None;
                }
                self.phase = FusePhase::Detonating;
                Some(FuseSignal::Detonate)
            }
        }
    }
}
