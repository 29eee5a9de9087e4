//! Arena tuning
//!
//! Loaded from a JSON file by the native driver; every field falls back to
//! the defaults in `consts` when omitted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;

/// Arena tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    // === Grid ===
    /// Number of columns along x
    pub width: i32,
    /// Height at which rain blocks appear
    pub spawn_height: f32,
    /// Gravity applied to falling blocks
    pub gravity: f32,

    // === Slides ===
    /// Seconds for a block to slide one cell
    pub slide_block_duration: f32,

    // === Bombs ===
    /// Countdown cycles before a bomb goes off
    pub bomb_ticks: u32,
    /// Blast box half-extents
    pub blast_half_extent: f32,
    /// Force pushing players out of a blast, applied over one fixed step
    pub knockback_force: f32,

    // === Block rain ===
    /// Whether the rain generator runs at all
    pub rain_enabled: bool,
    /// Cooldown bounds (seconds)
    pub spawn_min_delay: f32,
    pub spawn_max_delay: f32,
    /// Delay before a spawned block starts to fall
    pub fall_delay: f32,
    /// Probability (0.0 - 1.0) that a rain block is a bomb
    pub bomb_chance: f64,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            width: WIDTH,
            spawn_height: SPAWN_HEIGHT,
            gravity: GRAVITY,

            slide_block_duration: SLIDE_BLOCK_DURATION,

            bomb_ticks: BOMB_TICKS,
            blast_half_extent: BLAST_HALF_EXTENT,
            knockback_force: KNOCKBACK_FORCE,

            rain_enabled: true,
            spawn_min_delay: SPAWN_MIN_DELAY,
            spawn_max_delay: SPAWN_MAX_DELAY,
            fall_delay: FALL_DELAY,
            bomb_chance: 0.1,
        }
    }
}

impl ArenaSettings {
    /// Settings with the rain generator switched off (scripted layouts)
    pub fn without_rain() -> Self {
        Self {
            rain_enabled: false,
            ..Self::default()
        }
    }

    /// Action cooldown for players (two slide durations)
    pub fn action_delay(&self) -> f32 {
        self.slide_block_duration * 2.0
    }

    /// Parse settings from a JSON string and validate them
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded arena settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width < 1 {
            return Err(invalid("width", format!("must be at least 1, got {}", self.width)));
        }
        if self.slide_block_duration <= 0.0 {
            return Err(invalid("slide_block_duration", "must be positive".into()));
        }
        if self.spawn_min_delay < 0.0 || self.spawn_max_delay < self.spawn_min_delay {
            return Err(invalid(
                "spawn_max_delay",
                format!(
                    "cooldown range [{}, {}] is empty or negative",
                    self.spawn_min_delay, self.spawn_max_delay
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.bomb_chance) {
            return Err(invalid("bomb_chance", "must be within 0.0 - 1.0".into()));
        }
        if self.blast_half_extent <= 0.0 {
            return Err(invalid("blast_half_extent", "must be positive".into()));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> SettingsError {
    SettingsError::Invalid { field, reason }
}
