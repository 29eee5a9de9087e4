//! Error types
//!
//! Grid failures are mostly absorbed by callers (logged and skipped); only
//! `InvalidState` indicates a caller bug.

use glam::Vec3;
use thiserror::Error;

use crate::sim::block::BlockId;
use crate::sim::coord::GridCoord;

/// Failures of column membership operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// No block at the expected position during removal
    #[error("no block at {position} in column {coord}")]
    NotFound { coord: GridCoord, position: Vec3 },

    /// Grid coordinate outside Width x Depth
    #[error("grid coordinate {0} is outside the arena")]
    OutOfBounds(GridCoord),

    /// Attempt to add a block that a column already owns
    #[error("block {id} is already owned by column {owner}")]
    InvalidState { id: BlockId, owner: GridCoord },
}

/// Failures while loading arena settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
