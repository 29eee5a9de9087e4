//! Grid coordinates, rows and cardinal directions

use std::fmt;

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Integer (x, z) cell of the arena floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub z: i32,
}

impl GridCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Column cell containing a world position (nearest integer x and z)
    pub fn from_position(pos: Vec3) -> Self {
        Self::new(pos.x.round() as i32, pos.z.round() as i32)
    }

    /// Neighbouring cell one step in `direction`
    pub fn step(self, direction: Direction) -> Self {
        let d = direction.offset();
        Self::new(self.x + d.x, self.z + d.z)
    }

    /// World position of the given stack slot in this column
    pub fn slot_position(self, index: usize) -> Vec3 {
        Vec3::new(self.x as f32, BASE_HEIGHT + index as f32, self.z as f32)
    }

    /// Row this coordinate belongs to (None if z is outside the arena)
    pub fn row(self) -> Option<Row> {
        Row::from_z(self.z)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Teams; each owns one row on either side of the wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Team {
    /// Team A, row z = 0
    Blue,
    /// Team B, row z = 2
    Purple,
}

impl Team {
    /// z-index of the team's row
    pub fn z_index(self) -> i32 {
        match self {
            Team::Blue => BLUE_TEAM_Z_INDEX,
            Team::Purple => PURPLE_TEAM_Z_INDEX,
        }
    }

    /// Direction pointing away from the wall row, out of the arena
    pub fn outward(self) -> Direction {
        match self {
            Team::Blue => Direction::Back,
            Team::Purple => Direction::Forward,
        }
    }

    pub fn row(self) -> Row {
        match self {
            Team::Blue => Row::Blue,
            Team::Purple => Row::Purple,
        }
    }
}

/// A fixed z-index of the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Row {
    Blue,
    Wall,
    Purple,
}

impl Row {
    pub fn from_z(z: i32) -> Option<Self> {
        match z {
            BLUE_TEAM_Z_INDEX => Some(Row::Blue),
            WALL_Z_INDEX => Some(Row::Wall),
            PURPLE_TEAM_Z_INDEX => Some(Row::Purple),
            _ => None,
        }
    }

    /// Team owning this row (the wall belongs to nobody)
    pub fn team(self) -> Option<Team> {
        match self {
            Row::Blue => Some(Team::Blue),
            Row::Wall => None,
            Row::Purple => Some(Team::Purple),
        }
    }
}

/// Cardinal directions on the arena floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// +z
    #[default]
    Forward,
    /// -z
    Back,
    /// -x
    Left,
    /// +x
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Back,
        Direction::Left,
        Direction::Right,
    ];

    pub fn offset(self) -> IVec3 {
        match self {
            Direction::Forward => IVec3::Z,
            Direction::Back => IVec3::NEG_Z,
            Direction::Left => IVec3::NEG_X,
            Direction::Right => IVec3::X,
        }
    }

    pub fn to_vec3(self) -> Vec3 {
        self.offset().as_vec3()
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Back,
            Direction::Back => Direction::Forward,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}
