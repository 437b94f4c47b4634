//! Fundamental value types shared across the crate.
//!
//! World cells are integer voxel coordinates; agents move through continuous
//! space measured in the same units (one cell = one unit). Y is up.

use serde::{Deserialize, Serialize};

/// Integer voxel cell coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Center of the cell at floor level.
    pub fn center(&self) -> WorldPos {
        WorldPos::new(self.x as f64 + 0.5, self.y as f64, self.z as f64 + 0.5)
    }

    pub fn below(&self) -> Self {
        Self::new(self.x, self.y - 1, self.z)
    }

    pub fn above(&self) -> Self {
        Self::new(self.x, self.y + 1, self.z)
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Cell the given continuous position falls into.
    pub fn containing(pos: WorldPos) -> Self {
        Self::new(
            pos.x.floor() as i32,
            pos.y.floor() as i32,
            pos.z.floor() as i32,
        )
    }

    pub fn manhattan(&self, other: &CellPos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }

    pub fn distance_sq(&self, other: &CellPos) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dz = (self.z - other.z) as f64;
        dx * dx + dy * dy + dz * dz
    }

    /// Horizontal (XZ) facing from this cell toward `other`, dominant axis wins.
    pub fn xz_facing(&self, other: &CellPos) -> Direction {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        if dx.abs() >= dz.abs() {
            if dx >= 0 {
                Direction::East
            } else {
                Direction::West
            }
        } else if dz >= 0 {
            Direction::South
        } else {
            Direction::North
        }
    }
}

/// Continuous position in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPos {
    pub const ZERO: WorldPos = WorldPos {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn add(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn distance_sq(&self, other: &WorldPos) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &WorldPos) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Squared distance ignoring the vertical component.
    pub fn horizontal_distance_sq(&self, other: &WorldPos) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }
}

/// Cardinal and vertical directions. North is -Z, East is +X.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Unit step for horizontal directions, zero for vertical.
    pub fn step(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Up | Direction::Down => (0, 0),
        }
    }
}

/// Shape of a rail block, as far as navigation cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RailShape {
    Flat,
    Ascending,
}
