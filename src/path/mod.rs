//! The path model: waypoints with terrain flags and a cursor-consuming path.
//!
//! Waypoint content is immutable once a path is built; the only mutable part
//! of a [`Path`] is its cursor, which the navigator advances as the agent
//! progresses. Terrain flags are computed once during path construction and
//! never recomputed while following.

use crate::core::{CellPos, Direction, WorldPos};

/// Terrain metadata attached to a waypoint during path construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaypointFlags {
    pub on_ladder: bool,
    pub on_rails: bool,
    pub rails_entry: bool,
    pub rails_exit: bool,
    pub on_path_surface: bool,
}

/// One discrete world-cell step in a computed path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    pub cell: CellPos,
    pub flags: WaypointFlags,
    pub ladder_facing: Option<Direction>,
}

impl Waypoint {
    pub fn new(cell: CellPos) -> Self {
        Self {
            cell,
            flags: WaypointFlags::default(),
            ladder_facing: None,
        }
    }

    /// Position an agent should aim for when heading to this waypoint.
    pub fn target_pos(&self) -> WorldPos {
        self.cell.center()
    }

    /// Whether the waypoint needs terrain-specific handling and must not be
    /// skipped by the lookahead band.
    pub fn is_terrain_flagged(&self) -> bool {
        self.flags.on_ladder || self.flags.on_rails || self.flags.rails_entry || self.flags.rails_exit
    }
}

/// An ordered sequence of waypoints toward a target cell.
///
/// `reachable == false` means the search ended at the closest approachable
/// cell instead of the goal itself; the path is still worth following.
#[derive(Clone, Debug)]
pub struct Path {
    points: Vec<Waypoint>,
    target: CellPos,
    reachable: bool,
    next_index: usize,
}

impl Path {
    pub fn new(points: Vec<Waypoint>, target: CellPos, reachable: bool) -> Self {
        Self {
            points,
            target,
            reachable,
            next_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn target(&self) -> CellPos {
        self.target
    }

    pub fn reachable(&self) -> bool {
        self.reachable
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.points
    }

    pub fn waypoint(&self, index: usize) -> Option<&Waypoint> {
        self.points.get(index)
    }

    /// Index of the next unconsumed waypoint.
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Next unconsumed waypoint, if any remain.
    pub fn next_waypoint(&self) -> Option<&Waypoint> {
        self.points.get(self.next_index)
    }

    /// Waypoint after the next unconsumed one.
    pub fn upcoming_waypoint(&self) -> Option<&Waypoint> {
        self.points.get(self.next_index + 1)
    }

    /// Cell of the final waypoint.
    pub fn last_cell(&self) -> Option<CellPos> {
        self.points.last().map(|w| w.cell)
    }

    /// Whether every waypoint has been consumed.
    pub fn is_done(&self) -> bool {
        self.next_index >= self.points.len()
    }

    /// Consume the next waypoint.
    pub fn advance(&mut self) {
        if self.next_index < self.points.len() {
            self.next_index += 1;
        }
    }

    /// Explicitly reposition the cursor. The only legitimate rewinds are
    /// swim-entry spin-back and fall-behind recovery; everything else should
    /// go through [`Path::advance`].
    pub fn set_next_index(&mut self, index: usize) {
        self.next_index = index.min(self.points.len());
    }
}
