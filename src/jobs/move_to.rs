//! Move-to-point job.

use crate::core::CellPos;
use crate::jobs::search::{a_star, SearchGoal, SearchParams};
use crate::jobs::{PathJob, PathingOptions, SearchOutcome, SearchTicket};
use crate::world::WorldGrid;

/// Finds a route from `start` to `dest`. When `dest` cannot be reached the
/// job still completes with a best-effort path to the closest expanded cell.
pub struct MoveToJob {
    start: CellPos,
    dest: CellPos,
    options: PathingOptions,
    follow_range: i32,
    max_iterations: usize,
}

impl MoveToJob {
    pub fn new(
        start: CellPos,
        dest: CellPos,
        options: PathingOptions,
        follow_range: i32,
        max_iterations: usize,
    ) -> Self {
        Self {
            start,
            dest,
            options,
            follow_range,
            max_iterations,
        }
    }
}

struct MoveToGoal {
    dest: CellPos,
}

impl SearchGoal for MoveToGoal {
    fn is_goal(&self, cell: CellPos, _world: &dyn WorldGrid) -> bool {
        cell == self.dest
    }

    fn heuristic(&self, cell: CellPos) -> f64 {
        cell.distance_sq(&self.dest).sqrt()
    }

    fn path_target(&self, _end: CellPos) -> CellPos {
        self.dest
    }
}

impl PathJob for MoveToJob {
    fn search(&self, world: &dyn WorldGrid, ticket: &SearchTicket<'_>) -> SearchOutcome {
        let goal = MoveToGoal { dest: self.dest };
        let params = SearchParams {
            start: self.start,
            options: self.options,
            follow_range: self.follow_range,
            max_iterations: self.max_iterations,
            ticket,
        };
        a_star(world, &params, &goal)
    }
}
