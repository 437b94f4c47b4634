//! Move-away-from-point job.

use crate::core::CellPos;
use crate::jobs::search::{a_star, SearchGoal, SearchParams};
use crate::jobs::{PathJob, PathingOptions, SearchOutcome, SearchTicket};
use crate::world::WorldGrid;

/// Finds a route to any cell at least `range` away from `avoid`.
pub struct MoveAwayJob {
    start: CellPos,
    avoid: CellPos,
    range: i32,
    options: PathingOptions,
    follow_range: i32,
    max_iterations: usize,
}

impl MoveAwayJob {
    pub fn new(
        start: CellPos,
        avoid: CellPos,
        range: i32,
        options: PathingOptions,
        follow_range: i32,
        max_iterations: usize,
    ) -> Self {
        Self {
            start,
            avoid,
            range,
            options,
            follow_range,
            max_iterations,
        }
    }
}

struct MoveAwayGoal {
    avoid: CellPos,
    range_sq: f64,
    range: f64,
}

impl SearchGoal for MoveAwayGoal {
    fn is_goal(&self, cell: CellPos, _world: &dyn WorldGrid) -> bool {
        cell.distance_sq(&self.avoid) >= self.range_sq
    }

    /// Distance still missing to the escape radius.
    fn heuristic(&self, cell: CellPos) -> f64 {
        (self.range - cell.distance_sq(&self.avoid).sqrt()).max(0.0)
    }
}

impl PathJob for MoveAwayJob {
    fn search(&self, world: &dyn WorldGrid, ticket: &SearchTicket<'_>) -> SearchOutcome {
        let range = self.range as f64;
        let goal = MoveAwayGoal {
            avoid: self.avoid,
            range_sq: range * range,
            range,
        };
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
