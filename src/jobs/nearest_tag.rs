//! Find-nearest-of-tag job.

use crate::core::CellPos;
use crate::jobs::search::{a_star, SearchGoal, SearchParams};
use crate::jobs::{PathJob, PathingOptions, SearchOutcome, SearchTicket};
use crate::world::WorldGrid;

/// Finds a route to the nearest cell carrying a world tag (trees, water and
/// the like). Runs as a uniform-cost flood from the start; the first tagged
/// cell reached is by construction the cheapest to walk to.
pub struct NearestTagJob {
    start: CellPos,
    tag: String,
    options: PathingOptions,
    follow_range: i32,
    max_iterations: usize,
}

impl NearestTagJob {
    pub fn new(
        start: CellPos,
        tag: impl Into<String>,
        options: PathingOptions,
        follow_range: i32,
        max_iterations: usize,
    ) -> Self {
        Self {
            start,
            tag: tag.into(),
            options,
            follow_range,
            max_iterations,
        }
    }
}

struct NearestTagGoal {
    tag: String,
}

impl SearchGoal for NearestTagGoal {
    fn is_goal(&self, cell: CellPos, world: &dyn WorldGrid) -> bool {
        world.has_tag(cell, &self.tag) || world.has_tag(cell.below(), &self.tag)
    }

    fn heuristic(&self, _cell: CellPos) -> f64 {
        0.0
    }
}

impl PathJob for NearestTagJob {
    fn search(&self, world: &dyn WorldGrid, ticket: &SearchTicket<'_>) -> SearchOutcome {
        let goal = NearestTagGoal {
            tag: self.tag.clone(),
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
