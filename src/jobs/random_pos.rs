//! Random-wander job.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::core::CellPos;
use crate::jobs::search::{a_star, SearchGoal, SearchParams};
use crate::jobs::{PathJob, PathingOptions, SearchOutcome, SearchTicket};
use crate::world::WorldGrid;

/// How close to the jittered target counts as arrived (squared cells).
const ARRIVAL_SQ: f64 = 4.0;
const TARGET_ATTEMPTS: usize = 8;

/// Finds a route to a randomly jittered cell within `range` of `center`
/// (or of `start` when no center is given).
///
/// The random target is derived from a seed captured at submission time so
/// the search itself stays deterministic on the worker.
pub struct RandomPosJob {
    start: CellPos,
    center: Option<CellPos>,
    range: i32,
    seed: u64,
    options: PathingOptions,
    follow_range: i32,
    max_iterations: usize,
}

impl RandomPosJob {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        start: CellPos,
        center: Option<CellPos>,
        range: i32,
        seed: u64,
        options: PathingOptions,
        follow_range: i32,
        max_iterations: usize,
    ) -> Self {
        Self {
            start,
            center,
            range,
            seed,
            options,
            follow_range,
            max_iterations,
        }
    }

    fn pick_target(&self, world: &dyn WorldGrid) -> CellPos {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let center = self.center.unwrap_or(self.start);
        let range = self.range.max(1);

        let mut candidate = center;
        for _ in 0..TARGET_ATTEMPTS {
            candidate = CellPos::new(
                center.x + rng.gen_range(-range..=range),
                center.y + rng.gen_range(-2..=2),
                center.z + rng.gen_range(-range..=range),
            );
            if world.is_loaded(candidate) && !world.is_solid(candidate) {
                return candidate;
            }
        }
        candidate
    }
}

struct RandomPosGoal {
    target: CellPos,
}

impl SearchGoal for RandomPosGoal {
    fn is_goal(&self, cell: CellPos, _world: &dyn WorldGrid) -> bool {
        cell.distance_sq(&self.target) <= ARRIVAL_SQ
    }

    fn heuristic(&self, cell: CellPos) -> f64 {
        cell.distance_sq(&self.target).sqrt()
    }
}

impl PathJob for RandomPosJob {
    fn search(&self, world: &dyn WorldGrid, ticket: &SearchTicket<'_>) -> SearchOutcome {
        let goal = RandomPosGoal {
            target: self.pick_target(world),
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
