//! Shared A* search core over the voxel grid.
//!
//! All goal variants reuse this expansion loop; they differ only in their
//! goal predicate and heuristic. The search always produces a usable path:
//! when the goal cannot be reached it reconstructs the route to the expanded
//! node that came closest, marked `reachable == false`.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::core::{CellPos, Direction};
use crate::jobs::{PathingOptions, SearchOutcome, SearchTicket};
use crate::path::{Path, Waypoint, WaypointFlags};
use crate::world::WorldGrid;

const STEP_COST: f64 = 1.0;
const CLIMB_COST: f64 = 1.5;

/// Goal predicate and heuristic for one search.
pub(crate) trait SearchGoal {
    fn is_goal(&self, cell: CellPos, world: &dyn WorldGrid) -> bool;
    fn heuristic(&self, cell: CellPos) -> f64;
    /// Target cell recorded on the resulting path. Defaults to wherever the
    /// search ended; move-to goals override this with their destination.
    fn path_target(&self, end: CellPos) -> CellPos {
        end
    }
}

pub(crate) struct SearchParams<'a> {
    pub start: CellPos,
    pub options: PathingOptions,
    pub follow_range: i32,
    pub max_iterations: usize,
    pub ticket: &'a SearchTicket<'a>,
}

#[derive(Clone, Copy, Debug)]
struct Node {
    cell: CellPos,
    g_cost: f64,
    f_cost: f64,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.f_cost == other.f_cost
    }
}
impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on f-cost.
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Run an A* search from `params.start` toward `goal`.
pub(crate) fn a_star(
    world: &dyn WorldGrid,
    params: &SearchParams<'_>,
    goal: &dyn SearchGoal,
) -> SearchOutcome {
    if !world.is_loaded(params.start) {
        return SearchOutcome::Aborted;
    }

    let mut open_set = BinaryHeap::new();
    let mut closed_set = HashSet::new();
    let mut came_from: HashMap<CellPos, CellPos> = HashMap::new();
    let mut g_scores: HashMap<CellPos, f64> = HashMap::new();

    let h_start = goal.heuristic(params.start);
    open_set.push(Node {
        cell: params.start,
        g_cost: 0.0,
        f_cost: h_start,
    });
    g_scores.insert(params.start, 0.0);

    // Best-heuristic node seen so far, for the unreachable fallback.
    let mut best_cell = params.start;
    let mut best_h = h_start;

    let mut nodes_expanded = 0usize;

    while let Some(current) = open_set.pop() {
        if params.ticket.cancelled() {
            return SearchOutcome::Cancelled;
        }

        nodes_expanded += 1;
        if nodes_expanded > params.max_iterations {
            tracing::debug!(
                "search hit iteration cap ({}) from {:?}, falling back to closest node",
                params.max_iterations,
                params.start
            );
            break;
        }

        if closed_set.contains(&current.cell) {
            continue;
        }
        closed_set.insert(current.cell);

        if !world.is_loaded(current.cell) {
            return SearchOutcome::Aborted;
        }

        if goal.is_goal(current.cell, world) {
            let cells = reconstruct(&came_from, current.cell);
            let target = goal.path_target(current.cell);
            return SearchOutcome::Found(build_path(world, &params.options, cells, target, true));
        }

        let h = goal.heuristic(current.cell);
        if h < best_h {
            best_h = h;
            best_cell = current.cell;
        }

        for (neighbor, step_cost) in neighbors(world, &params.options, current.cell) {
            if closed_set.contains(&neighbor) {
                continue;
            }
            if params.start.manhattan(&neighbor) > params.follow_range {
                continue;
            }

            let tentative_g = current.g_cost + step_cost;
            let known = g_scores.get(&neighbor).copied().unwrap_or(f64::INFINITY);
            if tentative_g < known {
                g_scores.insert(neighbor, tentative_g);
                came_from.insert(neighbor, current.cell);
                open_set.push(Node {
                    cell: neighbor,
                    g_cost: tentative_g,
                    f_cost: tentative_g + goal.heuristic(neighbor),
                });
            }
        }
    }

    // Goal never reached: best-effort path to the nearest approachable cell.
    let cells = reconstruct(&came_from, best_cell);
    let target = goal.path_target(best_cell);
    SearchOutcome::Found(build_path(world, &params.options, cells, target, false))
}

fn reconstruct(came_from: &HashMap<CellPos, CellPos>, end: CellPos) -> Vec<CellPos> {
    let mut cells = vec![end];
    let mut current = end;
    while let Some(&prev) = came_from.get(&current) {
        cells.push(prev);
        current = prev;
    }
    cells.reverse();
    cells
}

/// Whether an agent body (one cell wide, two tall) can occupy the cell.
fn body_fits(world: &dyn WorldGrid, options: &PathingOptions, cell: CellPos) -> bool {
    passable(world, options, cell) && passable(world, options, cell.above())
}

fn passable(world: &dyn WorldGrid, options: &PathingOptions, cell: CellPos) -> bool {
    if world.is_solid(cell) {
        return world.is_door(cell) && options.can_open_doors;
    }
    if world.is_liquid(cell) && !options.can_swim {
        return false;
    }
    true
}

/// Whether the agent can rest at this cell (floor, ladder, rail, or liquid).
fn standable(world: &dyn WorldGrid, options: &PathingOptions, cell: CellPos) -> bool {
    if !body_fits(world, options, cell) {
        return false;
    }
    world.is_solid(cell.below())
        || world.ladder_facing(cell).is_some()
        || world.rail_shape(cell).is_some()
        || (world.is_liquid(cell) && options.can_swim)
}

fn neighbors(
    world: &dyn WorldGrid,
    options: &PathingOptions,
    cell: CellPos,
) -> Vec<(CellPos, f64)> {
    let mut result = Vec::with_capacity(8);

    for dir in [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ] {
        let (dx, dz) = dir.step();
        let level = cell.offset(dx, 0, dz);

        if standable(world, options, level) {
            result.push((level, STEP_COST));
            continue;
        }

        // Step up one block: needs headroom above the current cell.
        let up = level.above();
        if standable(world, options, up) && passable(world, options, cell.offset(0, 2, 0)) {
            result.push((up, CLIMB_COST));
            continue;
        }

        // Step down one block.
        let down = level.below();
        if body_fits(world, options, level) && standable(world, options, down) {
            result.push((down, CLIMB_COST));
        }
    }

    // Vertical movement on ladders.
    if options.can_climb && world.ladder_facing(cell).is_some() {
        let up = cell.above();
        if body_fits(world, options, up)
            && (world.ladder_facing(up).is_some() || standable(world, options, up))
        {
            result.push((up, CLIMB_COST));
        }
        let down = cell.below();
        if body_fits(world, options, down) && standable(world, options, down) {
            result.push((down, CLIMB_COST));
        }
    }

    // Vertical movement through liquid.
    if options.can_swim && world.is_liquid(cell) {
        let up = cell.above();
        if body_fits(world, options, up) && world.is_liquid(up) {
            result.push((up, CLIMB_COST));
        }
        let down = cell.below();
        if body_fits(world, options, down) && world.is_liquid(down) {
            result.push((down, CLIMB_COST));
        }
    }

    result
}

/// Annotate the cell route with terrain flags. Runs once at construction;
/// the navigator never recomputes flags mid-follow.
fn build_path(
    world: &dyn WorldGrid,
    options: &PathingOptions,
    cells: Vec<CellPos>,
    target: CellPos,
    reachable: bool,
) -> Path {
    let n = cells.len();
    let mut points = Vec::with_capacity(n);

    for (i, &cell) in cells.iter().enumerate() {
        let mut wp = Waypoint::new(cell);
        let mut flags = WaypointFlags::default();

        if let Some(facing) = world.ladder_facing(cell) {
            flags.on_ladder = true;
            let next_down = cells.get(i + 1).is_some_and(|next| next.y < cell.y);
            wp.ladder_facing = Some(if next_down { Direction::Down } else { facing });
        }

        if options.can_use_rails && world.rail_shape(cell).is_some() {
            let prev_rail = i > 0 && world.rail_shape(cells[i - 1]).is_some();
            let next_rail = cells
                .get(i + 1)
                .is_some_and(|&next| world.rail_shape(next).is_some());
            flags.on_rails = true;
            flags.rails_entry = !prev_rail;
            flags.rails_exit = !next_rail;
        }

        flags.on_path_surface = world.is_path_surface(cell.below());

        wp.flags = flags;
        points.push(wp);
    }

    Path::new(points, target, reachable)
}
