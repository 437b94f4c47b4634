//! Generic ground movement: the default when no terrain feature applies.

use crate::agent::AgentControl;
use crate::config::{FollowConfig, LadderConfig};
use crate::core::{CellPos, WorldPos};
use crate::path::Path;
use crate::world::WorldGrid;

/// Vertical target for moving into `cell`, corrected for blocks below whose
/// collision shape does not fill their cell. Without this the agent aims at
/// the wrong height and steps into the block above.
pub(crate) fn smart_ground_y(world: &dyn WorldGrid, cell: CellPos) -> f64 {
    let below = cell.below();
    let height = world.collision_height(below);
    if height < 1.0 {
        cell.y as f64
    } else {
        below.y as f64 + height
    }
}

/// Cell supporting the agent, sampled slightly below its feet.
pub(crate) fn cell_under_agent(agent: &dyn AgentControl) -> CellPos {
    let pos = agent.position();
    CellPos::new(
        pos.x.round() as i32,
        (pos.y - 0.2).floor() as i32,
        pos.z.round() as i32,
    )
}

/// Per-tick speed modifier for generic movement: slower while lining up with
/// an upcoming ladder, faster on path-tagged road surfaces.
pub(crate) fn speed_modifier(
    follow: &FollowConfig,
    ladder: &LadderConfig,
    world: &dyn WorldGrid,
    path: &Path,
    agent: &dyn AgentControl,
    base_speed: f64,
) -> f64 {
    let entering_ladder = match (path.next_waypoint(), path.upcoming_waypoint()) {
        (Some(current), Some(next)) => !current.flags.on_ladder && next.flags.on_ladder,
        _ => false,
    };
    if entering_ladder {
        base_speed / ladder.approach_speed_divisor
    } else if world.is_path_surface(cell_under_agent(agent)) {
        follow.on_path_speed_multiplier * base_speed
    } else {
        base_speed
    }
}

/// Move toward the next waypoint's center at the given speed. Skips the tick
/// when the target cell is not loaded; the search's view of the world may be
/// stale and the live world wins.
pub(crate) fn handle(
    world: &dyn WorldGrid,
    path: &Path,
    agent: &mut dyn AgentControl,
    speed: f64,
) {
    let Some(wp) = path.next_waypoint() else {
        return;
    };
    let cell = wp.cell;
    if !world.is_loaded(cell) {
        return;
    }

    let center = cell.center();
    let y = smart_ground_y(world, cell);
    agent.set_wanted_position(WorldPos::new(center.x, y, center.z), speed);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ShapedWorld {
        below_height: f64,
    }

    impl WorldGrid for ShapedWorld {
        fn is_loaded(&self, _: CellPos) -> bool {
            true
        }
        fn is_solid(&self, cell: CellPos) -> bool {
            cell.y < 0
        }
        fn collision_height(&self, cell: CellPos) -> f64 {
            if cell.y < 0 {
                self.below_height
            } else {
                0.0
            }
        }
        fn is_liquid(&self, _: CellPos) -> bool {
            false
        }
        fn ladder_facing(&self, _: CellPos) -> Option<crate::core::Direction> {
            None
        }
        fn rail_shape(&self, _: CellPos) -> Option<crate::core::RailShape> {
            None
        }
        fn is_door(&self, _: CellPos) -> bool {
            false
        }
        fn is_path_surface(&self, _: CellPos) -> bool {
            false
        }
        fn has_tag(&self, _: CellPos, _: &str) -> bool {
            false
        }
    }

    #[test]
    fn smart_ground_y_uses_cell_floor_for_short_blocks() {
        let world = ShapedWorld { below_height: 0.5 };
        assert_eq!(smart_ground_y(&world, CellPos::new(0, 0, 0)), 0.0);
    }

    #[test]
    fn smart_ground_y_raises_target_for_tall_blocks() {
        // A fence-like block reaching into the cell above.
        let world = ShapedWorld { below_height: 1.5 };
        let y = smart_ground_y(&world, CellPos::new(0, 0, 0));
        assert!((y - 0.5).abs() < 1e-9);
    }
}
