//! Ladder climbing and descending.
//!
//! Climbing biases the movement target into the ladder column and slows down
//! so the agent centers itself before ascending; descending holds horizontal
//! position, sneaks, and applies only vertical intent. The handler re-checks
//! that the ladder block still exists so a removed ladder degrades to generic
//! movement instead of an endless climb attempt.

use crate::agent::AgentControl;
use crate::config::LadderConfig;
use crate::core::{CellPos, Direction};
use crate::path::Path;
use crate::terrain::TerrainOutcome;
use crate::world::WorldGrid;

/// Whether the ladder handler should run for the next waypoint.
pub(crate) fn applicable(world: &dyn WorldGrid, path: &Path, agent: &dyn AgentControl) -> bool {
    let (Some(wp), Some(next)) = (path.next_waypoint(), path.upcoming_waypoint()) else {
        return false;
    };
    wp.flags.on_ladder
        && (wp.cell.y != next.cell.y || agent.position().y > wp.cell.y as f64)
        && world.ladder_facing(wp.cell).is_some()
}

/// Result of a ladder tick; the navigator mirrors `sneaking` into its own
/// transient state so it can be cleared next tick.
pub(crate) struct LadderTick {
    pub outcome: TerrainOutcome,
    pub sneaking: bool,
}

pub(crate) fn handle(
    config: &LadderConfig,
    world: &dyn WorldGrid,
    path: &Path,
    agent: &mut dyn AgentControl,
) -> LadderTick {
    let Some(wp) = path.next_waypoint() else {
        return LadderTick {
            outcome: TerrainOutcome::Fallthrough,
            sneaking: false,
        };
    };

    let pos = agent.position();
    let target = wp.target_pos();

    // Only take over once the agent is close to the ladder column.
    let close_enough = target.horizontal_distance_sq(&pos) < config.gate_distance_sq
        && (target.y - pos.y.floor()).abs() <= config.gate_y;
    if !close_enough {
        return LadderTick {
            outcome: TerrainOutcome::Fallthrough,
            sneaking: false,
        };
    }

    match wp.ladder_facing {
        Some(Direction::Down) | None => descend(config, world, agent, target),
        Some(facing) => climb(config, world, agent, target, facing),
    }
}

fn climb(
    config: &LadderConfig,
    world: &dyn WorldGrid,
    agent: &mut dyn AgentControl,
    target: crate::core::WorldPos,
    facing: Direction,
) -> LadderTick {
    // Bias the target away from the mounting wall so the agent hugs the
    // ladder column while gaining height.
    let biased = match facing {
        Direction::Up => target.add(0.0, 1.0, 0.0),
        _ => {
            let (dx, dz) = facing.opposite().step();
            target.add(dx as f64 * config.climb_bias, 0.0, dz as f64 * config.climb_bias)
        }
    };

    // At the ladder base the agent's own cell is not yet a ladder; a one-off
    // upward nudge keeps it from clipping the block edge.
    if world.ladder_facing(agent.cell()).is_none() {
        agent.add_velocity(0.0, config.edge_nudge, 0.0);
    }
    agent.set_wanted_position(biased, config.climb_speed);

    LadderTick {
        outcome: TerrainOutcome::Handled,
        sneaking: false,
    }
}

fn descend(
    config: &LadderConfig,
    world: &dyn WorldGrid,
    agent: &mut dyn AgentControl,
    target: crate::core::WorldPos,
) -> LadderTick {
    agent.set_sneaking(true);
    agent.set_wanted_position(target, config.descend_speed);

    let below = CellPos::containing(agent.position()).below();
    if world.ladder_facing(below).is_some() {
        agent.set_vertical_intent(config.descend_intent);
        LadderTick {
            outcome: TerrainOutcome::Handled,
            sneaking: true,
        }
    } else {
        // Bottom of the ladder; generic movement walks off it.
        LadderTick {
            outcome: TerrainOutcome::Fallthrough,
            sneaking: true,
        }
    }
}
