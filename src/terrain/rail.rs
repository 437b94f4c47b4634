//! Rail riding: cart spawn, per-tick steering, and dismount.
//!
//! The cart itself belongs to the host; this handler only mounts, nudges the
//! cart's velocity toward the next rail waypoint in small fixed increments
//! (teleport-free, physically continuous motion), and dismounts at rail
//! exits or when the cart derails off the path.

use crate::agent::AgentControl;
use crate::config::RailConfig;
use crate::core::{CellPos, Direction, RailShape, WorldPos};
use crate::path::{Path, Waypoint};
use crate::terrain::TerrainOutcome;
use crate::world::WorldGrid;

/// Whether the rail handler should run for the next waypoint.
pub(crate) fn applicable(path: &Path) -> bool {
    path.next_waypoint()
        .is_some_and(|wp| wp.flags.on_rails || wp.flags.rails_exit)
}

/// Dismount checks that must run even before the rail handler itself: riding
/// with a next waypoint that is off the rails (or too far away) means the
/// ride is over regardless of how we got there.
pub(crate) fn check_dismount(
    config: &RailConfig,
    path: &Path,
    agent: &mut dyn AgentControl,
) -> bool {
    if !agent.is_riding_cart() {
        return false;
    }
    let Some(wp) = path.next_waypoint() else {
        agent.dismount_cart();
        return true;
    };

    if wp.flags.rails_exit {
        agent.dismount_cart();
        return true;
    }
    if !wp.flags.on_rails {
        agent.dismount_cart();
        return true;
    }

    // Derailed: the cart itself drifted too far off the waypoint column.
    let cart = agent.cart_position();
    if (wp.cell.x as f64 + 0.5 - cart.x).abs() > config.derail_distance
        || (wp.cell.z as f64 + 0.5 - cart.z).abs() > config.derail_distance
    {
        agent.dismount_cart();
        return true;
    }
    false
}

pub(crate) fn handle(
    config: &RailConfig,
    world: &dyn WorldGrid,
    path: &Path,
    agent: &mut dyn AgentControl,
    spawned_cart_at: &mut Option<CellPos>,
) -> TerrainOutcome {
    let Some(wp) = path.next_waypoint() else {
        return TerrainOutcome::Fallthrough;
    };

    if wp.flags.rails_entry {
        mount_if_needed(config, world, wp, agent, spawned_cart_at);
    } else {
        *spawned_cart_at = None;
    }

    if !agent.is_riding_cart() {
        return TerrainOutcome::Fallthrough;
    }

    if let Some(next) = steering_waypoint(path) {
        steer(config, wp, next, agent);
    }
    TerrainOutcome::Handled
}

fn mount_if_needed(
    config: &RailConfig,
    world: &dyn WorldGrid,
    wp: &Waypoint,
    agent: &mut dyn AgentControl,
    spawned_cart_at: &mut Option<CellPos>,
) {
    if *spawned_cart_at == Some(wp.cell) {
        return;
    }
    if !agent.is_riding_cart() {
        let ascending = world.rail_shape(wp.cell) == Some(RailShape::Ascending);
        let y_offset = config.mount_y_offset + if ascending { config.ascend_y_offset } else { 0.0 };
        let center = wp.cell.center();
        agent.mount_cart(WorldPos::new(center.x, wp.cell.y as f64 + y_offset, center.z));
    }
    *spawned_cart_at = Some(wp.cell);
}

/// Waypoint used for steering direction. Skips one waypoint when it shares
/// the current column (pure vertical step on an ascending rail).
fn steering_waypoint(path: &Path) -> Option<&Waypoint> {
    let wp = path.next_waypoint()?;
    let next = path.upcoming_waypoint()?;
    if next.cell.x == wp.cell.x && next.cell.z == wp.cell.z {
        path.waypoint(path.next_index() + 2)
    } else {
        Some(next)
    }
}

/// Nudge cart velocity toward the next waypoint's facing by a small fixed
/// increment, clamped so the cart never exceeds unit speed on either axis.
fn steer(config: &RailConfig, wp: &Waypoint, next: &Waypoint, agent: &mut dyn AgentControl) {
    let motion = agent.cart_velocity();
    let velocity = match wp.cell.xz_facing(&next.cell) {
        Direction::East => WorldPos::new((motion.x + config.nudge).clamp(0.0, 1.0), motion.y, motion.z),
        Direction::West => WorldPos::new((motion.x - config.nudge).clamp(-1.0, 0.0), motion.y, motion.z),
        Direction::South => WorldPos::new(motion.x, motion.y, (motion.z + config.nudge).clamp(0.0, 1.0)),
        Direction::North => WorldPos::new(motion.x, motion.y, (motion.z - config.nudge).clamp(-1.0, 0.0)),
        Direction::Up | Direction::Down => motion,
    };
    agent.set_cart_velocity(velocity);
}
