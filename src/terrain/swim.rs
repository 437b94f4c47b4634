//! Swimming: relaxed waypoint tolerance while in liquid.
//!
//! Liquid movement is sloppy: the body drifts vertically and strict
//! alignment with waypoint centers never happens. Waypoints are consumed on
//! a squared-distance test that ignores exact vertical alignment, and on
//! liquid entry from above the cursor is rewound one step so the agent does
//! not spin back toward the waypoint it overshot while falling in.

use crate::agent::AgentControl;
use crate::config::SwimConfig;
use crate::path::Path;
use crate::terrain::TerrainOutcome;

pub(crate) fn handle(
    config: &SwimConfig,
    path: &mut Path,
    agent: &mut dyn AgentControl,
    speed: f64,
    just_entered_liquid: bool,
) -> TerrainOutcome {
    // Spin-back workaround: the drop into liquid lets the lookahead consume
    // the splash-down waypoint while the agent is still falling past it.
    // Rewind one step so it is re-consumed on the relaxed test instead of the
    // agent turning back for the waypoint it never properly reached.
    if just_entered_liquid {
        let idx = path.next_index();
        if idx > 0 && idx + 1 < path.len() {
            let agent_y = agent.cell().y;
            if path.waypoint(idx - 1).is_some_and(|w| w.cell.y == agent_y) {
                path.set_next_index(idx - 1);
            }
        }
    }

    let pos = agent.position();
    if let Some(wp) = path.next_waypoint() {
        let target = wp.target_pos();
        if target.horizontal_distance_sq(&pos) < config.tolerance_sq
            && (pos.y - target.y).abs() < config.y_tolerance
        {
            path.advance();
        }
    }

    if path.is_done() {
        return TerrainOutcome::Handled;
    }

    if let Some(wp) = path.next_waypoint() {
        agent.set_wanted_position(wp.target_pos(), speed);
    }
    TerrainOutcome::Handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CellPos, WorldPos};
    use crate::path::Waypoint;

    fn descending_path() -> Path {
        // Drop from y=3 into liquid at y=0.
        let cells = [(0, 3, 0), (0, 0, 0), (1, 0, 0), (2, 0, 0)];
        let points = cells
            .iter()
            .map(|&(x, y, z)| Waypoint::new(CellPos::new(x, y, z)))
            .collect();
        Path::new(points, CellPos::new(2, 0, 0), true)
    }

    #[test]
    fn entry_from_above_rewinds_one_step() {
        let mut path = descending_path();
        path.set_next_index(2);

        let mut agent = SwimAgent::at(WorldPos::new(0.5, 0.2, 0.5));
        handle(&SwimConfig::default(), &mut path, &mut agent, 1.0, true);
        // Rewound to index 1, then re-consumed by the relaxed tolerance.
        assert_eq!(path.next_index(), 2);
    }

    #[test]
    fn no_rewind_when_already_swimming() {
        let mut path = descending_path();
        path.set_next_index(2);

        let mut agent = SwimAgent::at(WorldPos::new(8.0, 0.0, 8.0));
        handle(&SwimConfig::default(), &mut path, &mut agent, 1.0, false);
        assert_eq!(path.next_index(), 2);
    }

    #[test]
    fn relaxed_tolerance_ignores_small_vertical_drift() {
        let mut path = descending_path();
        path.set_next_index(2);

        // Slightly above the waypoint center; strict alignment would fail.
        let mut agent = SwimAgent::at(WorldPos::new(1.5, 0.4, 0.5));
        handle(&SwimConfig::default(), &mut path, &mut agent, 1.0, false);
        assert_eq!(path.next_index(), 3);
    }

    struct SwimAgent {
        pos: WorldPos,
        wanted: Option<(WorldPos, f64)>,
    }

    impl SwimAgent {
        fn at(pos: WorldPos) -> Self {
            Self { pos, wanted: None }
        }
    }

    impl AgentControl for SwimAgent {
        fn position(&self) -> WorldPos {
            self.pos
        }
        fn is_in_liquid(&self) -> bool {
            true
        }
        fn capabilities(&self) -> crate::agent::Capabilities {
            crate::agent::Capabilities::default()
        }
        fn set_wanted_position(&mut self, target: WorldPos, speed: f64) {
            self.wanted = Some((target, speed));
        }
        fn set_vertical_intent(&mut self, _: f64) {}
        fn add_velocity(&mut self, _: f64, _: f64, _: f64) {}
        fn set_sneaking(&mut self, _: bool) {}
        fn teleport(&mut self, _: WorldPos) {}
        fn damage(&mut self, _: f32) {}
        fn next_random(&mut self, _: i32) -> i32 {
            0
        }
        fn random_seed(&mut self) -> u64 {
            0
        }
        fn is_riding_cart(&self) -> bool {
            false
        }
        fn mount_cart(&mut self, _: WorldPos) {}
        fn dismount_cart(&mut self) {}
        fn cart_position(&self) -> WorldPos {
            WorldPos::ZERO
        }
        fn cart_velocity(&self) -> WorldPos {
            WorldPos::ZERO
        }
        fn set_cart_velocity(&mut self, _: WorldPos) {}
    }
}
