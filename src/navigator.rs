//! The per-agent navigator: submits path jobs and follows their results.
//!
//! One navigator owns one agent's movement. Each simulation tick it polls the
//! async computation handle, adopts a freshly published path, advances the
//! waypoint cursor, and hands the tick to at most one terrain handler. All
//! world access from this module happens on the tick thread; only the
//! scheduler workers run concurrently, and only through [`PathResult`].

use std::sync::Arc;

use crate::agent::{AgentControl, Capabilities};
use crate::config::{FollowConfig, MargaConfig};
use crate::core::{CellPos, Direction};
use crate::jobs::{
    JobKind, MoveAwayJob, MoveToJob, NearestTagJob, PathJob, PathingOptions, RandomPosJob,
};
use crate::path::{Path, Waypoint};
use crate::result::{PathResult, PathStatus};
use crate::scheduler::Scheduler;
use crate::stuck::{PathingStuckHandler, StuckContext, StuckHandler};
use crate::terrain::{ground, ladder, rail, swim, TerrainOutcome};
use crate::world::WorldGrid;

pub struct Navigator {
    scheduler: Arc<Scheduler>,
    world: Arc<dyn WorldGrid>,
    config: MargaConfig,
    /// Handle of the most recent submission, kept until a terminal status.
    result: Option<Arc<PathResult>>,
    /// Goal identity of the in-flight or followed job, for coalescing.
    active_kind: Option<JobKind>,
    path: Option<Path>,
    /// Final cell of the path being computed or followed.
    destination: Option<CellPos>,
    /// Destination as originally requested, before any nearest-approach
    /// substitution by the search.
    original_destination: Option<CellPos>,
    /// Last requested destination, kept (with a timeout) even across stop()
    /// so the owning AI can re-issue an interrupted move.
    desired_pos: Option<CellPos>,
    desired_pos_timeout: u32,
    walk_speed_factor: f64,
    swim_speed_factor: f64,
    /// Rail cell a cart was mounted at, to avoid re-mounting every tick.
    spawned_cart_at: Option<CellPos>,
    /// Whether the previous tick left the agent sneaking (ladder descent).
    is_sneaking: bool,
    was_in_liquid: bool,
    stuck_handler: Option<Box<dyn StuckHandler>>,
    generation: u64,
}

impl Navigator {
    pub fn new(world: Arc<dyn WorldGrid>, scheduler: Arc<Scheduler>, config: MargaConfig) -> Self {
        let stuck = PathingStuckHandler::from_config(&config.stuck);
        Self {
            scheduler,
            world,
            config,
            result: None,
            active_kind: None,
            path: None,
            destination: None,
            original_destination: None,
            desired_pos: None,
            desired_pos_timeout: 0,
            walk_speed_factor: 1.0,
            swim_speed_factor: 1.0,
            spawned_cart_at: None,
            is_sneaking: false,
            was_in_liquid: false,
            stuck_handler: Some(Box::new(stuck)),
            generation: 0,
        }
    }

    /// Replace the stuck handler. `None` disables stuck detection entirely.
    pub fn set_stuck_handler(&mut self, handler: Option<Box<dyn StuckHandler>>) {
        self.stuck_handler = handler;
    }

    /// Change the walking speed factor mid-follow. Out-of-range values are
    /// ignored and logged, matching the submission-time validation.
    pub fn set_speed_factor(&mut self, factor: f64) {
        let follow = &self.config.follow;
        if factor < follow.min_speed_factor || factor > follow.max_speed_factor {
            tracing::warn!(factor, "ignoring out-of-range speed factor");
            return;
        }
        self.walk_speed_factor = factor;
    }

    /// Multiplier applied to walking speed while in liquid.
    pub fn set_swim_speed_factor(&mut self, factor: f64) {
        self.swim_speed_factor = factor;
    }

    pub fn destination(&self) -> Option<CellPos> {
        self.destination
    }

    /// The last requested destination, surviving interruptions until its
    /// timeout expires. Lets the owning AI resume an aborted move.
    pub fn desired_pos(&self) -> Option<CellPos> {
        self.desired_pos
    }

    /// Waypoints of the path currently followed, for debug overlays.
    pub fn debug_waypoints(&self) -> Option<&[Waypoint]> {
        self.path.as_ref().map(|p| p.waypoints())
    }

    /// Whether nothing is being computed or followed.
    pub fn is_done(&self) -> bool {
        let pending = self.result.as_ref().is_some_and(|r| {
            r.is_computing() || r.status() == PathStatus::CalculationComplete
        });
        !pending && self.path.as_ref().is_none_or(|p| p.is_done())
    }

    /// Abandon the current computation and path, if any.
    pub fn stop(&mut self) {
        if let Some(result) = self.result.take() {
            result.cancel();
        }
        self.active_kind = None;
        self.path = None;
        self.destination = None;
        self.original_destination = None;
        self.spawned_cart_at = None;
    }

    /// Walk to `dest`. Re-requesting the destination already being computed
    /// or followed is a no-op returning the existing handle.
    pub fn move_to(
        &mut self,
        agent: &mut dyn AgentControl,
        dest: CellPos,
        speed_factor: f64,
    ) -> Option<Arc<PathResult>> {
        if let (Some(JobKind::MoveTo { dest: active }), Some(result)) =
            (&self.active_kind, &self.result)
        {
            if *active == dest
                && (result.is_computing()
                    || self.destination == Some(dest)
                    || self.original_destination == Some(dest))
            {
                return Some(Arc::clone(result));
            }
        }

        let caps = agent.capabilities();
        let job = MoveToJob::new(
            agent.cell(),
            dest,
            options_for(&caps),
            caps.follow_range,
            self.config.scheduler.max_iterations,
        );
        self.submit(
            Box::new(job),
            JobKind::MoveTo { dest },
            Some(dest),
            speed_factor,
        )
    }

    /// Walk until at least `range` cells away from `avoid`.
    pub fn move_away_from(
        &mut self,
        agent: &mut dyn AgentControl,
        avoid: CellPos,
        range: i32,
        speed_factor: f64,
    ) -> Option<Arc<PathResult>> {
        let caps = agent.capabilities();
        let job = MoveAwayJob::new(
            agent.cell(),
            avoid,
            range,
            options_for(&caps),
            caps.follow_range,
            self.config.scheduler.max_iterations,
        );
        self.submit(
            Box::new(job),
            JobKind::MoveAway { avoid, range },
            None,
            speed_factor,
        )
    }

    /// Wander to a random spot within `range` cells of the agent.
    pub fn move_to_random_pos(
        &mut self,
        agent: &mut dyn AgentControl,
        range: i32,
        speed_factor: f64,
    ) -> Option<Arc<PathResult>> {
        if let (Some(JobKind::RandomPos { center: None, .. }), Some(result)) =
            (&self.active_kind, &self.result)
        {
            if result.is_computing() {
                return Some(Arc::clone(result));
            }
        }
        self.submit_random(agent, None, range, speed_factor)
    }

    /// Wander to a random spot within `range` cells of `center`.
    pub fn move_to_random_pos_around(
        &mut self,
        agent: &mut dyn AgentControl,
        center: CellPos,
        range: i32,
        speed_factor: f64,
    ) -> Option<Arc<PathResult>> {
        if let (Some(JobKind::RandomPos { center: active, range: active_range }), Some(result)) =
            (&self.active_kind, &self.result)
        {
            if *active == Some(center) && *active_range == range && result.is_computing() {
                return Some(Arc::clone(result));
            }
        }
        self.submit_random(agent, Some(center), range, speed_factor)
    }

    /// Walk to the nearest cell carrying `tag`, searching outward up to
    /// `range` cells.
    pub fn move_to_nearest_tagged(
        &mut self,
        agent: &mut dyn AgentControl,
        tag: &str,
        range: i32,
        speed_factor: f64,
    ) -> Option<Arc<PathResult>> {
        let caps = agent.capabilities();
        let job = NearestTagJob::new(
            agent.cell(),
            tag,
            options_for(&caps),
            range.min(caps.follow_range),
            self.config.scheduler.max_iterations,
        );
        self.submit(
            Box::new(job),
            JobKind::NearestTag {
                tag: tag.to_string(),
                range,
            },
            None,
            speed_factor,
        )
    }

    fn submit_random(
        &mut self,
        agent: &mut dyn AgentControl,
        center: Option<CellPos>,
        range: i32,
        speed_factor: f64,
    ) -> Option<Arc<PathResult>> {
        let caps = agent.capabilities();
        let job = RandomPosJob::new(
            agent.cell(),
            center,
            range,
            agent.random_seed(),
            options_for(&caps),
            caps.follow_range,
            self.config.scheduler.max_iterations,
        );
        self.submit(
            Box::new(job),
            JobKind::RandomPos { center, range },
            None,
            speed_factor,
        )
    }

    /// Cancel whatever is in flight and queue a new job.
    fn submit(
        &mut self,
        job: Box<dyn PathJob>,
        kind: JobKind,
        destination: Option<CellPos>,
        speed_factor: f64,
    ) -> Option<Arc<PathResult>> {
        let follow = &self.config.follow;
        if speed_factor < follow.min_speed_factor || speed_factor > follow.max_speed_factor {
            tracing::error!(
                speed_factor,
                ?kind,
                "rejecting path job with out-of-range speed factor"
            );
            return None;
        }
        let timeout = follow.desired_pos_timeout_ticks;

        self.stop();
        self.walk_speed_factor = speed_factor;
        self.destination = destination;
        self.original_destination = destination;
        if let Some(dest) = destination {
            self.desired_pos = Some(dest);
            self.desired_pos_timeout = timeout;
        }

        self.generation += 1;
        let handle = Arc::new(PathResult::new(self.generation));
        tracing::debug!(generation = self.generation, ?kind, "submitting path job");
        self.scheduler
            .submit(job, Arc::clone(&self.world), Arc::clone(&handle));
        self.result = Some(Arc::clone(&handle));
        self.active_kind = Some(kind);
        Some(handle)
    }

    /// Drive the agent for one simulation tick.
    pub fn tick(&mut self, agent: &mut dyn AgentControl) {
        if self.desired_pos.is_some() {
            self.desired_pos_timeout = self.desired_pos_timeout.saturating_sub(1);
            if self.desired_pos_timeout == 0 {
                self.desired_pos = None;
            }
        }

        if !self.poll_result() {
            // Still computing; nothing to follow yet.
            self.check_stuck(agent);
            self.was_in_liquid = agent.is_in_liquid();
            return;
        }

        if self.is_sneaking {
            self.is_sneaking = false;
            agent.set_sneaking(false);
        }
        agent.set_vertical_intent(0.0);

        let in_liquid = agent.is_in_liquid();
        let just_entered_liquid = in_liquid && !self.was_in_liquid;

        if self.path.is_some() {
            self.follow_path(agent, just_entered_liquid);
        }

        if self.path.as_ref().is_some_and(|p| p.is_done()) {
            self.finish_path();
        }

        self.check_stuck(agent);
        self.was_in_liquid = in_liquid;
    }

    /// Poll the async handle. Returns false while a computation is pending.
    fn poll_result(&mut self) -> bool {
        let Some(result) = &self.result else {
            return true;
        };
        match result.status() {
            PathStatus::Queued | PathStatus::Calculating => false,
            PathStatus::CalculationComplete => {
                let adopted = result.generation() == self.generation;
                let path = if adopted { result.take_path() } else { None };
                match path {
                    Some(path) if !path.is_empty() => {
                        tracing::debug!(
                            generation = result.generation(),
                            waypoints = path.len(),
                            reachable = path.reachable(),
                            "adopting computed path"
                        );
                        result.start_following();
                        self.destination = path.last_cell();
                        self.path = Some(path);
                    }
                    _ => {
                        // Superseded, withdrawn, or degenerate; drop it.
                        result.cancel();
                        self.result = None;
                        self.active_kind = None;
                        self.destination = None;
                        self.original_destination = None;
                    }
                }
                true
            }
            PathStatus::Cancelled | PathStatus::Failed => {
                self.result = None;
                self.active_kind = None;
                self.destination = None;
                self.original_destination = None;
                true
            }
            PathStatus::InProgressFollowing | PathStatus::Complete => true,
        }
    }

    fn follow_path(&mut self, agent: &mut dyn AgentControl, just_entered_liquid: bool) {
        let config = &self.config;
        let world = self.world.as_ref();
        let Some(path) = self.path.as_mut() else {
            return;
        };

        rail::check_dismount(&config.rail, path, agent);
        advance_cursor(&config.follow, path, agent);
        if path.is_done() {
            return;
        }

        let outcome = if ladder::applicable(world, path, agent) {
            let tick = ladder::handle(&config.ladder, world, path, agent);
            self.is_sneaking = tick.sneaking;
            tick.outcome
        } else if agent.is_in_liquid() {
            swim::handle(
                &config.swim,
                path,
                agent,
                self.walk_speed_factor * self.swim_speed_factor,
                just_entered_liquid,
            )
        } else if rail::applicable(path) {
            rail::handle(&config.rail, world, path, agent, &mut self.spawned_cart_at)
        } else {
            TerrainOutcome::Fallthrough
        };

        if outcome == TerrainOutcome::Fallthrough {
            let speed = ground::speed_modifier(
                &config.follow,
                &config.ladder,
                world,
                path,
                agent,
                self.walk_speed_factor,
            );
            ground::handle(world, path, agent, speed);
        }
    }

    fn finish_path(&mut self) {
        tracing::debug!(destination = ?self.destination, "path fully consumed");
        if let Some(result) = self.result.take() {
            result.complete();
        }
        self.path = None;
        self.active_kind = None;
        self.destination = None;
        self.spawned_cart_at = None;
    }

    fn check_stuck(&mut self, agent: &mut dyn AgentControl) {
        let Some(mut handler) = self.stuck_handler.take() else {
            return;
        };
        let next_waypoint = self
            .path
            .as_ref()
            .and_then(|p| p.next_waypoint())
            .map(|w| w.target_pos());
        let mut ctx = StuckContext {
            agent,
            following: self.path.is_some(),
            next_waypoint,
            cancel: false,
        };
        handler.check_stuck(&mut ctx);
        let cancel = ctx.cancel;
        self.stuck_handler = Some(handler);
        if cancel {
            tracing::info!("stuck handler gave up, abandoning path");
            self.stop();
        }
    }
}

fn options_for(caps: &Capabilities) -> PathingOptions {
    PathingOptions {
        can_swim: caps.can_swim,
        can_open_doors: caps.can_open_doors,
        can_climb: caps.can_climb,
        can_use_rails: caps.can_use_rails,
    }
}

/// Advance the cursor toward the agent. Consumption is monotone except for
/// the explicit fall-behind recovery at the end.
fn advance_cursor(follow: &FollowConfig, path: &mut Path, agent: &dyn AgentControl) {
    let pos = agent.position();

    // Bottom-of-ladder hold: the final waypoint of a descent is consumed
    // exactly one at a time, and only once the agent's height has settled at
    // the ladder base; advancing earlier aims the walk target while the
    // agent is still hanging beside the ladder. Climbing ladder waypoints go
    // through the normal band below (still one at a time, being flagged).
    if let Some(wp) = path.next_waypoint() {
        if wp.flags.on_ladder
            && wp.ladder_facing == Some(Direction::Down)
            && path
                .upcoming_waypoint()
                .is_none_or(|next| !next.flags.on_ladder)
        {
            let target = wp.target_pos();
            let tol = follow.waypoint_tolerance;
            if target.horizontal_distance_sq(&pos) < tol * tol
                && (target.y - pos.y).abs() < follow.min_y_distance
            {
                path.advance();
            }
            return;
        }
    }

    // Lookahead band: consume up to `lookahead` waypoints per tick, with a
    // tolerance that tightens as the vertical offset grows. Terrain-flagged
    // waypoints stop the band so their handlers see them.
    let start = path.next_index();
    let end = (start + follow.lookahead).min(path.len());
    for i in start..end {
        let Some(&wp) = path.waypoint(i) else {
            break;
        };
        if wp.is_terrain_flagged() && i > start {
            break;
        }
        let target = wp.target_pos();
        let dy = (target.y - pos.y).abs();
        if dy >= 1.0 {
            break;
        }
        let tol = follow.waypoint_tolerance - 0.1 * dy;
        if target.horizontal_distance_sq(&pos) < tol * tol {
            path.set_next_index(i + 1);
        }
        if wp.is_terrain_flagged() {
            break;
        }
    }

    // Fall-behind recovery: if the agent drifted far from the next waypoint
    // but is standing on an already-consumed one, rewind to the earliest such
    // waypoint instead of cutting across unknown terrain.
    if path.next_index() > 0 {
        if let Some(wp) = path.next_waypoint() {
            let dist = follow.fall_behind_distance;
            if wp.target_pos().horizontal_distance_sq(&pos) > dist * dist {
                let tol = follow.fall_behind_rewind_tolerance;
                for i in 0..path.next_index() {
                    let Some(past) = path.waypoint(i) else {
                        break;
                    };
                    if past.target_pos().horizontal_distance_sq(&pos) < tol * tol {
                        path.set_next_index(i);
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorldPos;

    fn straight_path(len: i32) -> Path {
        let points = (0..len)
            .map(|x| Waypoint::new(CellPos::new(x, 0, 0)))
            .collect();
        Path::new(points, CellPos::new(len - 1, 0, 0), true)
    }

    struct StandingAgent {
        pos: WorldPos,
    }

    impl AgentControl for StandingAgent {
        fn position(&self) -> WorldPos {
            self.pos
        }
        fn is_in_liquid(&self) -> bool {
            false
        }
        fn capabilities(&self) -> Capabilities {
            Capabilities::default()
        }
        fn set_wanted_position(&mut self, _: WorldPos, _: f64) {}
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

    #[test]
    fn lookahead_consumes_multiple_nearby_waypoints() {
        let follow = FollowConfig::default();
        let mut path = straight_path(8);
        // Standing at the second waypoint's center; the first two are within
        // tolerance, the rest are not.
        let agent = StandingAgent {
            pos: WorldPos::new(1.5, 0.0, 0.5),
        };
        advance_cursor(&follow, &mut path, &agent);
        assert_eq!(path.next_index(), 2);
    }

    #[test]
    fn lookahead_band_is_bounded() {
        let follow = FollowConfig::default();
        let mut path = straight_path(8);
        let agent = StandingAgent {
            pos: WorldPos::new(6.5, 0.0, 0.5),
        };
        // Every waypoint in the band misses the tolerance except the last
        // one it can reach; the cursor never jumps past the band.
        advance_cursor(&follow, &mut path, &agent);
        assert!(path.next_index() <= follow.lookahead);
    }

    #[test]
    fn flagged_waypoint_stops_the_band() {
        let follow = FollowConfig::default();
        let mut points: Vec<Waypoint> = (0..5)
            .map(|x| Waypoint::new(CellPos::new(x, 0, 0)))
            .collect();
        points[1].flags.on_rails = true;
        points[1].flags.rails_entry = true;
        let mut path = Path::new(points, CellPos::new(4, 0, 0), true);

        // Standing past the rail entry; without the gate the band would
        // swallow it and the cart would never be mounted.
        let agent = StandingAgent {
            pos: WorldPos::new(2.5, 0.0, 0.5),
        };
        advance_cursor(&follow, &mut path, &agent);
        assert_eq!(path.next_index(), 0);

        // Once the flagged waypoint is itself next, it is consumed normally.
        path.set_next_index(1);
        let agent = StandingAgent {
            pos: WorldPos::new(1.5, 0.0, 0.5),
        };
        advance_cursor(&follow, &mut path, &agent);
        assert_eq!(path.next_index(), 2);
    }

    #[test]
    fn ladder_bottom_hold_requires_settled_height() {
        let follow = FollowConfig::default();
        let mut points = vec![
            Waypoint::new(CellPos::new(2, 0, 0)),
            Waypoint::new(CellPos::new(3, 0, 0)),
        ];
        points[0].flags.on_ladder = true;
        points[0].ladder_facing = Some(Direction::Down);
        let mut path = Path::new(points, CellPos::new(3, 0, 0), true);

        // Centered on the column but still sliding down: no advance.
        let agent = StandingAgent {
            pos: WorldPos::new(2.5, 0.4, 0.5),
        };
        advance_cursor(&follow, &mut path, &agent);
        assert_eq!(path.next_index(), 0);

        // Settled at the base: advance exactly one.
        let agent = StandingAgent {
            pos: WorldPos::new(2.5, 0.0, 0.5),
        };
        advance_cursor(&follow, &mut path, &agent);
        assert_eq!(path.next_index(), 1);
    }

    #[test]
    fn climbing_rung_consumed_without_exact_height_match() {
        let follow = FollowConfig::default();
        let mut points = vec![
            Waypoint::new(CellPos::new(2, 1, 0)),
            Waypoint::new(CellPos::new(2, 2, 0)),
        ];
        for wp in &mut points {
            wp.flags.on_ladder = true;
            wp.ladder_facing = Some(Direction::North);
        }
        let mut path = Path::new(points, CellPos::new(2, 2, 0), true);

        // Partway up the climb, hugging the biased ladder column; a body in
        // motion never matches a rung's height exactly.
        let agent = StandingAgent {
            pos: WorldPos::new(2.5, 0.7, 0.9),
        };
        advance_cursor(&follow, &mut path, &agent);
        assert_eq!(path.next_index(), 1);
    }

    #[test]
    fn fallen_behind_cursor_rewinds_to_past_waypoint() {
        let follow = FollowConfig::default();
        let mut path = straight_path(10);
        path.set_next_index(7);
        // Standing back at waypoint 2, far from waypoint 7.
        let agent = StandingAgent {
            pos: WorldPos::new(2.5, 0.0, 0.5),
        };
        advance_cursor(&follow, &mut path, &agent);
        assert_eq!(path.next_index(), 2);
    }
}
