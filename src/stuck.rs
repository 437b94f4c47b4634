//! Stuck detection and recovery.
//!
//! A sliding displacement window catches agents that stopped making progress
//! while a path is nominally being followed. Recovery escalates: first small
//! nudges (optionally with a sting of damage so the host notices), then a
//! teleport to the next waypoint, and finally a request to abandon the path
//! entirely so the owning AI can re-plan.

use crate::agent::AgentControl;
use crate::config::StuckConfig;
use crate::core::WorldPos;

/// Everything a stuck handler may inspect or act on during one tick.
pub struct StuckContext<'a> {
    /// The agent being navigated.
    pub agent: &'a mut dyn AgentControl,
    /// Whether a path is currently being followed.
    pub following: bool,
    /// Center of the next unconsumed waypoint, if any.
    pub next_waypoint: Option<WorldPos>,
    /// Set by the handler to ask the navigator to abandon the current path.
    pub cancel: bool,
}

/// Ticked by the navigator once per tick, following or not.
pub trait StuckHandler: Send {
    fn check_stuck(&mut self, ctx: &mut StuckContext<'_>);
}

/// Default stuck handler: displacement window with nudge/teleport escalation.
pub struct PathingStuckHandler {
    config: StuckConfig,
    window_start: Option<WorldPos>,
    ticks_in_window: u32,
    stuck_level: u32,
    nudged_this_window: bool,
    full_stuck_count: u32,
}

impl PathingStuckHandler {
    pub fn new() -> Self {
        Self::from_config(&StuckConfig::default())
    }

    pub fn from_config(config: &StuckConfig) -> Self {
        Self {
            config: config.clone(),
            window_start: None,
            ticks_in_window: 0,
            stuck_level: 0,
            nudged_this_window: false,
            full_stuck_count: 0,
        }
    }

    /// Damage applied with each nudge, as a hint to the host that the agent
    /// is wedged. Zero disables it.
    pub fn with_take_damage_on_stuck(mut self, damage: f32) -> Self {
        self.config.nudge_damage = damage;
        self
    }

    /// Consecutive stuck windows before escalating to a teleport.
    pub fn with_teleport_steps(mut self, steps: u32) -> Self {
        self.config.teleport_steps = steps;
        self
    }

    pub fn with_teleport_on_full_stuck(mut self, teleport: bool) -> Self {
        self.config.teleport_on_full_stuck = teleport;
        self
    }

    fn reset_window(&mut self, pos: WorldPos) {
        self.window_start = Some(pos);
        self.ticks_in_window = 0;
        self.nudged_this_window = false;
    }

    fn nudge(&mut self, ctx: &mut StuckContext<'_>) {
        if self.nudged_this_window {
            return;
        }
        self.nudged_this_window = true;

        if self.config.nudge_damage > 0.0 {
            ctx.agent.damage(self.config.nudge_damage);
        }
        // A hop plus a small random horizontal shove; enough to clear fence
        // corners and door thresholds without visibly teleporting.
        let dx = (ctx.agent.next_random(3) - 1) as f64 * 0.2;
        let dz = (ctx.agent.next_random(3) - 1) as f64 * 0.2;
        ctx.agent.add_velocity(dx, 0.3, dz);
    }

    fn full_stuck(&mut self, ctx: &mut StuckContext<'_>) {
        self.full_stuck_count += 1;
        self.stuck_level = 0;

        if self.full_stuck_count >= self.config.max_full_stuck {
            tracing::info!(
                recoveries = self.full_stuck_count,
                "stuck recovery exhausted, abandoning path"
            );
            ctx.cancel = true;
            self.full_stuck_count = 0;
            return;
        }

        if self.config.teleport_on_full_stuck {
            if let Some(target) = ctx.next_waypoint {
                tracing::debug!(?target, "fully stuck, teleporting to next waypoint");
                ctx.agent.teleport(target);
            }
        }
    }
}

impl Default for PathingStuckHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl StuckHandler for PathingStuckHandler {
    fn check_stuck(&mut self, ctx: &mut StuckContext<'_>) {
        if !ctx.following {
            self.window_start = None;
            self.ticks_in_window = 0;
            self.stuck_level = 0;
            self.nudged_this_window = false;
            return;
        }

        let pos = ctx.agent.position();
        let Some(start) = self.window_start else {
            self.reset_window(pos);
            return;
        };

        self.ticks_in_window += 1;
        if self.ticks_in_window < self.config.window_ticks {
            return;
        }

        let displacement = start.distance(&pos);
        if displacement >= self.config.displacement_threshold {
            // Making progress; de-escalate.
            self.stuck_level = 0;
            self.reset_window(pos);
            return;
        }

        self.stuck_level += 1;
        tracing::debug!(level = self.stuck_level, displacement, "agent appears stuck");
        if self.stuck_level >= self.config.teleport_steps {
            self.full_stuck(ctx);
        } else {
            self.nudge(ctx);
        }
        self.reset_window(pos);
    }
}
