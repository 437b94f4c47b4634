//! Interface to the agent's physical body.
//!
//! The navigator never moves an agent directly; it issues movement intents
//! through this trait and lets the host's body simulation resolve gravity and
//! collisions. Cart riding is deliberately opaque: the host owns the vehicle
//! entity and its physics, the navigator only mounts, steers, and dismounts.

use crate::core::{CellPos, WorldPos};

/// Traversal capabilities of an agent, sampled at job submission.
#[derive(Clone, Copy, Debug)]
pub struct Capabilities {
    pub can_swim: bool,
    pub can_open_doors: bool,
    pub can_climb: bool,
    pub can_use_rails: bool,
    /// Maximum search radius in cells.
    pub follow_range: i32,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            can_swim: true,
            can_open_doors: true,
            can_climb: true,
            can_use_rails: true,
            follow_range: 48,
        }
    }
}

pub trait AgentControl {
    fn position(&self) -> WorldPos;

    /// Cell the agent currently occupies.
    fn cell(&self) -> CellPos {
        CellPos::containing(self.position())
    }

    fn is_in_liquid(&self) -> bool;

    fn capabilities(&self) -> Capabilities;

    /// Ask the body to move toward a point at the given speed factor this tick.
    fn set_wanted_position(&mut self, target: WorldPos, speed: f64);

    /// Set the vertical movement intent (climb/sink). Reset every tick.
    fn set_vertical_intent(&mut self, dy: f64);

    /// Apply an instantaneous velocity delta (ladder edge nudge).
    fn add_velocity(&mut self, dx: f64, dy: f64, dz: f64);

    fn set_sneaking(&mut self, sneaking: bool);

    /// Hard relocation, used only by full-stuck recovery.
    fn teleport(&mut self, target: WorldPos);

    /// Apply a small amount of damage (stuck nudge side effect).
    fn damage(&mut self, amount: f32);

    /// Uniform random integer in `[0, bound)` from the host's random source.
    fn next_random(&mut self, bound: i32) -> i32;

    /// Seed for worker-side randomness (wander goal jitter).
    fn random_seed(&mut self) -> u64;

    // --- cart riding ---

    fn is_riding_cart(&self) -> bool;

    /// Spawn (or reuse) a cart at the given position and mount the agent.
    fn mount_cart(&mut self, at: WorldPos);

    /// Dismount and despawn the cart, if riding.
    fn dismount_cart(&mut self);

    fn cart_position(&self) -> WorldPos;

    fn cart_velocity(&self) -> WorldPos;

    fn set_cart_velocity(&mut self, velocity: WorldPos);
}
