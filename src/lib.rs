//! marga-nav: asynchronous navigation for agents in a voxel world.
//!
//! Path searches run on a worker pool while the simulation keeps ticking;
//! each agent's [`Navigator`] submits jobs, polls their [`PathResult`]
//! handles, and steers the agent along published paths with terrain-aware
//! handling for ladders, rails, and liquid.
//!
//! The host supplies two interfaces: [`WorldGrid`] for read-only world
//! queries (shared with the workers) and [`AgentControl`] for issuing
//! movement intent (tick thread only).

pub mod agent;
pub mod config;
pub mod core;
pub mod error;
pub mod jobs;
pub mod navigator;
pub mod path;
pub mod result;
pub mod scheduler;
pub mod stuck;
pub mod terrain;
pub mod world;

pub use crate::agent::{AgentControl, Capabilities};
pub use crate::config::MargaConfig;
pub use crate::core::{CellPos, Direction, RailShape, WorldPos};
pub use crate::error::{MargaError, Result};
pub use crate::jobs::{JobKind, PathingOptions};
pub use crate::navigator::Navigator;
pub use crate::path::{Path, Waypoint, WaypointFlags};
pub use crate::result::{PathResult, PathStatus};
pub use crate::scheduler::Scheduler;
pub use crate::stuck::{PathingStuckHandler, StuckContext, StuckHandler};
pub use crate::world::WorldGrid;
