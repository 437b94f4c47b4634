//! Per-terrain-feature movement handlers.
//!
//! Each tick the navigator picks at most one handler for the next unconsumed
//! waypoint. A handler either takes over movement for the tick (`Handled`) or
//! declares itself not applicable (`Fallthrough`), in which case the generic
//! ground handler runs. Handlers re-check the live world where it matters: a
//! waypoint whose terrain changed since the search simply falls through.

pub(crate) mod ground;
pub(crate) mod ladder;
pub(crate) mod rail;
pub(crate) mod swim;

/// Whether a terrain handler consumed the tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerrainOutcome {
    /// Movement intent was issued; skip generic ground movement.
    Handled,
    /// Not applicable; fall through to generic ground movement.
    Fallthrough,
}
