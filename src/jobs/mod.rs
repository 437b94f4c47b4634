//! Path jobs: asynchronous units of search work.
//!
//! A job is immutable after submission and runs entirely on a scheduler
//! worker. It reads the world through the read-only [`WorldGrid`] interface
//! and publishes nothing itself; the worker moves its outcome into the
//! [`PathResult`](crate::result::PathResult) handle.

mod move_away;
mod move_to;
mod nearest_tag;
mod random_pos;
mod search;

pub use move_away::MoveAwayJob;
pub use move_to::MoveToJob;
pub use nearest_tag::NearestTagJob;
pub use random_pos::RandomPosJob;

use crate::core::CellPos;
use crate::path::Path;
use crate::result::PathResult;
use crate::world::WorldGrid;

/// Traversal constraints copied into every job at submission.
#[derive(Clone, Copy, Debug)]
pub struct PathingOptions {
    pub can_swim: bool,
    pub can_open_doors: bool,
    pub can_climb: bool,
    pub can_use_rails: bool,
}

impl Default for PathingOptions {
    fn default() -> Self {
        Self {
            can_swim: true,
            can_open_doors: true,
            can_climb: true,
            can_use_rails: true,
        }
    }
}

/// Goal identity of an in-flight job, used to coalesce redundant submissions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobKind {
    MoveTo { dest: CellPos },
    MoveAway { avoid: CellPos, range: i32 },
    RandomPos { center: Option<CellPos>, range: i32 },
    NearestTag { tag: String, range: i32 },
}

/// Cooperative cancellation token handed to a running search.
///
/// Workers poll it between node expansions, so cancellation latency is
/// bounded by one expansion, not nanosecond-precise.
pub struct SearchTicket<'a> {
    result: &'a PathResult,
}

impl<'a> SearchTicket<'a> {
    pub(crate) fn new(result: &'a PathResult) -> Self {
        Self { result }
    }

    pub fn cancelled(&self) -> bool {
        self.result.is_cancel_requested()
    }
}

/// What a search produced.
#[derive(Debug)]
pub enum SearchOutcome {
    /// A path was found; `Path::reachable` distinguishes exact goals from
    /// best-effort nearest-approach results.
    Found(Path),
    /// World data became unavailable mid-search.
    Aborted,
    /// The job noticed its cancellation flag and stopped early.
    Cancelled,
}

/// A polymorphic unit of search work over the world grid.
pub trait PathJob: Send {
    fn search(&self, world: &dyn WorldGrid, ticket: &SearchTicket<'_>) -> SearchOutcome;
}
