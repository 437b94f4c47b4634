//! Lifecycle handle binding one submitted path job to its status.
//!
//! Shared between exactly two parties: the navigator (tick thread) and one
//! scheduler worker. The worker publishes a computed path at most once and
//! never touches the handle again; the tick thread polls the status with a
//! plain atomic read. Status transitions are compare-and-swap guarded so a
//! late publication racing a cancellation can never resurrect a dead job.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use parking_lot::Mutex;

use crate::path::Path;

/// Lifecycle status of a path computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PathStatus {
    Queued = 0,
    Calculating = 1,
    CalculationComplete = 2,
    InProgressFollowing = 3,
    Complete = 4,
    Cancelled = 5,
    Failed = 6,
}

impl PathStatus {
    fn from_u8(v: u8) -> PathStatus {
        match v {
            0 => PathStatus::Queued,
            1 => PathStatus::Calculating,
            2 => PathStatus::CalculationComplete,
            3 => PathStatus::InProgressFollowing,
            4 => PathStatus::Complete,
            5 => PathStatus::Cancelled,
            _ => PathStatus::Failed,
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PathStatus::Complete | PathStatus::Cancelled | PathStatus::Failed
        )
    }
}

/// Atomic wrapper for [`PathStatus`] values.
#[derive(Debug)]
struct AtomicStatus(AtomicU8);

impl AtomicStatus {
    fn new(status: PathStatus) -> Self {
        Self(AtomicU8::new(status as u8))
    }

    fn load(&self) -> PathStatus {
        PathStatus::from_u8(self.0.load(Ordering::Acquire))
    }

    fn compare_exchange(&self, current: PathStatus, new: PathStatus) -> bool {
        self.0
            .compare_exchange(
                current as u8,
                new as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

/// The result handle for one submitted path job.
#[derive(Debug)]
pub struct PathResult {
    status: AtomicStatus,
    cancel_requested: AtomicBool,
    path: Mutex<Option<Path>>,
    /// Submission generation, checked by the navigator before adoption so a
    /// superseded job's late publication is never consumed.
    generation: u64,
}

impl PathResult {
    pub fn new(generation: u64) -> Self {
        Self {
            status: AtomicStatus::new(PathStatus::Queued),
            cancel_requested: AtomicBool::new(false),
            path: Mutex::new(None),
            generation,
        }
    }

    pub fn status(&self) -> PathStatus {
        self.status.load()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the computation is still pending or running.
    pub fn is_computing(&self) -> bool {
        matches!(self.status(), PathStatus::Queued | PathStatus::Calculating)
    }

    /// Whether the computation has finished, in any way.
    pub fn is_done(&self) -> bool {
        !self.is_computing()
    }

    /// Request cooperative cancellation and mark the result cancelled unless
    /// it already reached a terminal state. Cancelling after completion is a
    /// no-op for the published path's consumers.
    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::Release);
        loop {
            let current = self.status();
            if current.is_terminal() {
                return;
            }
            if self.status.compare_exchange(current, PathStatus::Cancelled) {
                return;
            }
        }
    }

    /// Whether a cancellation has been requested. Workers poll this between
    /// node expansions.
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::Acquire)
    }

    // --- worker-side transitions ---

    /// Claim the job for computation. Fails when the job was cancelled while
    /// still queued.
    pub(crate) fn begin_calculating(&self) -> bool {
        self.status
            .compare_exchange(PathStatus::Queued, PathStatus::Calculating)
    }

    /// Publish the computed path exactly once. Returns false (and drops the
    /// path) when the job was cancelled mid-computation.
    pub(crate) fn publish(&self, path: Path) -> bool {
        {
            let mut slot = self.path.lock();
            *slot = Some(path);
        }
        if self
            .status
            .compare_exchange(PathStatus::Calculating, PathStatus::CalculationComplete)
        {
            true
        } else {
            // Lost the race against cancel(); withdraw the publication.
            self.path.lock().take();
            false
        }
    }

    /// Mark the computation failed (world data unavailable mid-search).
    pub(crate) fn fail(&self) {
        self.status
            .compare_exchange(PathStatus::Calculating, PathStatus::Failed);
    }

    // --- navigator-side transitions ---

    /// Take the published path for following.
    pub(crate) fn take_path(&self) -> Option<Path> {
        self.path.lock().take()
    }

    /// Flip a freshly adopted result into the following state.
    pub(crate) fn start_following(&self) -> bool {
        self.status.compare_exchange(
            PathStatus::CalculationComplete,
            PathStatus::InProgressFollowing,
        )
    }

    /// Mark the path fully consumed.
    pub(crate) fn complete(&self) {
        self.status
            .compare_exchange(PathStatus::InProgressFollowing, PathStatus::Complete);
    }
}
