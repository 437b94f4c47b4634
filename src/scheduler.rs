//! Bounded worker-thread pool executing path jobs.
//!
//! Submission never blocks the tick thread: jobs go into an unbounded channel
//! and come back through their [`PathResult`] handle. Workers are the only
//! code allowed to run concurrently with the simulation tick; they read the
//! world through the read-only [`WorldGrid`] interface and publish into the
//! result handle exactly once.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::jobs::{PathJob, SearchOutcome, SearchTicket};
use crate::result::PathResult;
use crate::world::WorldGrid;

struct QueuedJob {
    job: Box<dyn PathJob>,
    world: Arc<dyn WorldGrid>,
    handle: Arc<PathResult>,
}

/// The pathfinding worker pool.
pub struct Scheduler {
    tx: Option<Sender<QueuedJob>>,
    workers: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn `workers` pathing threads.
    pub fn new(workers: usize) -> Self {
        let (tx, rx) = unbounded::<QueuedJob>();
        let workers = (0..workers.max(1))
            .map(|i| {
                let rx = rx.clone();
                thread::Builder::new()
                    .name(format!("pathing-{}", i))
                    .spawn(move || worker_loop(rx))
                    .expect("Failed to spawn pathing worker")
            })
            .collect();

        Self {
            tx: Some(tx),
            workers,
        }
    }

    /// Queue a job for execution. Returns immediately; progress is observable
    /// through the handle's status.
    pub fn submit(&self, job: Box<dyn PathJob>, world: Arc<dyn WorldGrid>, handle: Arc<PathResult>) {
        let Some(tx) = &self.tx else {
            handle.cancel();
            return;
        };
        if let Err(e) = tx.send(QueuedJob { job, world, handle }) {
            // Pool already shut down; give pollers a terminal state.
            tracing::error!("Job queue closed, cancelling path job");
            e.into_inner().handle.cancel();
        }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        // Closing the channel lets workers drain remaining jobs and exit.
        self.tx.take();
        for handle in self.workers.drain(..) {
            if let Err(e) = handle.join() {
                tracing::error!("Pathing worker panicked: {:?}", e);
            }
        }
    }
}

fn worker_loop(rx: Receiver<QueuedJob>) {
    tracing::debug!("Pathing worker started");

    for queued in rx.iter() {
        let QueuedJob { job, world, handle } = queued;

        if handle.is_cancel_requested() {
            handle.cancel();
            continue;
        }
        if !handle.begin_calculating() {
            // Cancelled while queued.
            continue;
        }

        let ticket = SearchTicket::new(&handle);
        match job.search(world.as_ref(), &ticket) {
            SearchOutcome::Found(path) => {
                if handle.publish(path) {
                    tracing::debug!(
                        generation = handle.generation(),
                        "path computation complete"
                    );
                } else {
                    tracing::debug!(
                        generation = handle.generation(),
                        "dropping path computed for cancelled job"
                    );
                }
            }
            SearchOutcome::Aborted => {
                tracing::warn!(
                    generation = handle.generation(),
                    "search aborted, world data unavailable"
                );
                handle.fail();
            }
            SearchOutcome::Cancelled => {
                handle.cancel();
            }
        }
    }

    tracing::debug!("Pathing worker exited");
}
