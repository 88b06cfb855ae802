use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use tracing::{info, warn};

use crate::error::{InspectError, Result};
use crate::types::{TileDescriptor, TileOutcome};

/// Completion count reported after every finished tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

impl Progress {
    pub fn remaining(&self) -> usize {
        self.total - self.processed
    }
}

/// Fans tiles out over a fixed worker pool and gathers outcomes as they
/// complete.
///
/// Each tile is an independent unit: a panic inside one unit becomes a
/// `LoadFailed` outcome for that tile and the batch carries on. There is no
/// timeout or cancellation; `run` returns once every tile has reported.
pub struct Scheduler {
    pool: rayon::ThreadPool,
}

impl Scheduler {
    /// Build a pool with `threads` workers, or one per core when `None`.
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("tile-worker-{i}"));
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| InspectError::Scheduler(format!("Failed to build worker pool: {e}")))?;
        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Process every descriptor, returning outcomes in completion order.
    pub fn run<F>(&self, descriptors: Vec<TileDescriptor>, process: F) -> Vec<TileOutcome>
    where
        F: Fn(&TileDescriptor) -> TileOutcome + Sync,
    {
        self.run_with_progress(descriptors, process, |_| {})
    }

    /// Like [`Scheduler::run`], calling `on_progress` on the coordinating
    /// thread after each completion.
    pub fn run_with_progress<F, P>(
        &self,
        descriptors: Vec<TileDescriptor>,
        process: F,
        mut on_progress: P,
    ) -> Vec<TileOutcome>
    where
        F: Fn(&TileDescriptor) -> TileOutcome + Sync,
        P: FnMut(Progress),
    {
        let total = descriptors.len();
        let (tx, rx) = crossbeam::channel::unbounded();
        let pool = &self.pool;
        let process = &process;

        thread::scope(|scope| {
            scope.spawn(move || {
                pool.scope(|s| {
                    for descriptor in descriptors {
                        let tx = tx.clone();
                        s.spawn(move |_| {
                            let outcome = run_isolated(process, &descriptor);
                            // The receiver lives until every sender is gone.
                            let _ = tx.send(outcome);
                        });
                    }
                });
            });

            let mut outcomes = Vec::with_capacity(total);
            for outcome in rx.iter() {
                outcomes.push(outcome);
                let progress = Progress {
                    processed: outcomes.len(),
                    total,
                };
                info!(
                    processed = progress.processed,
                    total,
                    remaining = progress.remaining(),
                    "Processed tile"
                );
                on_progress(progress);
            }
            outcomes
        })
    }
}

fn run_isolated<F>(process: &F, descriptor: &TileDescriptor) -> TileOutcome
where
    F: Fn(&TileDescriptor) -> TileOutcome,
{
    match panic::catch_unwind(AssertUnwindSafe(|| process(descriptor))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            warn!(tile = descriptor.tile_id, "Worker panicked: {reason}");
            TileOutcome::LoadFailed {
                tile_id: descriptor.tile_id,
                lod_level: descriptor.lod_level,
                reason: format!("Worker panicked: {reason}"),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
