//! Thread-pool scheduler backed by rayon.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use rayon::prelude::*;

use super::types::{run_job, Job, JobOutcome, JobScheduler};
use crate::error::{CsoError, CsoOutcome};

/// Maps a configured thread count to the number of workers to spawn.
///
/// Non-positive values mean "every available core".
pub(crate) fn resolve_threads(num_threads: i32) -> usize {
    if num_threads <= 0 {
        num_cpus::get().max(1)
    } else {
        num_threads as usize
    }
}

/// Scheduler that spins up a fresh rayon pool for every batch.
///
/// Each batch is driven from a dedicated background thread so that
/// [`start`](JobScheduler::start) returns at once; [`JobBatch::stop`] joins it.
#[derive(Debug)]
pub struct PoolScheduler {
    num_threads: usize,
    current: Mutex<Option<Arc<AtomicBool>>>,
}

impl PoolScheduler {
    /// Creates a scheduler. `-1` (or `0`) uses every available core.
    pub fn new(num_threads: i32) -> Self {
        Self {
            num_threads: resolve_threads(num_threads),
            current: Mutex::new(None),
        }
    }
}

impl Default for PoolScheduler {
    fn default() -> Self {
        Self::new(-1)
    }
}

impl JobScheduler for PoolScheduler {
    fn start<J: Job + 'static>(&self, jobs: Vec<J>) -> CsoOutcome<JobBatch<J>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .thread_name(|i| format!("cso-worker-{i}"))
            .build()
            .map_err(|e| CsoError::Scheduler(e.to_string()))?;

        let terminated = Arc::new(AtomicBool::new(false));
        *self.current.lock() = Some(Arc::clone(&terminated));

        let flag = Arc::clone(&terminated);
        let handle = thread::Builder::new()
            .name("cso-batch".to_string())
            .spawn(move || {
                pool.install(|| {
                    jobs.into_par_iter()
                        .map(|job| run_job(job, &flag))
                        .collect::<Vec<_>>()
                })
            })
            .map_err(|e| CsoError::Scheduler(e.to_string()))?;

        Ok(JobBatch::new(handle, terminated))
    }

    fn terminate(&self) {
        if let Some(flag) = self.current.lock().as_ref() {
            flag.store(true, Ordering::Release);
        }
    }

    fn num_threads(&self) -> usize {
        self.num_threads
    }
}

/// A running batch of jobs.
#[derive(Debug)]
pub struct JobBatch<J> {
    handle: JoinHandle<Vec<JobOutcome<J>>>,
    terminated: Arc<AtomicBool>,
}

impl<J> JobBatch<J> {
    /// Wraps a batch driven by `handle`.
    ///
    /// `handle` must return one outcome per submitted job. Setting
    /// `terminated` asks the driver to skip jobs that have not started;
    /// drivers built on [`run_job`] honor it.
    pub fn new(handle: JoinHandle<Vec<JobOutcome<J>>>, terminated: Arc<AtomicBool>) -> Self {
        Self { handle, terminated }
    }

    /// Skips every job of this batch that has not started yet.
    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::Release);
    }

    /// Blocks until every job has finished and returns the outcomes in
    /// submission order.
    pub fn stop(self) -> CsoOutcome<Vec<JobOutcome<J>>> {
        self.handle
            .join()
            .map_err(|_| CsoError::Scheduler("batch thread panicked".to_string()))
    }
}
