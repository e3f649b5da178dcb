//! Scheduler contract: jobs, outcomes and the scheduler trait.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use super::pool::JobBatch;
use crate::error::CsoOutcome;

/// A unit of work submitted to a [`JobScheduler`].
///
/// The scheduler drives each job through
/// `pre_execute -> execute -> post_execute -> cleanup`. A failing check
/// short-circuits to `cleanup`, which always runs.
pub trait Job: Send {
    /// Checks that the job's inputs are present. `Some(reason)` aborts it.
    fn pre_execute(&self) -> Option<String> {
        None
    }

    /// Performs the work.
    fn execute(&mut self) -> Result<(), String>;

    /// Checks that the job produced a usable result. `Some(reason)` marks
    /// it as failed.
    fn post_execute(&self) -> Option<String> {
        None
    }

    /// Releases resources held for execution.
    fn cleanup(&mut self) {}
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// All checks passed.
    Completed,
    /// `pre_execute` rejected the job.
    PreconditionFailed(String),
    /// `execute` returned an error or panicked.
    Failed(String),
    /// `post_execute` rejected the result.
    PostconditionFailed(String),
    /// The batch was terminated before the job started.
    Terminated,
}

impl JobStatus {
    /// Whether the job completed with a valid result.
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

/// A finished job together with its status.
#[derive(Debug)]
pub struct JobOutcome<J> {
    /// The job, after `cleanup`.
    pub job: J,
    /// How it ended.
    pub status: JobStatus,
}

/// Runs batches of jobs on worker threads.
pub trait JobScheduler: Send + Sync {
    /// Starts executing `jobs` and returns immediately.
    ///
    /// Call [`JobBatch::stop`] to block until every job has finished.
    fn start<J: Job + 'static>(&self, jobs: Vec<J>) -> CsoOutcome<JobBatch<J>>;

    /// Asks the running batch, if any, to skip jobs that have not started.
    fn terminate(&self);

    /// Number of worker threads per batch.
    fn num_threads(&self) -> usize;
}

/// Drives one job through its lifecycle.
///
/// Skips the job with [`JobStatus::Terminated`] if `terminated` is set,
/// otherwise runs `pre_execute`, `execute` (panics are caught) and
/// `post_execute`. `cleanup` always runs. Schedulers call this once per job.
pub fn run_job<J: Job>(mut job: J, terminated: &AtomicBool) -> JobOutcome<J> {
    let status = if terminated.load(Ordering::Acquire) {
        JobStatus::Terminated
    } else if let Some(reason) = job.pre_execute() {
        JobStatus::PreconditionFailed(reason)
    } else {
        match panic::catch_unwind(AssertUnwindSafe(|| job.execute())) {
            Ok(Ok(())) => match job.post_execute() {
                Some(reason) => JobStatus::PostconditionFailed(reason),
                None => JobStatus::Completed,
            },
            Ok(Err(reason)) => JobStatus::Failed(reason),
            Err(payload) => JobStatus::Failed(panic_message(payload.as_ref())),
        }
    };
    job.cleanup();
    JobOutcome { job, status }
}

/// Extracts the message of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
