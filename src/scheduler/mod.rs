//! Job scheduling for parallel fitness evaluation.
//!
//! The optimizer only needs a narrow contract from a scheduler: take a batch
//! of independent [`Job`]s, run them on worker threads, and hand back one
//! [`JobOutcome`] per job once everything has finished. Termination is
//! best-effort: jobs that have not started yet are skipped, jobs already
//! running complete normally.
//!
//! [`PoolScheduler`] implements the contract with a fresh `rayon` pool per
//! batch. Other schedulers drive each job with [`run_job`] on threads of
//! their own and hand the driver thread back as a [`JobBatch`].

mod pool;
mod types;

pub(crate) use pool::resolve_threads;
pub use pool::{JobBatch, PoolScheduler};
pub use types::{run_job, Job, JobOutcome, JobScheduler, JobStatus};
