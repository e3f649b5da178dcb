//! Fitness evaluation strategies.
//!
//! A [`FitnessEvaluator`] fills `fitness[i]` for every index it is handed.
//! The indices of one call must be distinct; evaluators write each slot
//! exactly once and need no locking beyond that.
//!
//! - [`SerialEvaluator`]: evaluates on the calling thread, in index order.
//! - [`ParallelEvaluator`]: submits one job per index to a
//!   [`JobScheduler`] and waits for the whole batch.
//!
//! Both store `+Infinity` for a particle whose fitness function panics or
//! returns NaN, so they produce identical fitness vectors for the same
//! positions.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use ndarray::{Array1, ArrayView1};

use super::swarm::SwarmState;
use super::types::CsoProblem;
use crate::error::CsoOutcome;
use crate::scheduler::{Job, JobScheduler, JobStatus, PoolScheduler};

/// Counts from one evaluation call.
///
/// Every index handed to the evaluator is either evaluated or skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationSummary {
    /// Number of particles whose fitness function was run.
    pub evaluated: usize,
    /// Evaluated particles whose evaluation failed and were set to `+Infinity`.
    pub failed: usize,
    /// Particles never evaluated because the batch was terminated. Their
    /// fitness is set to `+Infinity`.
    pub skipped: usize,
}

impl EvaluationSummary {
    fn record(&mut self, ok: bool) {
        self.evaluated += 1;
        if !ok {
            self.failed += 1;
        }
    }

    fn record_status(&mut self, status: JobStatus) {
        match status {
            JobStatus::Terminated => self.skipped += 1,
            status => self.record(status.is_success()),
        }
    }
}

/// Strategy that scores a subset of the swarm.
pub trait FitnessEvaluator<P: CsoProblem>: Send + Sync {
    /// Writes `fitness[i] = problem.fitness(positions[i])` for every `i` in
    /// `indices`.
    ///
    /// `indices` must not contain duplicates. Individual evaluation failures
    /// are recorded as `+Infinity` and never returned as errors.
    fn evaluate(
        &self,
        problem: &Arc<P>,
        swarm: &mut SwarmState,
        indices: &[usize],
    ) -> CsoOutcome<EvaluationSummary>;

    /// Asks in-flight work to stop early. Best-effort.
    fn terminate(&self) {}

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

/// Evaluates a particle, mapping NaN and panics to `None`.
fn score<P: CsoProblem>(problem: &P, particle: ArrayView1<'_, f64>) -> Option<f64> {
    match panic::catch_unwind(AssertUnwindSafe(|| problem.fitness(particle))) {
        Ok(value) if !value.is_nan() => Some(value),
        _ => None,
    }
}

fn debug_assert_distinct(indices: &[usize]) {
    if cfg!(debug_assertions) {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        debug_assert_eq!(sorted.len(), indices.len(), "duplicate evaluation indices");
    }
}

/// Evaluates particles one after another on the driver thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialEvaluator;

impl<P: CsoProblem> FitnessEvaluator<P> for SerialEvaluator {
    fn evaluate(
        &self,
        problem: &Arc<P>,
        swarm: &mut SwarmState,
        indices: &[usize],
    ) -> CsoOutcome<EvaluationSummary> {
        debug_assert_distinct(indices);

        let mut summary = EvaluationSummary::default();
        for &index in indices {
            let value = score(problem.as_ref(), swarm.position(index));
            summary.record(value.is_some());
            swarm.set_fitness(index, value.unwrap_or(f64::INFINITY));
        }
        Ok(summary)
    }

    fn name(&self) -> &'static str {
        "serial"
    }
}

/// Evaluates particles as a batch of jobs on a [`JobScheduler`].
///
/// Every job owns a copy of its particle's position, so workers never touch
/// the swarm. Results are written back on the calling thread after the
/// batch has been joined.
#[derive(Debug)]
pub struct ParallelEvaluator<S: JobScheduler = PoolScheduler> {
    scheduler: S,
}

impl ParallelEvaluator<PoolScheduler> {
    /// Creates an evaluator on a [`PoolScheduler`] with `num_threads`
    /// workers (`-1` for all cores).
    pub fn with_threads(num_threads: i32) -> Self {
        Self::new(PoolScheduler::new(num_threads))
    }
}

impl<S: JobScheduler> ParallelEvaluator<S> {
    /// Creates an evaluator on the given scheduler.
    pub fn new(scheduler: S) -> Self {
        Self { scheduler }
    }

    /// The scheduler running the jobs.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl<P, S> FitnessEvaluator<P> for ParallelEvaluator<S>
where
    P: CsoProblem + 'static,
    S: JobScheduler,
{
    fn evaluate(
        &self,
        problem: &Arc<P>,
        swarm: &mut SwarmState,
        indices: &[usize],
    ) -> CsoOutcome<EvaluationSummary> {
        debug_assert_distinct(indices);

        let jobs: Vec<FitnessJob<P>> = indices
            .iter()
            .map(|&index| {
                let position = swarm.position(index).to_owned();
                FitnessJob::new(index, Arc::clone(problem), position)
            })
            .collect();

        let outcomes = self.scheduler.start(jobs)?.stop()?;

        let mut summary = EvaluationSummary::default();
        for outcome in outcomes {
            let index = outcome.job.index;
            let value = match (outcome.status.is_success(), outcome.job.fitness) {
                (true, Some(value)) => value,
                _ => {
                    log::trace!("particle {index}: {:?}", outcome.status);
                    f64::INFINITY
                }
            };
            summary.record_status(outcome.status);
            swarm.set_fitness(index, value);
        }
        Ok(summary)
    }

    fn terminate(&self) {
        self.scheduler.terminate();
    }

    fn name(&self) -> &'static str {
        "parallel"
    }
}

/// Job scoring one particle from a private copy of its position.
pub struct FitnessJob<P> {
    index: usize,
    problem: Arc<P>,
    position: Option<Array1<f64>>,
    fitness: Option<f64>,
}

impl<P> FitnessJob<P> {
    /// Creates a job for particle `index` at `position`.
    pub fn new(index: usize, problem: Arc<P>, position: Array1<f64>) -> Self {
        Self {
            index,
            problem,
            position: Some(position),
            fitness: None,
        }
    }

    /// Index of the particle this job scores.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The computed fitness, if any.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }
}

impl<P: CsoProblem> Job for FitnessJob<P> {
    fn pre_execute(&self) -> Option<String> {
        self.position
            .is_none()
            .then(|| "no position snapshot".to_string())
    }

    fn execute(&mut self) -> Result<(), String> {
        let position = self
            .position
            .as_ref()
            .ok_or_else(|| "no position snapshot".to_string())?;
        self.fitness = Some(self.problem.fitness(position.view()));
        Ok(())
    }

    fn post_execute(&self) -> Option<String> {
        match self.fitness {
            None => Some("no fitness produced".to_string()),
            Some(value) if value.is_nan() => Some("fitness is NaN".to_string()),
            Some(_) => None,
        }
    }

    fn cleanup(&mut self) {
        self.position = None;
    }
}
