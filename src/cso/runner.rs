//! CSO optimization loop execution.
//!
//! [`CatSwarmOptimizer`] drives one run end to end:
//! initialization → full evaluation → (report → stop check → competition →
//! loser evaluation) repeated until the stopping criterion fires or the run
//! is stopped externally.
//!
//! The optimizer is `Sync`. Share it through an `Arc`, call
//! [`run`](CatSwarmOptimizer::run) on one thread and the control and
//! observation methods from any other.

use std::sync::Arc;
use std::time::Instant;

use ndarray::Array1;
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::competition::CompetitionEngine;
use super::config::CsoConfig;
use super::evaluator::{EvaluationSummary, FitnessEvaluator, ParallelEvaluator, SerialEvaluator};
use super::lifecycle::{RunControl, RunState, PAUSE_POLL_INTERVAL, PAUSE_WAIT_LIMIT};
use super::stopping::{CsoProgress, MaxTrainTime, StoppingCriterion};
use super::swarm::{SwarmState, REPORT_HEADER};
use super::types::CsoProblem;
use crate::error::{CsoError, CsoOutcome};
use crate::scheduler::JobScheduler;

/// Result of a CSO run.
#[derive(Debug, Clone)]
pub struct CsoResult {
    /// Position of the best particle in the final swarm.
    pub best: Array1<f64>,

    /// Fitness of [`best`](Self::best).
    pub best_fitness: f64,

    /// Number of completed competition rounds.
    pub iterations: usize,

    /// [`RunState::Completed`] or [`RunState::Stopped`].
    pub state: RunState,

    /// Best fitness observed at each stop check, starting with the initial
    /// swarm.
    pub fitness_history: Vec<f64>,

    /// Total fitness evaluations, including the initial full pass.
    pub evaluations: usize,

    /// Evaluations that failed and were scored `+Infinity`.
    pub failed_evaluations: usize,

    /// Particles never evaluated because [`stop_execution`] terminated their
    /// batch. Nonzero only for stopped runs.
    ///
    /// [`stop_execution`]: CatSwarmOptimizer::stop_execution
    pub skipped_evaluations: usize,

    /// The swarm as it was when the loop ended.
    ///
    /// After a stopped run its fitness may be partial: particles whose
    /// evaluation was skipped hold `+Infinity` instead of their real fitness.
    pub swarm: SwarmState,
}

impl CsoResult {
    /// Whether the run was stopped externally.
    pub fn stopped(&self) -> bool {
        self.state == RunState::Stopped
    }
}

#[derive(Debug, Clone, Default)]
struct Status {
    state: RunState,
    iteration: usize,
    best: Option<Array1<f64>>,
    best_fitness: Option<f64>,
}

/// Cat Swarm Optimization engine.
///
/// # Usage
///
/// ```
/// use ndarray::{Array1, ArrayView1};
/// use rand::{Rng, RngCore};
/// use u_catswarm::cso::{CatSwarmOptimizer, CsoConfig, FnProblem, MaxIterations};
///
/// let problem = FnProblem::new(
///     |rng: &mut dyn RngCore| Array1::from_shape_fn(3, |_| rng.random_range(-5.0..5.0)),
///     |x: ArrayView1<'_, f64>| x.iter().map(|v| v * v).sum(),
/// );
/// let config = CsoConfig::default().with_swarm_size(20).with_seed(1);
/// let optimizer = CatSwarmOptimizer::new(problem, config)
///     .unwrap()
///     .with_stopping(MaxIterations::new(50));
///
/// let result = optimizer.run().unwrap();
/// assert_eq!(result.iterations, 50);
/// assert!(result.best_fitness.is_finite());
/// ```
pub struct CatSwarmOptimizer<P: CsoProblem + 'static> {
    problem: Arc<P>,
    config: CsoConfig,
    evaluator: Box<dyn FitnessEvaluator<P>>,
    stopping: Mutex<Box<dyn StoppingCriterion>>,
    control: RunControl,
    status: RwLock<Status>,
}

impl<P: CsoProblem + 'static> CatSwarmOptimizer<P> {
    /// Creates an optimizer for `problem`.
    ///
    /// The evaluator follows [`CsoConfig::eval_parallel`]; the stopping
    /// criterion defaults to [`MaxTrainTime`] with a 60 s budget.
    ///
    /// # Errors
    ///
    /// Returns the first violation reported by [`CsoConfig::validate`].
    pub fn new(problem: P, config: CsoConfig) -> CsoOutcome<Self> {
        Self::from_shared(Arc::new(problem), config)
    }

    /// Like [`new`](Self::new), for a problem that is already shared.
    pub fn from_shared(problem: Arc<P>, config: CsoConfig) -> CsoOutcome<Self> {
        config.validate()?;

        let evaluator: Box<dyn FitnessEvaluator<P>> = if config.eval_parallel {
            Box::new(ParallelEvaluator::with_threads(config.num_threads))
        } else {
            Box::new(SerialEvaluator)
        };

        Ok(Self {
            problem,
            config,
            evaluator,
            stopping: Mutex::new(Box::new(MaxTrainTime::default())),
            control: RunControl::new(),
            status: RwLock::new(Status::default()),
        })
    }

    /// Replaces the stopping criterion.
    pub fn with_stopping<C: StoppingCriterion + 'static>(self, criterion: C) -> Self {
        *self.stopping.lock() = Box::new(criterion);
        self
    }

    /// Replaces the fitness evaluator.
    pub fn with_evaluator<E: FitnessEvaluator<P> + 'static>(mut self, evaluator: E) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    /// Evaluates in parallel on the given scheduler, regardless of
    /// [`CsoConfig::eval_parallel`].
    pub fn with_scheduler<S: JobScheduler + 'static>(self, scheduler: S) -> Self {
        self.with_evaluator(ParallelEvaluator::new(scheduler))
    }

    /// The configuration this optimizer was built with.
    pub fn config(&self) -> &CsoConfig {
        &self.config
    }

    /// The problem being optimized.
    pub fn problem(&self) -> &Arc<P> {
        &self.problem
    }

    /// Name of the active evaluator.
    pub fn evaluator_name(&self) -> &'static str {
        self.evaluator.name()
    }

    /// Runs the optimization to completion or until stopped.
    ///
    /// A stopped run is not an error: the result carries
    /// [`RunState::Stopped`] and the best particle found so far.
    ///
    /// # Errors
    ///
    /// - [`CsoError::AlreadyRunning`] if another thread is inside `run`.
    /// - [`CsoError::EmptyParticle`] / [`CsoError::DimensionMismatch`] if the
    ///   problem's generator yields malformed particles.
    /// - [`CsoError::Scheduler`] if the worker pool fails.
    pub fn run(&self) -> CsoOutcome<CsoResult> {
        {
            let mut status = self.status.write();
            if status.state.is_active() {
                return Err(CsoError::AlreadyRunning);
            }
            self.control.reset();
            *status = Status {
                state: RunState::Running,
                ..Status::default()
            };
        }

        let outcome = self.execute();
        if let Err(ref e) = outcome {
            log::error!("run aborted: {e}");
            self.status.write().state = RunState::Init;
        }
        outcome
    }

    fn execute(&self) -> CsoOutcome<CsoResult> {
        let started = Instant::now();
        let mut stopping = self.stopping.lock();

        log::info!("{}", self.config);
        log::debug!("evaluator: {}", self.evaluator.name());
        stopping.start();

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut swarm =
            SwarmState::initialize(self.problem.as_ref(), self.config.swarm_size, &mut rng)?;

        let mut totals = EvaluationSummary::default();
        let all: Vec<usize> = (0..swarm.size()).collect();
        accumulate(&mut totals, self.evaluator.evaluate(&self.problem, &mut swarm, &all)?);
        self.publish(&swarm, 0);

        log::info!("{REPORT_HEADER}");
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("\n{swarm}");
        }

        let mut engine = CompetitionEngine::new(swarm.size());
        let mut fitness_history = Vec::new();
        let mut iteration = 0usize;

        let state = loop {
            if self.control.is_stopped() {
                log::warn!("Interrupted!");
                break RunState::Stopped;
            }
            if self.control.is_paused() {
                self.set_state(RunState::Paused);
                self.control
                    .wait_while_paused(PAUSE_WAIT_LIMIT, PAUSE_POLL_INTERVAL);
                continue;
            }
            self.set_state(RunState::Running);

            log::info!("{}", swarm.report_line(iteration));
            fitness_history.push(swarm.best_fitness());

            let progress = CsoProgress {
                iteration,
                best_fitness: swarm.best_fitness(),
                mean_fitness: swarm.mean_fitness(),
                elapsed: started.elapsed(),
            };
            if stopping.check_stopping(&progress) {
                log::info!("{}", stopping.reason());
                break RunState::Completed;
            }

            let round = engine.run_round(&mut swarm, &mut rng)?;
            accumulate(
                &mut totals,
                self.evaluator.evaluate(&self.problem, &mut swarm, &round.losers)?,
            );
            iteration += 1;
            self.publish(&swarm, iteration);

            if log::log_enabled!(log::Level::Debug) {
                log::debug!("\n{swarm}");
            }
        };

        let best = swarm.best_position();
        let best_fitness = swarm.best_fitness();
        log::info!("{}", swarm.report_line(iteration));
        log::info!("best particle:\n{best}");
        log::info!("best fitness:\n{best_fitness}");

        self.set_state(state);

        Ok(CsoResult {
            best,
            best_fitness,
            iterations: iteration,
            state,
            fitness_history,
            evaluations: totals.evaluated,
            failed_evaluations: totals.failed,
            skipped_evaluations: totals.skipped,
            swarm,
        })
    }

    fn publish(&self, swarm: &SwarmState, iteration: usize) {
        let mut status = self.status.write();
        status.iteration = iteration;
        status.best = Some(swarm.best_position());
        status.best_fitness = Some(swarm.best_fitness());
    }

    fn set_state(&self, state: RunState) {
        self.status.write().state = state;
    }

    /// Requests a pause. The loop waits at the start of its next iteration.
    pub fn pause_execution(&self) {
        self.control.pause();
    }

    /// Lets a paused run continue.
    pub fn resume_execution(&self) {
        self.control.resume();
    }

    /// Requests a stop and asks the evaluator to cancel pending work.
    ///
    /// The loop exits at the start of its next iteration, or within one
    /// poll interval if it is paused.
    pub fn stop_execution(&self) {
        self.control.stop();
        self.evaluator.terminate();
    }

    /// Whether a pause is requested.
    pub fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    /// Whether a stop is requested.
    pub fn is_stopped(&self) -> bool {
        self.control.is_stopped()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.status.read().state
    }

    /// Completed competition rounds of the current or last run.
    pub fn current_iteration(&self) -> usize {
        self.status.read().iteration
    }

    /// Best fitness in the most recently published swarm.
    pub fn current_fitness(&self) -> Option<f64> {
        self.status.read().best_fitness
    }

    /// Position of the best particle in the most recently published swarm.
    pub fn best(&self) -> Option<Array1<f64>> {
        self.status.read().best.clone()
    }
}

fn accumulate(totals: &mut EvaluationSummary, summary: EvaluationSummary) {
    totals.evaluated += summary.evaluated;
    totals.failed += summary.failed;
    totals.skipped += summary.skipped;
}
