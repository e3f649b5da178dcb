//! Stopping criteria.
//!
//! The optimizer calls [`StoppingCriterion::start`] once before the first
//! round and [`StoppingCriterion::check_stopping`] once per iteration, after
//! the report line and before shuffling.

use std::time::{Duration, Instant};

/// Snapshot of the run handed to stopping criteria.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsoProgress {
    /// Completed competition rounds.
    pub iteration: usize,
    /// Lowest fitness in the swarm.
    pub best_fitness: f64,
    /// Mean fitness of the swarm.
    pub mean_fitness: f64,
    /// Wall-clock time since the run started.
    pub elapsed: Duration,
}

/// Decides when the optimization loop halts.
pub trait StoppingCriterion: Send {
    /// Resets internal state at the start of a run.
    fn start(&mut self) {}

    /// Returns `true` when the run should stop.
    fn check_stopping(&self, progress: &CsoProgress) -> bool;

    /// Why the criterion fired, for logging.
    fn reason(&self) -> &'static str;
}

/// Stop after a fixed number of competition rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxIterations(pub usize);

impl MaxIterations {
    /// Creates the criterion.
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl StoppingCriterion for MaxIterations {
    fn check_stopping(&self, progress: &CsoProgress) -> bool {
        progress.iteration >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum iterations reached"
    }
}

/// Stop once a wall-clock budget has been used up.
#[derive(Debug, Clone, Copy)]
pub struct MaxTrainTime {
    limit: Duration,
    started: Option<Instant>,
}

impl MaxTrainTime {
    /// Creates the criterion with the given budget.
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            started: None,
        }
    }

    /// Budget in whole seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// The configured budget.
    pub fn limit(&self) -> Duration {
        self.limit
    }
}

impl Default for MaxTrainTime {
    fn default() -> Self {
        Self::from_secs(60)
    }
}

impl StoppingCriterion for MaxTrainTime {
    fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    fn check_stopping(&self, progress: &CsoProgress) -> bool {
        let elapsed = self.started.map_or(progress.elapsed, |t| t.elapsed());
        elapsed >= self.limit
    }

    fn reason(&self) -> &'static str {
        "Maximum training time reached"
    }
}

/// Stop when the best fitness reaches a target value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetFitness {
    /// Fitness at or below which the run stops.
    pub target: f64,
}

impl TargetFitness {
    /// Creates the criterion.
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl StoppingCriterion for TargetFitness {
    fn check_stopping(&self, progress: &CsoProgress) -> bool {
        progress.best_fitness <= self.target
    }

    fn reason(&self) -> &'static str {
        "Target fitness reached"
    }
}

/// Stop as soon as any of the wrapped criteria fires.
pub struct AnyOf {
    criteria: Vec<Box<dyn StoppingCriterion>>,
}

impl AnyOf {
    /// Combines several criteria.
    pub fn new(criteria: Vec<Box<dyn StoppingCriterion>>) -> Self {
        Self { criteria }
    }
}

impl StoppingCriterion for AnyOf {
    fn start(&mut self) {
        for criterion in &mut self.criteria {
            criterion.start();
        }
    }

    fn check_stopping(&self, progress: &CsoProgress) -> bool {
        self.criteria.iter().any(|c| c.check_stopping(progress))
    }

    fn reason(&self) -> &'static str {
        "One of multiple criteria met"
    }
}
