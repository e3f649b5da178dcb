//! Cat Swarm Optimization framework.
//!
//! A continuous minimizer built on pairwise competition. Each round the
//! swarm is shuffled into pairs; the worse particle of every pair (the
//! loser) moves toward its pair's winner and toward the swarm's mean
//! position, while winners stay put. Only losers are re-evaluated.
//!
//! Users define their problem by implementing [`CsoProblem`] (or wrapping two
//! closures in [`FnProblem`]).
//!
//! # Key Types
//!
//! - [`CsoConfig`]: Swarm size, seed, phi and evaluation options
//! - [`CatSwarmOptimizer`]: Runs the loop; pause, resume and stop from other
//!   threads
//! - [`CsoResult`]: Best particle, final swarm and run statistics
//! - [`SwarmState`]: Position, velocity and fitness matrices
//!
//! # Pluggable Parts
//!
//! - [`StoppingCriterion`]: [`MaxIterations`], [`MaxTrainTime`],
//!   [`TargetFitness`], [`AnyOf`]
//! - [`FitnessEvaluator`]: [`SerialEvaluator`], or [`ParallelEvaluator`] on
//!   a [`JobScheduler`](crate::scheduler::JobScheduler)
//!
//! # Submodules
//!
//! - [`competition`]: Shuffle, contest and loser-update primitives
//!
//! # References
//!
//! - Chu, Tsai & Pan (2006), "Cat Swarm Optimization", *PRICAI 2006:
//!   Trends in Artificial Intelligence*, LNAI 4099, pp. 854–858

pub mod competition;
mod config;
mod evaluator;
mod lifecycle;
mod runner;
mod stopping;
mod swarm;
mod types;

pub use config::{CsoConfig, ALL_CORES};
pub use evaluator::{
    EvaluationSummary, FitnessEvaluator, FitnessJob, ParallelEvaluator, SerialEvaluator,
};
pub use lifecycle::{RunControl, RunState, PAUSE_POLL_INTERVAL, PAUSE_WAIT_LIMIT};
pub use runner::{CatSwarmOptimizer, CsoResult};
pub use stopping::{
    AnyOf, CsoProgress, MaxIterations, MaxTrainTime, StoppingCriterion, TargetFitness,
};
pub use swarm::{report_header, SwarmState, REPORT_HEADER};
pub use types::{CsoProblem, FnProblem};
