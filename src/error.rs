//! Error types for the Cat Swarm Optimization engine.
//!
//! Only configuration problems, malformed particles and scheduler
//! infrastructure failures are errors. A fitness function that fails for a
//! single particle never produces a [`CsoError`]; the particle is scored
//! `+Infinity` instead.

use thiserror::Error;

/// Error type for optimizer construction and execution.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CsoError {
    /// The swarm must contain at least one particle.
    #[error("swarm size must be at least 1, got {0}")]
    SwarmSizeTooSmall(usize),

    /// Pairwise competition needs an even number of particles.
    #[error("swarm size must be even for pairwise competition, got {0}")]
    OddSwarmSize(usize),

    /// `phi` is restricted to the unit interval.
    #[error("phi must be in [0, 1], got {0}")]
    PhiOutOfRange(f64),

    /// Thread counts are positive, or `-1` for all available cores.
    #[error("number of threads must be -1 (all cores) or non-negative, got {0}")]
    InvalidThreadCount(i32),

    /// The particle generator produced a zero-length particle.
    #[error("particle {0} has no dimensions")]
    EmptyParticle(usize),

    /// The particle generator produced rows of different lengths.
    #[error("particle {index} has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        /// Row index of the offending particle.
        index: usize,
        /// Dimensionality of the first particle.
        expected: usize,
        /// Dimensionality of the offending particle.
        actual: usize,
    },

    /// The job scheduler could not run a batch.
    #[error("job scheduler failure: {0}")]
    Scheduler(String),

    /// `run` was invoked while another run is still in progress.
    #[error("optimizer is already running")]
    AlreadyRunning,
}

/// Result type alias for optimizer operations.
pub type CsoOutcome<T> = Result<T, CsoError>;
