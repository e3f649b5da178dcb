//! CSO configuration.
//!
//! [`CsoConfig`] holds the options recognized by the optimizer. The stopping
//! criterion and the fitness evaluator are pluggable instances injected on
//! [`CatSwarmOptimizer`](super::CatSwarmOptimizer) itself.

use std::fmt;

use crate::error::{CsoError, CsoOutcome};
use crate::scheduler::resolve_threads;

/// Thread count meaning "use every available core".
pub const ALL_CORES: i32 = -1;

/// Configuration for Cat Swarm Optimization.
///
/// # Defaults
///
/// ```
/// use u_catswarm::cso::CsoConfig;
///
/// let config = CsoConfig::default();
/// assert_eq!(config.swarm_size, 1000);
/// assert_eq!(config.seed, 42);
/// assert!(!config.eval_parallel);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_catswarm::cso::CsoConfig;
///
/// let config = CsoConfig::default()
///     .with_swarm_size(40)
///     .with_seed(7)
///     .with_eval_parallel(true)
///     .with_num_threads(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CsoConfig {
    /// Number of particles in the swarm.
    ///
    /// Must be even: each round pairs every particle with exactly one rival.
    pub swarm_size: usize,

    /// The phi parameter, in `[0, 1]`.
    ///
    /// Validated and exposed, but the competition update does not read it.
    pub phi: f64,

    /// Seed of the driver's random number generator.
    pub seed: u64,

    /// Whether to evaluate fitness on a worker pool.
    pub eval_parallel: bool,

    /// Worker threads for parallel evaluation. [`ALL_CORES`] (`-1`) or `0`
    /// uses every available core.
    pub num_threads: i32,
}

impl Default for CsoConfig {
    fn default() -> Self {
        Self {
            swarm_size: 1000,
            phi: 0.1,
            seed: 42,
            eval_parallel: false,
            num_threads: ALL_CORES,
        }
    }
}

impl CsoConfig {
    /// Sets the swarm size.
    pub fn with_swarm_size(mut self, n: usize) -> Self {
        self.swarm_size = n;
        self
    }

    /// Sets phi.
    pub fn with_phi(mut self, phi: f64) -> Self {
        self.phi = phi;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_eval_parallel(mut self, parallel: bool) -> Self {
        self.eval_parallel = parallel;
        self
    }

    /// Sets the number of worker threads for parallel evaluation.
    pub fn with_num_threads(mut self, n: i32) -> Self {
        self.num_threads = n;
        self
    }

    /// Resolves [`num_threads`](Self::num_threads) to a concrete worker count.
    pub fn effective_threads(&self) -> usize {
        resolve_threads(self.num_threads)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CsoOutcome<()> {
        if self.swarm_size < 1 {
            return Err(CsoError::SwarmSizeTooSmall(self.swarm_size));
        }
        if self.swarm_size % 2 != 0 {
            return Err(CsoError::OddSwarmSize(self.swarm_size));
        }
        if !(0.0..=1.0).contains(&self.phi) {
            return Err(CsoError::PhiOutOfRange(self.phi));
        }
        if self.num_threads < ALL_CORES {
            return Err(CsoError::InvalidThreadCount(self.num_threads));
        }
        Ok(())
    }
}

impl fmt::Display for CsoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "-swarm-size {} -phi {} -seed {} -eval-parallel {} -num-threads {}",
            self.swarm_size, self.phi, self.seed, self.eval_parallel, self.num_threads
        )
    }
}
