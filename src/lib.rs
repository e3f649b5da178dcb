//! Cat Swarm Optimization engine.
//!
//! A swarm-based continuous minimizer with reproducible runs, serial or
//! parallel fitness evaluation, and cooperative pause/resume/stop control.
//!
//! - **[`cso`]**: The optimizer. Swarm state, pairwise competition, loser
//!   updates, stopping criteria and the run lifecycle.
//! - **[`scheduler`]**: A minimal job-scheduling interface and a rayon-backed
//!   pool used for parallel fitness evaluation.
//! - **[`error`]**: The crate's error type.
//!
//! # Example
//!
//! ```
//! use ndarray::{Array1, ArrayView1};
//! use rand::{Rng, RngCore};
//! use u_catswarm::cso::{CatSwarmOptimizer, CsoConfig, FnProblem, MaxIterations};
//!
//! let problem = FnProblem::new(
//!     |rng: &mut dyn RngCore| Array1::from_shape_fn(2, |_| rng.random_range(-10.0..10.0)),
//!     |x: ArrayView1<'_, f64>| x.iter().map(|v| v * v).sum(),
//! );
//! let optimizer = CatSwarmOptimizer::new(problem, CsoConfig::default().with_swarm_size(30))?
//!     .with_stopping(MaxIterations::new(100));
//! let result = optimizer.run()?;
//! assert!(result.best_fitness <= result.fitness_history[0]);
//! # Ok::<(), u_catswarm::error::CsoError>(())
//! ```

pub mod cso;
pub mod error;
pub mod scheduler;
