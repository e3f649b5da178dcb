//! Problem definition for Cat Swarm Optimization.

use ndarray::{Array1, ArrayView1};
use rand::{Rng, RngCore};

/// Defines a continuous minimization problem for the swarm.
///
/// The user supplies the two problem-specific callbacks of CSO: a random
/// particle generator and a fitness function. The framework owns the swarm
/// matrices, the competition rule and the run lifecycle.
///
/// # Minimization
///
/// Lower fitness is better. Return `f64::NAN` (or panic) to signal that a
/// particle could not be evaluated; the engine records `+Infinity` for it
/// and carries on.
///
/// # Bounds
///
/// Positions are never clamped by the engine. If the search space has
/// bounds, enforce them inside [`fitness`](CsoProblem::fitness), for
/// example by returning a penalty for out-of-range coordinates.
///
/// # Thread Safety
///
/// `CsoProblem` must be `Send + Sync`: the parallel evaluator calls
/// [`fitness`](CsoProblem::fitness) from worker threads. The generator is
/// only ever called from the driver thread.
pub trait CsoProblem: Send + Sync {
    /// Creates one random particle (a row of the position matrix).
    ///
    /// Every call must return the same number of dimensions. The `rng` is
    /// the optimizer's seeded generator, so drawing from it keeps runs
    /// reproducible; ignoring it is allowed.
    fn random_particle<R: Rng>(&self, rng: &mut R) -> Array1<f64>;

    /// Computes the fitness of a particle. Lower is better.
    fn fitness(&self, particle: ArrayView1<'_, f64>) -> f64;
}

/// Adapter building a [`CsoProblem`] from two closures.
///
/// ```
/// use ndarray::{array, ArrayView1};
/// use rand::{Rng, RngCore};
/// use u_catswarm::cso::FnProblem;
///
/// let sphere = FnProblem::new(
///     |rng: &mut dyn RngCore| array![rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0)],
///     |x: ArrayView1<'_, f64>| x.iter().map(|v| v * v).sum(),
/// );
/// # let _ = sphere;
/// ```
pub struct FnProblem<G, F> {
    generator: G,
    fitness: F,
}

impl<G, F> FnProblem<G, F>
where
    G: Fn(&mut dyn RngCore) -> Array1<f64> + Send + Sync,
    F: Fn(ArrayView1<'_, f64>) -> f64 + Send + Sync,
{
    /// Wraps a particle generator and a fitness function.
    pub fn new(generator: G, fitness: F) -> Self {
        Self { generator, fitness }
    }
}

impl<G, F> CsoProblem for FnProblem<G, F>
where
    G: Fn(&mut dyn RngCore) -> Array1<f64> + Send + Sync,
    F: Fn(ArrayView1<'_, f64>) -> f64 + Send + Sync,
{
    fn random_particle<R: Rng>(&self, rng: &mut R) -> Array1<f64> {
        let rng: &mut dyn RngCore = rng;
        (self.generator)(rng)
    }

    fn fitness(&self, particle: ArrayView1<'_, f64>) -> f64 {
        (self.fitness)(particle)
    }
}
