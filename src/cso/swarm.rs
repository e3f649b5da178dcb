//! Swarm state: positions, velocities and fitness of every particle.

use std::fmt;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;

use super::types::CsoProblem;
use crate::error::{CsoError, CsoOutcome};

/// Column header of the per-iteration report.
pub const REPORT_HEADER: &str = "iteration\tbest\tmean";

/// Returns the report header, `"iteration\tbest\tmean"`.
pub fn report_header() -> &'static str {
    REPORT_HEADER
}

/// The swarm matrices.
///
/// Row `i` of `positions` and `velocities` together with `fitness[i]` make up
/// particle `i`. All three always have `N` rows and both matrices have the
/// same `D` columns.
///
/// Fitness is `+Infinity` until a particle has been evaluated, and stays
/// `+Infinity` for particles whose evaluation failed.
#[derive(Debug, Clone, PartialEq)]
pub struct SwarmState {
    positions: Array2<f64>,
    velocities: Array2<f64>,
    fitness: Array1<f64>,
}

impl SwarmState {
    /// Builds a swarm of `size` particles by calling the problem's generator
    /// `size` times. Velocities start at zero.
    ///
    /// # Errors
    ///
    /// [`CsoError::EmptyParticle`] if the first particle has no dimensions,
    /// [`CsoError::DimensionMismatch`] if any later particle differs in
    /// length from the first.
    pub fn initialize<P: CsoProblem, R: Rng>(
        problem: &P,
        size: usize,
        rng: &mut R,
    ) -> CsoOutcome<Self> {
        if size == 0 {
            return Err(CsoError::SwarmSizeTooSmall(size));
        }

        let first = problem.random_particle(rng);
        let dims = first.len();
        if dims == 0 {
            return Err(CsoError::EmptyParticle(0));
        }

        let mut positions = Array2::<f64>::zeros((size, dims));
        positions.row_mut(0).assign(&first);
        for index in 1..size {
            let particle = problem.random_particle(rng);
            if particle.len() != dims {
                return Err(CsoError::DimensionMismatch {
                    index,
                    expected: dims,
                    actual: particle.len(),
                });
            }
            positions.row_mut(index).assign(&particle);
        }

        Ok(Self {
            velocities: Array2::zeros((size, dims)),
            fitness: Array1::from_elem(size, f64::INFINITY),
            positions,
        })
    }

    /// Assembles a swarm from existing matrices, checking their shapes.
    pub fn from_parts(
        positions: Array2<f64>,
        velocities: Array2<f64>,
        fitness: Array1<f64>,
    ) -> CsoOutcome<Self> {
        let (rows, dims) = positions.dim();
        if rows == 0 {
            return Err(CsoError::SwarmSizeTooSmall(0));
        }
        if dims == 0 {
            return Err(CsoError::EmptyParticle(0));
        }
        if velocities.nrows() != rows || fitness.len() != rows {
            return Err(CsoError::DimensionMismatch {
                index: rows.min(velocities.nrows()).min(fitness.len()),
                expected: rows,
                actual: velocities.nrows().min(fitness.len()),
            });
        }
        if velocities.ncols() != dims {
            return Err(CsoError::DimensionMismatch {
                index: 0,
                expected: dims,
                actual: velocities.ncols(),
            });
        }
        Ok(Self {
            positions,
            velocities,
            fitness,
        })
    }

    /// Number of particles `N`.
    pub fn size(&self) -> usize {
        self.fitness.len()
    }

    /// Problem dimensionality `D`.
    pub fn dimensions(&self) -> usize {
        self.positions.ncols()
    }

    /// The `N x D` position matrix.
    pub fn positions(&self) -> ArrayView2<'_, f64> {
        self.positions.view()
    }

    /// The `N x D` velocity matrix.
    pub fn velocities(&self) -> ArrayView2<'_, f64> {
        self.velocities.view()
    }

    /// The length-`N` fitness vector.
    pub fn fitness(&self) -> ArrayView1<'_, f64> {
        self.fitness.view()
    }

    /// Position of particle `index`.
    pub fn position(&self, index: usize) -> ArrayView1<'_, f64> {
        self.positions.row(index)
    }

    /// Velocity of particle `index`.
    pub fn velocity(&self, index: usize) -> ArrayView1<'_, f64> {
        self.velocities.row(index)
    }

    pub(crate) fn set_fitness(&mut self, index: usize, value: f64) {
        self.fitness[index] = value;
    }

    pub(crate) fn positions_mut(&mut self) -> &mut Array2<f64> {
        &mut self.positions
    }

    pub(crate) fn velocities_mut(&mut self) -> &mut Array2<f64> {
        &mut self.velocities
    }

    /// Column-wise mean of all positions.
    pub fn column_means(&self) -> Array1<f64> {
        self.positions.sum_axis(Axis(0)) / self.size() as f64
    }

    /// Index of the particle with the lowest fitness.
    ///
    /// The first occurrence wins on ties.
    pub fn best_index(&self) -> usize {
        let mut best_i = 0usize;
        let mut best_v = self.fitness[0];
        for (i, &val) in self.fitness.iter().enumerate() {
            if val < best_v {
                best_v = val;
                best_i = i;
            }
        }
        best_i
    }

    /// Lowest recorded fitness.
    pub fn best_fitness(&self) -> f64 {
        self.fitness[self.best_index()]
    }

    /// Copy of the position with the lowest recorded fitness.
    pub fn best_position(&self) -> Array1<f64> {
        self.positions.row(self.best_index()).to_owned()
    }

    /// Arithmetic mean of the fitness vector.
    pub fn mean_fitness(&self) -> f64 {
        self.fitness.sum() / self.size() as f64
    }

    /// One report line: `"<iteration>\t<best>\t<mean>"`.
    pub fn report_line(&self, iteration: usize) -> String {
        format!(
            "{}\t{}\t{}",
            iteration,
            self.best_fitness(),
            self.mean_fitness()
        )
    }
}

impl fmt::Display for SwarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "swarm: {}", self.positions)?;
        writeln!(f, "vel:   {}", self.velocities)?;
        write!(f, "fit:   {}", self.fitness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cso::FnProblem;
    use ndarray::{array, ArrayView1};
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sum_sq(x: ArrayView1<'_, f64>) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    #[test]
    fn test_initialize_shapes() {
        let problem = FnProblem::new(
            |rng: &mut dyn RngCore| array![rng.random_range(-1.0..1.0), 0.0, 1.0],
            sum_sq,
        );
        let mut rng = StdRng::seed_from_u64(1);
        let swarm = SwarmState::initialize(&problem, 6, &mut rng).unwrap();

        assert_eq!(swarm.size(), 6);
        assert_eq!(swarm.dimensions(), 3);
        assert_eq!(swarm.positions().dim(), (6, 3));
        assert_eq!(swarm.velocities().dim(), (6, 3));
        assert!(swarm.velocities().iter().all(|&v| v == 0.0));
        assert!(swarm.fitness().iter().all(|f| f.is_infinite()));
    }

    #[test]
    fn test_initialize_dimension_mismatch() {
        let calls = AtomicUsize::new(0);
        let problem = FnProblem::new(
            move |_rng: &mut dyn RngCore| {
                if calls.fetch_add(1, Ordering::Relaxed) == 2 {
                    array![1.0, 2.0, 3.0]
                } else {
                    array![1.0, 2.0]
                }
            },
            sum_sq,
        );
        let mut rng = StdRng::seed_from_u64(1);
        let err = SwarmState::initialize(&problem, 4, &mut rng).unwrap_err();
        assert_eq!(
            err,
            CsoError::DimensionMismatch {
                index: 2,
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_initialize_empty_particle() {
        let problem = FnProblem::new(|_rng: &mut dyn RngCore| Array1::zeros(0), sum_sq);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            SwarmState::initialize(&problem, 2, &mut rng).unwrap_err(),
            CsoError::EmptyParticle(0)
        );
    }

    #[test]
    fn test_best_first_occurrence_on_ties() {
        let swarm = SwarmState::from_parts(
            array![[0.0], [1.0], [2.0], [3.0]],
            Array2::zeros((4, 1)),
            array![5.0, 1.0, 1.0, 3.0],
        )
        .unwrap();
        assert_eq!(swarm.best_index(), 1);
        assert_eq!(swarm.best_position(), array![1.0]);
        assert!((swarm.best_fitness() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_column_means_and_report() {
        let swarm = SwarmState::from_parts(
            array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]],
            Array2::zeros((4, 2)),
            array![0.0, 2.0, 8.0, 18.0],
        )
        .unwrap();
        assert_eq!(swarm.column_means(), array![1.5, 1.5]);
        assert!((swarm.mean_fitness() - 7.0).abs() < 1e-12);
        assert_eq!(swarm.report_line(3), "3\t0\t7");
        assert_eq!(report_header(), "iteration\tbest\tmean");
    }

    #[test]
    fn test_from_parts_rejects_shape_mismatch() {
        let err = SwarmState::from_parts(
            array![[0.0, 0.0], [1.0, 1.0]],
            Array2::zeros((2, 3)),
            array![0.0, 0.0],
        );
        assert!(err.is_err());
        let err = SwarmState::from_parts(
            array![[0.0, 0.0], [1.0, 1.0]],
            Array2::zeros((2, 2)),
            array![0.0],
        );
        assert!(err.is_err());
    }
}
