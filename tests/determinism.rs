//! Seeded runs are reproducible, and the evaluator choice does not change
//! the trajectory.

use ndarray::{Array1, ArrayView1};
use rand::{Rng, RngCore};
use u_catswarm::cso::{
    CatSwarmOptimizer, CsoConfig, CsoProblem, CsoResult, FnProblem, MaxIterations,
    ParallelEvaluator,
};
use u_catswarm::scheduler::PoolScheduler;

/// Rastrigin, undefined (NaN) outside `[-6, 6]` in the first coordinate.
fn rastrigin() -> impl CsoProblem {
    FnProblem::new(
        |rng: &mut dyn RngCore| Array1::from_shape_fn(4, |_| rng.random_range(-5.12..5.12)),
        |x: ArrayView1<'_, f64>| {
            if x[0].abs() > 6.0 {
                return f64::NAN;
            }
            let a = 10.0;
            a * x.len() as f64
                + x.iter()
                    .map(|&v| v * v - a * (2.0 * std::f64::consts::PI * v).cos())
                    .sum::<f64>()
        },
    )
}

fn run(config: CsoConfig, rounds: usize) -> CsoResult {
    CatSwarmOptimizer::new(rastrigin(), config)
        .unwrap()
        .with_stopping(MaxIterations::new(rounds))
        .run()
        .unwrap()
}

#[test]
fn same_seed_same_trajectory() {
    let config = CsoConfig::default().with_swarm_size(40).with_seed(123);
    let a = run(config.clone(), 60);
    let b = run(config, 60);

    assert_eq!(a.swarm, b.swarm);
    assert_eq!(a.best, b.best);
    assert_eq!(a.fitness_history, b.fitness_history);
    assert_eq!(a.evaluations, b.evaluations);
}

#[test]
fn different_seeds_diverge() {
    let a = run(CsoConfig::default().with_swarm_size(20).with_seed(1), 5);
    let b = run(CsoConfig::default().with_swarm_size(20).with_seed(2), 5);
    assert_ne!(a.swarm, b.swarm);
}

#[test]
fn parallel_evaluation_matches_serial() {
    let serial = run(CsoConfig::default().with_swarm_size(40).with_seed(9), 40);
    let parallel = run(
        CsoConfig::default()
            .with_swarm_size(40)
            .with_seed(9)
            .with_eval_parallel(true)
            .with_num_threads(4),
        40,
    );

    assert_eq!(serial.swarm, parallel.swarm);
    assert_eq!(serial.fitness_history, parallel.fitness_history);
    assert_eq!(serial.failed_evaluations, parallel.failed_evaluations);
}

#[test]
fn injected_scheduler_matches_serial() {
    let config = CsoConfig::default().with_swarm_size(24).with_seed(5);
    let serial = run(config.clone(), 20);

    let injected = CatSwarmOptimizer::new(rastrigin(), config)
        .unwrap()
        .with_evaluator(ParallelEvaluator::new(PoolScheduler::new(2)))
        .with_stopping(MaxIterations::new(20))
        .run()
        .unwrap();

    assert_eq!(serial.swarm, injected.swarm);
}

#[test]
fn best_fitness_never_worsens() {
    let result = run(CsoConfig::default().with_swarm_size(30).with_seed(77), 100);
    for pair in result.fitness_history.windows(2) {
        assert!(pair[1] <= pair[0]);
    }
}
