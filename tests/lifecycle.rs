//! Pause, resume and stop from a controlling thread.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ndarray::{Array1, ArrayView1};
use rand::{Rng, RngCore};
use u_catswarm::cso::{
    CatSwarmOptimizer, CsoConfig, CsoProblem, FnProblem, MaxIterations, RunState,
};
use u_catswarm::error::CsoError;

/// Sphere with a small per-evaluation delay so rounds take measurable time.
fn slow_sphere() -> impl CsoProblem {
    FnProblem::new(
        |rng: &mut dyn RngCore| Array1::from_shape_fn(3, |_| rng.random_range(-5.0..5.0)),
        |x: ArrayView1<'_, f64>| {
            thread::sleep(Duration::from_micros(500));
            x.iter().map(|v| v * v).sum()
        },
    )
}

fn spawn_run(
    config: CsoConfig,
) -> (
    Arc<CatSwarmOptimizer<impl CsoProblem>>,
    thread::JoinHandle<u_catswarm::cso::CsoResult>,
) {
    let optimizer = Arc::new(
        CatSwarmOptimizer::new(slow_sphere(), config)
            .unwrap()
            .with_stopping(MaxIterations::new(usize::MAX)),
    );
    let runner = {
        let optimizer = Arc::clone(&optimizer);
        thread::spawn(move || optimizer.run().unwrap())
    };
    (optimizer, runner)
}

fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn pause_then_stop_exits_promptly_without_another_round() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (optimizer, runner) = spawn_run(CsoConfig::default().with_swarm_size(8));
    wait_until(|| optimizer.current_iteration() >= 2);

    optimizer.pause_execution();
    wait_until(|| optimizer.state() == RunState::Paused);
    let paused_at = optimizer.current_iteration();

    thread::sleep(Duration::from_millis(20));
    assert_eq!(optimizer.current_iteration(), paused_at);

    let stop_requested = Instant::now();
    optimizer.stop_execution();
    let result = runner.join().unwrap();

    assert!(stop_requested.elapsed() < Duration::from_millis(100));
    assert_eq!(result.state, RunState::Stopped);
    assert!(result.stopped());
    assert_eq!(result.iterations, paused_at);
    assert_eq!(optimizer.state(), RunState::Stopped);
}

#[test]
fn resume_continues_the_run() {
    let (optimizer, runner) = spawn_run(CsoConfig::default().with_swarm_size(8));
    wait_until(|| optimizer.current_iteration() >= 1);

    optimizer.pause_execution();
    optimizer.pause_execution();
    assert!(optimizer.is_paused());
    wait_until(|| optimizer.state() == RunState::Paused);
    let paused_at = optimizer.current_iteration();

    optimizer.resume_execution();
    assert!(!optimizer.is_paused());
    wait_until(|| optimizer.current_iteration() > paused_at + 1);
    assert_eq!(optimizer.state(), RunState::Running);

    optimizer.stop_execution();
    optimizer.stop_execution();
    let result = runner.join().unwrap();
    assert_eq!(result.state, RunState::Stopped);
    assert!(result.iterations > paused_at);
}

#[test]
fn stop_while_running_returns_best_so_far() {
    let (optimizer, runner) = spawn_run(CsoConfig::default().with_swarm_size(10));
    wait_until(|| optimizer.current_iteration() >= 3);

    optimizer.stop_execution();
    assert!(optimizer.is_stopped());
    let result = runner.join().unwrap();

    assert_eq!(result.state, RunState::Stopped);
    assert!(result.best_fitness.is_finite());
    assert_eq!(optimizer.current_fitness(), Some(result.best_fitness));
    assert_eq!(optimizer.best(), Some(result.best));
}

#[test]
fn parallel_run_can_be_stopped() {
    let config = CsoConfig::default()
        .with_swarm_size(16)
        .with_eval_parallel(true)
        .with_num_threads(2);
    let (optimizer, runner) = spawn_run(config);
    wait_until(|| optimizer.current_iteration() >= 1);

    optimizer.stop_execution();
    let result = runner.join().unwrap();
    assert_eq!(result.state, RunState::Stopped);

    // jobs skipped by the stop are not failures, and every particle of every
    // batch is accounted for exactly once
    assert_eq!(result.failed_evaluations, 0);
    assert_eq!(
        result.evaluations + result.skipped_evaluations,
        16 + 8 * result.iterations
    );
    if result.skipped_evaluations > 0 {
        assert!(result.swarm.fitness().iter().any(|f| f.is_infinite()));
    }
}

#[test]
fn second_concurrent_run_is_rejected() {
    let (optimizer, runner) = spawn_run(CsoConfig::default().with_swarm_size(8));
    wait_until(|| optimizer.state().is_active());

    assert_eq!(optimizer.run().unwrap_err(), CsoError::AlreadyRunning);

    optimizer.stop_execution();
    runner.join().unwrap();
}

#[test]
fn observers_before_first_run() {
    let optimizer =
        CatSwarmOptimizer::new(slow_sphere(), CsoConfig::default().with_swarm_size(4)).unwrap();
    assert_eq!(optimizer.state(), RunState::Init);
    assert_eq!(optimizer.current_iteration(), 0);
    assert_eq!(optimizer.current_fitness(), None);
    assert_eq!(optimizer.best(), None);
    assert!(!optimizer.is_paused());
    assert!(!optimizer.is_stopped());
}
