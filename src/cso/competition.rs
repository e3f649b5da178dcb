//! Pairwise competition and loser update.
//!
//! One competition round:
//!
//! 1. Shuffle the particle order (Fisher–Yates, driver RNG).
//! 2. Pair `(order[2i], order[2i + 1])`; the particle with strictly lower
//!    fitness wins, otherwise the second one does.
//! 3. Every loser `l` learns from its winner `w` and the swarm mean:
//!    `v_l = r1 * v_l + r2 * (x_w - x_l) + r3 * (mean - x_l)`.
//! 4. Every loser moves: `x_l = x_l + v_l`.
//!
//! Winners keep position, velocity and fitness. The mean is taken over the
//! whole swarm before any loser moves. All randomness is drawn from the one
//! RNG in the order: shuffle, then `r1, r2, r3` per pair.

use ndarray::{Array1, ArrayView1, Zip};
use rand::Rng;

use super::swarm::SwarmState;
use crate::error::{CsoError, CsoOutcome};

/// Winners and losers of one round. `winners[i]` beat `losers[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitionRound {
    /// Index of the winning particle of each pair.
    pub winners: Vec<usize>,
    /// Index of the losing particle of each pair.
    pub losers: Vec<usize>,
}

impl CompetitionRound {
    /// Number of pairs in the round.
    pub fn pairs(&self) -> usize {
        self.winners.len()
    }
}

/// Shuffles `indices` in place.
///
/// Walks from the last slot down to slot 1 and swaps slot `i` with a
/// uniformly drawn slot in `0..=i`, consuming exactly `len - 1` draws.
pub fn shuffle<R: Rng + ?Sized>(indices: &mut [usize], rng: &mut R) {
    for i in (1..indices.len()).rev() {
        let j = rng.random_range(0..=i);
        indices.swap(i, j);
    }
}

/// Pairs up consecutive entries of `order` and decides each contest.
///
/// For the pair `(a, b)`, `a` wins only if `fitness[a] < fitness[b]`; ties
/// (and comparisons involving NaN) go to `b`.
///
/// # Errors
///
/// [`CsoError::OddSwarmSize`] if `order` has odd length.
pub fn compete(order: &[usize], fitness: ArrayView1<'_, f64>) -> CsoOutcome<CompetitionRound> {
    if order.len() % 2 != 0 {
        return Err(CsoError::OddSwarmSize(order.len()));
    }

    let half = order.len() / 2;
    let mut winners = Vec::with_capacity(half);
    let mut losers = Vec::with_capacity(half);
    for pair in order.chunks_exact(2) {
        let (a, b) = (pair[0], pair[1]);
        if fitness[a] < fitness[b] {
            winners.push(a);
            losers.push(b);
        } else {
            winners.push(b);
            losers.push(a);
        }
    }
    Ok(CompetitionRound { winners, losers })
}

/// Updates velocity and position of every loser in `round`.
pub fn update_losers<R: Rng + ?Sized>(
    swarm: &mut SwarmState,
    round: &CompetitionRound,
    rng: &mut R,
) {
    let mean = swarm.column_means();
    update_loser_velocities(swarm, round, &mean, rng);
    update_loser_positions(swarm, &round.losers);
}

fn update_loser_velocities<R: Rng + ?Sized>(
    swarm: &mut SwarmState,
    round: &CompetitionRound,
    mean: &Array1<f64>,
    rng: &mut R,
) {
    for (&winner, &loser) in round.winners.iter().zip(&round.losers) {
        let r1: f64 = rng.random();
        let r2: f64 = rng.random();
        let r3: f64 = rng.random();

        let winner_pos = swarm.position(winner).to_owned();
        let loser_pos = swarm.position(loser).to_owned();
        let mut velocity = swarm.velocities_mut().row_mut(loser);
        Zip::from(&mut velocity)
            .and(&winner_pos)
            .and(&loser_pos)
            .and(mean)
            .for_each(|v, &w, &l, &m| {
                *v = r1 * *v + r2 * (w - l) + r3 * (m - l);
            });
    }
}

fn update_loser_positions(swarm: &mut SwarmState, losers: &[usize]) {
    for &loser in losers {
        let velocity = swarm.velocity(loser).to_owned();
        let mut position = swarm.positions_mut().row_mut(loser);
        position += &velocity;
    }
}

/// Runs competition rounds over a persistent particle order.
///
/// The order is reshuffled in place every round, so round `k` shuffles the
/// permutation left by round `k - 1`.
#[derive(Debug, Clone)]
pub struct CompetitionEngine {
    order: Vec<usize>,
}

impl CompetitionEngine {
    /// Creates an engine for a swarm of `size` particles, starting from the
    /// identity order.
    pub fn new(size: usize) -> Self {
        Self {
            order: (0..size).collect(),
        }
    }

    /// The particle order left by the most recent shuffle.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Shuffles, runs the contests and moves the losers.
    ///
    /// Only loser rows are modified. The returned round lists the indices
    /// whose fitness is now stale.
    ///
    /// # Errors
    ///
    /// [`CsoError::OddSwarmSize`] if the engine was built for an odd number
    /// of particles. The swarm is left untouched in that case.
    pub fn run_round<R: Rng + ?Sized>(
        &mut self,
        swarm: &mut SwarmState,
        rng: &mut R,
    ) -> CsoOutcome<CompetitionRound> {
        shuffle(&mut self.order, rng);
        log::debug!("order={:?}", self.order);

        let round = compete(&self.order, swarm.fitness())?;
        log::debug!("winners={:?}", round.winners);
        log::debug!("losers={:?}", round.losers);

        update_losers(swarm, &round, rng);
        Ok(round)
    }
}
