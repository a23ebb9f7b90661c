//! Simulated Tempering: one trajectory that hops along a temperature ladder.
//!
//! The joint target is π(x, i) ∝ exp(−β_i·E(x)) / Z_i, so every state on the
//! ladder is visited with equal weight. A move i → j at fixed x is accepted
//! with probability min(1, exp(Δ)),
//!
//!   Δ = −E(x)·(β_j − β_i) + ln Z_i − ln Z_j
//!
//! which satisfies detailed balance with respect to π.

use log::{debug, info, warn};
use nalgebra::DMatrix;
use rand::Rng;

use super::ladder::{PartitionTable, TemperatureLadder};
use super::trajectory::Trajectory;
use crate::dynamics::{BrownianIntegrator, Sample};
use crate::error::{Result, SimError};
use crate::potential::Potential;

/// Log of the Metropolis acceptance ratio for a temperature move.
pub fn exchange_log_acceptance(
    energy: f64,
    beta_old: f64,
    beta_new: f64,
    ln_z_old: f64,
    ln_z_new: f64,
) -> f64 {
    -energy * (beta_new - beta_old) + (ln_z_old - ln_z_new)
}

/// min(1, exp(Δ)).
pub fn acceptance_probability(delta: f64) -> f64 {
    if delta >= 0.0 {
        1.0
    } else {
        delta.exp()
    }
}

/// Result of one attempted temperature move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeOutcome {
    pub from: usize,
    pub to: usize,
    pub delta: f64,
    pub accepted: bool,
}

/// Attempt and acceptance counts per (from, to) pair of ladder states.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeStatistics {
    attempts: DMatrix<usize>,
    accepted: DMatrix<usize>,
}

impl ExchangeStatistics {
    pub fn new(n_states: usize) -> Self {
        Self {
            attempts: DMatrix::zeros(n_states, n_states),
            accepted: DMatrix::zeros(n_states, n_states),
        }
    }

    pub fn record(&mut self, outcome: &ExchangeOutcome) {
        self.attempts[(outcome.from, outcome.to)] += 1;
        if outcome.accepted {
            self.accepted[(outcome.from, outcome.to)] += 1;
        }
    }

    pub fn attempts(&self, from: usize, to: usize) -> usize {
        self.attempts[(from, to)]
    }

    pub fn accepted(&self, from: usize, to: usize) -> usize {
        self.accepted[(from, to)]
    }

    pub fn acceptance_rate(&self, from: usize, to: usize) -> Option<f64> {
        match self.attempts(from, to) {
            0 => None,
            n => Some(self.accepted(from, to) as f64 / n as f64),
        }
    }

    pub fn total_attempts(&self) -> usize {
        self.attempts.iter().sum()
    }

    pub fn total_accepted(&self) -> usize {
        self.accepted.iter().sum()
    }

    /// Acceptance over proposals that actually change the state.
    pub fn transition_acceptance_rate(&self) -> Option<f64> {
        let n = self.attempts.nrows();
        let (mut tried, mut taken) = (0, 0);
        for i in 0..n {
            for j in (0..n).filter(|&j| j != i) {
                tried += self.attempts[(i, j)];
                taken += self.accepted[(i, j)];
            }
        }
        (tried > 0).then(|| taken as f64 / tried as f64)
    }
}

/// A Brownian walker that periodically proposes a new ladder temperature.
pub struct SimulatedTemperingReplica<P: Potential, R: Rng> {
    name: String,
    integrator: BrownianIntegrator<P, R>,
    ladder: TemperatureLadder,
    partition: PartitionTable,
    trajectory: Trajectory<Sample>,
    statistics: ExchangeStatistics,
}

impl<P: Potential, R: Rng> SimulatedTemperingReplica<P, R> {
    /// Puts the integrator in ladder state `initial_index` before anything runs.
    pub fn new(
        mut integrator: BrownianIntegrator<P, R>,
        ladder: TemperatureLadder,
        partition: PartitionTable,
        initial_index: usize,
    ) -> Result<Self> {
        if partition.len() != ladder.len() {
            return Err(SimError::invalid(format!(
                "partition table has {} entries for a ladder of {} temperatures",
                partition.len(),
                ladder.len()
            )));
        }
        ladder.check_index(initial_index)?;
        integrator.set_thermodynamic_state(initial_index, ladder.kt(initial_index))?;

        let statistics = ExchangeStatistics::new(ladder.len());
        Ok(Self {
            name: "st".to_string(),
            integrator,
            ladder,
            partition,
            trajectory: Trajectory::new(),
            statistics,
        })
    }

    /// Label used in error reports.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Integrate `n_steps` at the current temperature, recording every sample.
    pub fn run(&mut self, n_steps: usize) -> Result<()> {
        for _ in 0..n_steps {
            let step = self.integrator.steps_taken();
            let sample = self
                .integrator
                .step(None)
                .map_err(|e| e.in_replica(&self.name, step))?;
            self.trajectory.push(sample);
        }
        Ok(())
    }

    /// Propose a ladder state uniformly (possibly the current one) and apply
    /// the Metropolis test against the energy of the latest sample.
    pub fn attempt_exchange(&mut self) -> Result<ExchangeOutcome> {
        let energy = self.trajectory.last().ok_or(SimError::EmptyTrajectory)?.energy;
        let from = self.integrator.state_index();
        let to = self.integrator.rng_mut().gen_range(0..self.ladder.len());

        let delta = exchange_log_acceptance(
            energy,
            self.ladder.beta(from),
            self.ladder.beta(to),
            self.partition.ln_z(from),
            self.partition.ln_z(to),
        );
        // A uniform number is drawn only when the move can be rejected.
        let p = acceptance_probability(delta);
        let accepted = p >= 1.0 || self.integrator.rng_mut().gen::<f64>() < p;
        if accepted {
            self.integrator.set_thermodynamic_state(to, self.ladder.kt(to))?;
        }

        let outcome = ExchangeOutcome { from, to, delta, accepted };
        self.statistics.record(&outcome);
        debug!(
            "{}: exchange {} -> {} (delta = {:.4}) {}",
            self.name,
            from,
            to,
            delta,
            if accepted { "accepted" } else { "rejected" }
        );
        Ok(outcome)
    }

    /// The usual outer loop: `n_exchanges` rounds of integration followed by
    /// one temperature move.
    pub fn run_rounds(&mut self, n_exchanges: usize, steps_per_exchange: usize) -> Result<()> {
        info!(
            "{}: {} exchange rounds of {} steps over {} temperatures",
            self.name,
            n_exchanges,
            steps_per_exchange,
            self.ladder.len()
        );
        for _ in 0..n_exchanges {
            self.run(steps_per_exchange)?;
            self.attempt_exchange()?;
        }

        match self.statistics.transition_acceptance_rate() {
            Some(rate) => {
                info!("{}: temperature move acceptance {:.2}%", self.name, 100.0 * rate);
                if rate < 0.01 {
                    warn!("{}: temperature moves are almost never accepted", self.name);
                }
            }
            None if self.ladder.len() > 1 => {
                warn!("{}: no temperature change was ever proposed", self.name);
            }
            None => {}
        }
        info!(
            "{}: state occupancy {:?}",
            self.name,
            self.trajectory.state_occupancy(self.ladder.len())
        );
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_index(&self) -> usize {
        self.integrator.state_index()
    }

    pub fn integrator(&self) -> &BrownianIntegrator<P, R> {
        &self.integrator
    }

    pub fn ladder(&self) -> &TemperatureLadder {
        &self.ladder
    }

    pub fn partition(&self) -> &PartitionTable {
        &self.partition
    }

    pub fn trajectory(&self) -> &Trajectory<Sample> {
        &self.trajectory
    }

    pub fn statistics(&self) -> &ExchangeStatistics {
        &self.statistics
    }

    pub fn into_trajectory(self) -> Trajectory<Sample> {
        self.trajectory
    }
}
