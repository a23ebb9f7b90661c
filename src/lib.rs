//! Rust Enhanced Sampling - Brownian dynamics on a one-dimensional potential
//! under Simulated Tempering and Umbrella Sampling.
//!
//! The crate produces trajectories, bias matrices and exact reference
//! distributions in the layout expected by WHAM-style reweighting tools.

pub mod error;
pub mod potential;
pub mod dynamics;
pub mod sampling;
pub mod analysis;
pub mod io;
pub mod protocol;

// Re-export commonly used types at crate root
pub use error::{Result, SimError};
pub use potential::{AsymmetricDoubleWell, FlatPotential, HarmonicRestraint, HarmonicWell, Potential, PotentialModel, Quadrature};
pub use dynamics::{BrownianIntegrator, IntegratorParams, Projection, Sample};
pub use sampling::{ExchangeOutcome, ExchangeStatistics, PartitionTable, SimulatedTemperingReplica, TemperatureLadder, Trajectory, TrajectoryPoint, UmbrellaSample, UmbrellaSamplingReplica};
pub use analysis::{bin_index, linspace, reference_distribution, tempering_bias_matrix, umbrella_bias_matrix, Discretizer};
pub use io::{ProtocolConfig, ProtocolKind, SimulationConfig, TemperingConfig, UmbrellaConfig};
pub use protocol::{run, run_simulated_tempering, run_umbrella_sampling, RunOutput, TemperingOutput, UmbrellaOutput};
