//! Sampling module - Simulated Tempering and Umbrella Sampling replicas.

mod traits;
mod trajectory;
mod ladder;
mod tempering;
mod umbrella;

pub use traits::TrajectoryPoint;
pub use trajectory::Trajectory;
pub use ladder::{PartitionTable, TemperatureLadder};
pub use tempering::{
    acceptance_probability, exchange_log_acceptance, ExchangeOutcome, ExchangeStatistics,
    SimulatedTemperingReplica,
};
pub use umbrella::{UmbrellaSample, UmbrellaSamplingReplica};
