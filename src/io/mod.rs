//! IO module - configuration and output files.

mod config;
mod writer;

pub use config::{ProtocolConfig, ProtocolKind, SimulationConfig, TemperingConfig, UmbrellaConfig};
pub use writer::{
    format_exp, write_bias_matrix, write_kts, write_reference, write_tempering_outputs,
    write_tempering_trajectory, write_umbrella_outputs, write_umbrella_trajectory,
};
