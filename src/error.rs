//! Error type shared by every stage of a simulation run.

use thiserror::Error;

/// Everything that can go wrong while setting up or running a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Rejected at construction time, before any stepping.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Adaptive quadrature hit its subdivision limit or produced a non-finite value.
    #[error(
        "quadrature did not converge at kT = {kt}: estimate {estimate:e}, error {error:e} after {subdivisions} subdivisions"
    )]
    QuadratureDiverged {
        kt: f64,
        estimate: f64,
        error: f64,
        subdivisions: usize,
    },

    #[error("partition function at kT = {kt} must be finite and strictly positive, got {value}")]
    InvalidPartitionFunction { kt: f64, value: f64 },

    /// Position, gradient or energy left the finite range during a step.
    #[error("non-finite {quantity}: {value}")]
    NonFinite { quantity: &'static str, value: f64 },

    /// A step failure annotated with the replica and step that produced it.
    #[error("replica '{replica}' failed at step {step}")]
    Replica {
        replica: String,
        step: usize,
        source: Box<SimError>,
    },

    #[error("temperature exchange attempted before any sample was recorded")]
    EmptyTrajectory,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl SimError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SimError::InvalidConfig(msg.into())
    }

    /// Attach replica/step context to a failure raised inside a step.
    pub(crate) fn in_replica(self, replica: &str, step: usize) -> Self {
        SimError::Replica {
            replica: replica.to_string(),
            step,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_replica_context_keeps_source() {
        let err = SimError::NonFinite { quantity: "position", value: f64::NAN }
            .in_replica("st", 42);
        assert_eq!(err.to_string(), "replica 'st' failed at step 42");
        let source = err.source().expect("source should be kept");
        assert!(source.to_string().contains("non-finite position"));
    }
}
