//! Traits shared by trajectory samples.

use crate::dynamics::Sample;

/// Anything stored in a trajectory that carries an integrator sample.
pub trait TrajectoryPoint {
    fn sample(&self) -> &Sample;

    fn position(&self) -> f64 {
        self.sample().position
    }

    fn state_index(&self) -> usize {
        self.sample().state_index
    }

    fn energy(&self) -> f64 {
        self.sample().energy
    }
}

impl TrajectoryPoint for Sample {
    fn sample(&self) -> &Sample {
        self
    }
}
