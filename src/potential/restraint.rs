//! Harmonic umbrella restraint.

use serde::{Deserialize, Serialize};

use super::traits::Potential;
use crate::error::{Result, SimError};

/// Bias ½·k·(x − center)² applied on top of a potential.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarmonicRestraint {
    pub center: f64,
    pub force_constant: f64,
}

impl HarmonicRestraint {
    pub fn new(center: f64, force_constant: f64) -> Self {
        Self { center, force_constant }
    }

    /// Builds one restraint per (center, force constant) pair.
    pub fn from_pairs(centers: &[f64], force_constants: &[f64]) -> Result<Vec<Self>> {
        if centers.len() != force_constants.len() {
            return Err(SimError::invalid(format!(
                "{} restraint centers but {} force constants",
                centers.len(),
                force_constants.len()
            )));
        }
        Ok(centers
            .iter()
            .zip(force_constants)
            .map(|(&c, &k)| Self::new(c, k))
            .collect())
    }
}

impl Potential for HarmonicRestraint {
    fn energy(&self, x: f64) -> f64 {
        let d = x - self.center;
        0.5 * self.force_constant * d * d
    }

    fn gradient(&self, x: f64) -> f64 {
        self.force_constant * (x - self.center)
    }
}
