//! Bias matrices and exact reference distributions for reweighting.
//!
//! Rows are bin centers, columns are thermodynamic states.

use nalgebra::DMatrix;

use crate::error::{Result, SimError};
use crate::potential::{HarmonicRestraint, Potential};
use crate::sampling::TemperatureLadder;

/// `E(center) · (1/kT_i − 1/kT_target)` for every center and ladder state.
pub fn tempering_bias_matrix<P: Potential>(
    potential: &P,
    centers: &[f64],
    ladder: &TemperatureLadder,
    target: usize,
) -> Result<DMatrix<f64>> {
    ladder.check_index(target)?;
    let beta_target = ladder.beta(target);
    Ok(DMatrix::from_fn(centers.len(), ladder.len(), |c, i| {
        potential.energy(centers[c]) * (ladder.beta(i) - beta_target)
    }))
}

/// `restraint_i(center) / kT` for every center and restraint.
pub fn umbrella_bias_matrix(
    restraints: &[HarmonicRestraint],
    centers: &[f64],
    kt: f64,
) -> Result<DMatrix<f64>> {
    if !(kt.is_finite() && kt > 0.0) {
        return Err(SimError::invalid(format!("reference kT must be positive, got {kt}")));
    }
    Ok(DMatrix::from_fn(centers.len(), restraints.len(), |c, i| {
        restraints[i].energy(centers[c]) / kt
    }))
}

/// Unnormalised Boltzmann weight exp(−E(center)/kT) at each center.
pub fn reference_distribution<P: Potential>(potential: &P, centers: &[f64], kt: f64) -> Vec<(f64, f64)> {
    centers
        .iter()
        .map(|&c| (c, potential.boltzmann_weight(c, kt)))
        .collect()
}
