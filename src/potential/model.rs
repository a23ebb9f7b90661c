//! Closed set of potentials selectable from configuration.

use serde::{Deserialize, Serialize};

use super::double_well::AsymmetricDoubleWell;
use super::traits::Potential;

/// Harmonic well ½·k·(x − center)², with analytic Z = sqrt(2π·kT/k).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarmonicWell {
    pub center: f64,
    pub k: f64,
}

impl Potential for HarmonicWell {
    fn energy(&self, x: f64) -> f64 {
        0.5 * self.k * (x - self.center).powi(2)
    }

    fn gradient(&self, x: f64) -> f64 {
        self.k * (x - self.center)
    }
}

/// Zero energy everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatPotential;

impl Potential for FlatPotential {
    fn energy(&self, _x: f64) -> f64 {
        0.0
    }

    fn gradient(&self, _x: f64) -> f64 {
        0.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PotentialModel {
    #[default]
    DoubleWell,
    Harmonic { center: f64, k: f64 },
    Flat,
}

impl Potential for PotentialModel {
    #[inline]
    fn energy(&self, x: f64) -> f64 {
        match *self {
            PotentialModel::DoubleWell => AsymmetricDoubleWell.energy(x),
            PotentialModel::Harmonic { center, k } => HarmonicWell { center, k }.energy(x),
            PotentialModel::Flat => FlatPotential.energy(x),
        }
    }

    #[inline]
    fn gradient(&self, x: f64) -> f64 {
        match *self {
            PotentialModel::DoubleWell => AsymmetricDoubleWell.gradient(x),
            PotentialModel::Harmonic { center, k } => HarmonicWell { center, k }.gradient(x),
            PotentialModel::Flat => FlatPotential.gradient(x),
        }
    }
}
