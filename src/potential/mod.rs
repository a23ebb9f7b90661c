//! Potential module - energy surfaces, restraints and partition functions.

mod traits;
mod double_well;
mod restraint;
mod model;
mod quadrature;

pub use traits::Potential;
pub use double_well::AsymmetricDoubleWell;
pub use restraint::HarmonicRestraint;
pub use model::{FlatPotential, HarmonicWell, PotentialModel};
pub use quadrature::Quadrature;
