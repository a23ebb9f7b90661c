//! Collective-variable projection of the integrator position.

use nalgebra::DVector;

use crate::error::{Result, SimError};

/// How a position vector is reduced to the scalar the potential is evaluated on.
///
/// Chosen once from the dimensionality; never re-checked per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// One-dimensional systems use the coordinate itself.
    FirstCoordinate,
    /// Multi-dimensional systems use the distance from the origin.
    Radial,
}

impl Projection {
    pub fn for_dimension(dim: usize) -> Result<Self> {
        match dim {
            0 => Err(SimError::invalid("position must have at least one coordinate")),
            1 => Ok(Projection::FirstCoordinate),
            _ => Ok(Projection::Radial),
        }
    }

    #[inline]
    pub fn project(&self, x: &DVector<f64>) -> f64 {
        match self {
            Projection::FirstCoordinate => x[0],
            Projection::Radial => x.norm(),
        }
    }

    /// A position of dimension `dim` whose coordinates are all `value / sqrt(dim)`.
    ///
    /// For one dimension this is `value` itself; otherwise its norm is `|value|`.
    pub fn embed(value: f64, dim: usize) -> DVector<f64> {
        DVector::from_element(dim, value / (dim as f64).sqrt())
    }
}
