//! Asymmetric double-well potential.
//!
//! E(x) = 2(x - 2) - 6(x - 2)² + (x - 2)⁴
//!
//! The deep well sits near x ≈ 0.19 (E ≈ -12.6), the shallow one near
//! x ≈ 3.65 (E ≈ -5.6), separated by a barrier close to x ≈ 2.17.

use serde::{Deserialize, Serialize};

use super::traits::Potential;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AsymmetricDoubleWell;

impl Potential for AsymmetricDoubleWell {
    fn energy(&self, x: f64) -> f64 {
        let y = x - 2.0;
        2.0 * y - 6.0 * y * y + y.powi(4)
    }

    fn gradient(&self, x: f64) -> f64 {
        4.0 * x.powi(3) - 24.0 * x * x + 36.0 * x - 6.0
    }
}
