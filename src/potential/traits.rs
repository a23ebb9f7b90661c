//! Potential energy trait for one-dimensional collective variables.

use super::quadrature::Quadrature;
use crate::error::{Result, SimError};

/// Energy surface along a scalar collective variable.
pub trait Potential {
    /// Evaluate the energy at `x`.
    fn energy(&self, x: f64) -> f64;

    /// Compute dE/dx at `x`.
    fn gradient(&self, x: f64) -> f64;

    /// Numerical gradient using central difference.
    fn numerical_gradient(&self, x: f64, h: f64) -> f64 {
        (self.energy(x + h) - self.energy(x - h)) / (2.0 * h)
    }

    /// Boltzmann factor exp(-E(x)/kT).
    fn boltzmann_weight(&self, x: f64, kt: f64) -> f64 {
        (-self.energy(x) / kt).exp()
    }

    /// Partition function Z(kT) = ∫ exp(-E(x)/kT) dx for every entry of `kts`.
    ///
    /// The result has exactly one entry per temperature, in ladder order.
    /// Any value that does not converge, or that is not strictly positive,
    /// aborts the whole evaluation. Panels are refined around every local
    /// minimum on the scale of its thermal width, so stiff wells are resolved.
    fn partition_function(&self, kts: &[f64], quadrature: &Quadrature) -> Result<Vec<f64>> {
        quadrature.validate()?;
        let minima = local_minima(self, quadrature);
        kts.iter()
            .map(|&kt| {
                if !(kt.is_finite() && kt > 0.0) {
                    return Err(SimError::invalid(format!(
                        "partition function requires a positive finite kT, got {kt}"
                    )));
                }
                let points = well_breakpoints(self, &minima, kt, quadrature);
                let z = quadrature.integrate_with_breakpoints(
                    |x| self.boltzmann_weight(x, kt),
                    kt,
                    &points,
                )?;
                if z.is_finite() && z > 0.0 {
                    Ok(z)
                } else {
                    Err(SimError::InvalidPartitionFunction { kt, value: z })
                }
            })
            .collect()
    }
}

/// Local minima inside the quadrature domain.
///
/// Found from upward sign changes of the gradient on a uniform scan and
/// refined by bisection. A minimum is found however narrow its well is, as
/// long as no maximum sits within the same scan cell.
fn local_minima<P: Potential + ?Sized>(potential: &P, quadrature: &Quadrature) -> Vec<f64> {
    let n = quadrature.scan_points;
    let h = quadrature.scan_spacing();
    let grid = |i: usize| {
        if i + 1 == n {
            quadrature.upper
        } else {
            quadrature.lower + i as f64 * h
        }
    };

    let mut minima = Vec::new();
    let mut prev = potential.gradient(grid(0));
    for i in 1..n {
        let g = potential.gradient(grid(i));
        if prev < 0.0 && g >= 0.0 {
            let (mut lo, mut hi) = (grid(i - 1), grid(i));
            for _ in 0..64 {
                let mid = 0.5 * (lo + hi);
                if mid <= lo || mid >= hi {
                    break;
                }
                if potential.gradient(mid) < 0.0 {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            minima.push(hi);
        }
        prev = g;
    }
    minima
}

/// Panel edges at each minimum and at geometrically growing offsets from it,
/// starting at half the thermal width sqrt(kT / E'').
fn well_breakpoints<P: Potential + ?Sized>(
    potential: &P,
    minima: &[f64],
    kt: f64,
    quadrature: &Quadrature,
) -> Vec<f64> {
    let span = quadrature.upper - quadrature.lower;
    let mut points = Vec::new();
    for &m in minima {
        let dx = 1e-6 * m.abs().max(1.0);
        let curvature = (potential.gradient(m + dx) - potential.gradient(m - dx)) / (2.0 * dx);
        let width = (kt / curvature).sqrt();
        let width = if width.is_finite() && width > 0.0 {
            width.min(quadrature.scan_spacing())
        } else {
            quadrature.scan_spacing()
        };

        points.push(m);
        let mut offset = 0.5 * width;
        while offset < span {
            points.push(m - offset);
            points.push(m + offset);
            offset *= 2.0;
        }
    }
    points
}

impl<P: Potential + ?Sized> Potential for &P {
    fn energy(&self, x: f64) -> f64 {
        (**self).energy(x)
    }

    fn gradient(&self, x: f64) -> f64 {
        (**self).gradient(x)
    }
}
