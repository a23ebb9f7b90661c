//! Umbrella Sampling: one biased sub-run per harmonic restraint.
//!
//! Windows are sampled one after another with the same integrator; no
//! information flows between them except through the random stream.

use log::info;
use rand::Rng;
use serde::Serialize;

use super::traits::TrajectoryPoint;
use super::trajectory::Trajectory;
use crate::dynamics::{BrownianIntegrator, Sample};
use crate::error::{Result, SimError};
use crate::potential::{HarmonicRestraint, Potential};

/// A sample together with the energy of every restraint at that position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UmbrellaSample {
    pub sample: Sample,
    /// `bias[j]` is restraint `j` evaluated at `sample.position`, for all windows.
    pub bias: Vec<f64>,
}

impl TrajectoryPoint for UmbrellaSample {
    fn sample(&self) -> &Sample {
        &self.sample
    }
}

pub struct UmbrellaSamplingReplica<P: Potential, R: Rng> {
    name: String,
    integrator: BrownianIntegrator<P, R>,
    restraints: Vec<HarmonicRestraint>,
    windows: Vec<Trajectory<UmbrellaSample>>,
}

impl<P: Potential, R: Rng> UmbrellaSamplingReplica<P, R> {
    pub fn new(integrator: BrownianIntegrator<P, R>, restraints: Vec<HarmonicRestraint>) -> Result<Self> {
        if restraints.is_empty() {
            return Err(SimError::invalid("umbrella sampling needs at least one restraint"));
        }
        for (i, r) in restraints.iter().enumerate() {
            if !(r.center.is_finite() && r.force_constant.is_finite() && r.force_constant >= 0.0) {
                return Err(SimError::invalid(format!(
                    "restraint {i} has center {} and force constant {}",
                    r.center, r.force_constant
                )));
            }
        }
        Ok(Self {
            name: "us".to_string(),
            integrator,
            restraints,
            windows: Vec::new(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sample every window for `n_steps`, replacing any earlier windows.
    ///
    /// Each window starts at its restraint center and is labelled with the
    /// restraint's position in the list.
    pub fn run(&mut self, n_steps: usize) -> Result<()> {
        let mut windows = Vec::with_capacity(self.restraints.len());
        for (index, restraint) in self.restraints.iter().enumerate() {
            self.integrator.place_at(restraint.center)?;
            self.integrator.set_state_index(index);

            let label = format!("{} window {}", self.name, index);
            let mut traj = Trajectory::with_capacity(n_steps);
            for step in 0..n_steps {
                let sample = self
                    .integrator
                    .step(Some(restraint))
                    .map_err(|e| e.in_replica(&label, step))?;
                let bias = bias_vector(&self.restraints, sample.position);
                traj.push(UmbrellaSample { sample, bias });
            }
            info!(
                "{}: center {:.4}, mean position {:.4}",
                label,
                restraint.center,
                traj.mean_position().unwrap_or(f64::NAN)
            );
            windows.push(traj);
        }
        self.windows = windows;
        info!("{}: {} windows completed", self.name, self.restraints.len());
        Ok(())
    }

    /// Energy of every restraint at `x`.
    pub fn bias_vector(&self, x: f64) -> Vec<f64> {
        bias_vector(&self.restraints, x)
    }

    pub fn window_mean(&self, index: usize) -> Option<f64> {
        self.windows.get(index).and_then(|w| w.mean_position())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn integrator(&self) -> &BrownianIntegrator<P, R> {
        &self.integrator
    }

    pub fn restraints(&self) -> &[HarmonicRestraint] {
        &self.restraints
    }

    pub fn windows(&self) -> &[Trajectory<UmbrellaSample>] {
        &self.windows
    }

    pub fn into_windows(self) -> Vec<Trajectory<UmbrellaSample>> {
        self.windows
    }
}

fn bias_vector(restraints: &[HarmonicRestraint], x: f64) -> Vec<f64> {
    restraints.iter().map(|r| r.energy(x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::IntegratorParams;
    use crate::potential::{FlatPotential, PotentialModel};
    use approx::assert_relative_eq;
    use nalgebra::DVector;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn replica<P: Potential>(
        potential: P,
        restraints: Vec<HarmonicRestraint>,
        dim: usize,
    ) -> UmbrellaSamplingReplica<P, StdRng> {
        let integrator = BrownianIntegrator::new(
            potential,
            IntegratorParams::default(),
            1.0,
            DVector::zeros(dim),
            StdRng::seed_from_u64(17),
        )
        .unwrap();
        UmbrellaSamplingReplica::new(integrator, restraints).unwrap()
    }

    #[test]
    fn test_rejects_empty_restraints() {
        let integrator = BrownianIntegrator::new(
            FlatPotential,
            IntegratorParams::default(),
            1.0,
            DVector::zeros(1),
            StdRng::seed_from_u64(0),
        )
        .unwrap();
        assert!(UmbrellaSamplingReplica::new(integrator, vec![]).is_err());
    }

    #[test]
    fn test_one_window_per_restraint_with_full_bias() {
        let restraints = HarmonicRestraint::from_pairs(&[-0.5, 1.0, 2.5], &[50.0; 3]).unwrap();
        let mut rep = replica(PotentialModel::DoubleWell, restraints.clone(), 1);
        rep.run(200).unwrap();

        assert_eq!(rep.windows().len(), 3);
        for (i, window) in rep.windows().iter().enumerate() {
            assert_eq!(window.len(), 200);
            for s in window {
                assert_eq!(s.sample.state_index, i);
                assert_eq!(s.bias.len(), 3);
                for (b, r) in s.bias.iter().zip(&restraints) {
                    assert_relative_eq!(*b, r.energy(s.sample.position));
                }
            }
        }

        // A second run replaces the windows instead of appending to them.
        rep.run(10).unwrap();
        assert_eq!(rep.windows().len(), 3);
        assert_eq!(rep.windows()[0].len(), 10);
    }

    #[test]
    fn test_stiff_windows_stay_near_centers() {
        let centers = [-0.9, 0.5, 2.0, 3.4, 4.7];
        let restraints = HarmonicRestraint::from_pairs(&centers, &[90.0; 5]).unwrap();
        let mut rep = replica(PotentialModel::DoubleWell, restraints, 1);
        rep.run(4000).unwrap();
        for (i, c) in centers.iter().enumerate() {
            let mean = rep.window_mean(i).unwrap();
            // The double well drags the mean by roughly -E'(c)/k.
            let shift = -PotentialModel::DoubleWell.gradient(*c) / 90.0;
            assert!(
                (mean - c).abs() < shift.abs() + 0.1,
                "window {i}: mean {mean} vs center {c}"
            );
        }
    }

    #[test]
    fn test_flat_windows_center_on_restraint() {
        let restraints = HarmonicRestraint::from_pairs(&[-1.0, 1.0], &[100.0, 100.0]).unwrap();
        let mut rep = replica(FlatPotential, restraints, 1);
        rep.run(5000).unwrap();
        assert_relative_eq!(rep.window_mean(0).unwrap(), -1.0, epsilon = 0.03);
        assert_relative_eq!(rep.window_mean(1).unwrap(), 1.0, epsilon = 0.03);
    }

    #[test]
    fn test_multidimensional_windows_use_radius() {
        let restraints = vec![HarmonicRestraint::new(2.0, 100.0)];
        let mut rep = replica(FlatPotential, restraints, 3);
        rep.run(10).unwrap();
        assert!(rep.windows()[0].iter().all(|s| s.sample.position >= 0.0));
        assert_eq!(rep.integrator().dimension(), 3);
    }
}
