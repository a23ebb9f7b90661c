//! Euler–Maruyama integrator for overdamped (Brownian) Langevin dynamics.
//!
//! x ← x − (dt / mγ)·∇E(x) + sqrt(2·dt·kT / mγ)·ξ,   ξ ~ N(0, 1)
//!
//! First order in dt: the sampled distribution only approaches exp(−E/kT)
//! as dt → 0, so dt has to be small compared with the curvature of E.

use nalgebra::DVector;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use super::projection::Projection;
use crate::error::{Result, SimError};
use crate::potential::{HarmonicRestraint, Potential};

/// Time step, mass and damping of the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorParams {
    pub dt: f64,
    pub mass: f64,
    pub damping: f64,
}

impl Default for IntegratorParams {
    fn default() -> Self {
        Self {
            dt: 0.005,
            mass: 1.0,
            damping: 1.0,
        }
    }
}

impl IntegratorParams {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("dt", self.dt), ("mass", self.mass), ("damping", self.damping)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::invalid(format!(
                    "integrator {name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Drift coefficient dt / (m·γ).
    pub fn drift_coefficient(&self) -> f64 {
        self.dt / (self.mass * self.damping)
    }
}

/// One point of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Collective variable after the step.
    pub position: f64,
    /// Thermodynamic state the step was taken in.
    pub state_index: usize,
    /// Unbiased potential energy at `position`.
    pub energy: f64,
}

impl Sample {
    /// Energy in units of kT.
    pub fn reduced_energy(&self, kt: f64) -> f64 {
        self.energy / kt
    }
}

/// Temperature and the noise amplitude derived from it.
///
/// Always replaced as a whole so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Thermal {
    kt: f64,
    beta: f64,
    coeff_b: f64,
}

impl Thermal {
    fn new(kt: f64, params: &IntegratorParams) -> Result<Self> {
        if !(kt.is_finite() && kt >= 0.0) {
            return Err(SimError::invalid(format!(
                "temperature kT must be finite and non-negative, got {kt}"
            )));
        }
        Ok(Self {
            kt,
            beta: 1.0 / kt,
            coeff_b: (2.0 * params.dt * kt / (params.mass * params.damping)).sqrt(),
        })
    }
}

/// Brownian dynamics propagator for a single particle.
///
/// Owns its random source; with a seeded `R` every trajectory is reproducible.
pub struct BrownianIntegrator<P: Potential, R: Rng> {
    potential: P,
    params: IntegratorParams,
    coeff_a: f64,
    thermal: Thermal,
    position: DVector<f64>,
    projection: Projection,
    state_index: usize,
    steps: usize,
    rng: R,
}

impl<P: Potential, R: Rng> BrownianIntegrator<P, R> {
    pub fn new(
        potential: P,
        params: IntegratorParams,
        kt: f64,
        position: DVector<f64>,
        rng: R,
    ) -> Result<Self> {
        params.validate()?;
        let thermal = Thermal::new(kt, &params)?;
        let projection = Projection::for_dimension(position.len())?;
        check_finite_vector("initial position", &position)?;

        Ok(Self {
            potential,
            coeff_a: params.drift_coefficient(),
            params,
            thermal,
            position,
            projection,
            state_index: 0,
            steps: 0,
            rng,
        })
    }

    /// Perform a single integration step, optionally under an umbrella restraint.
    ///
    /// The gradient acts on every coordinate independently; the energy is
    /// evaluated on the projected collective variable.
    pub fn step(&mut self, restraint: Option<&HarmonicRestraint>) -> Result<Sample> {
        let potential = &self.potential;
        let mut gradient = self.position.map(|x| potential.gradient(x));
        if let Some(r) = restraint {
            gradient += self.position.map(|x| r.gradient(x));
        }
        check_finite_vector("gradient", &gradient)?;

        let rng = &mut self.rng;
        let noise = DVector::<f64>::from_fn(self.position.len(), |_, _| rng.sample(StandardNormal));

        self.position -= gradient * self.coeff_a;
        self.position += noise * self.thermal.coeff_b;
        check_finite_vector("position", &self.position)?;

        let position = self.projection.project(&self.position);
        let energy = self.potential.energy(position);
        if !energy.is_finite() {
            return Err(SimError::NonFinite { quantity: "energy", value: energy });
        }

        self.steps += 1;
        Ok(Sample {
            position,
            state_index: self.state_index,
            energy,
        })
    }

    /// Change the temperature; kT, beta and the noise amplitude move together.
    pub fn set_temperature(&mut self, kt: f64) -> Result<()> {
        self.thermal = Thermal::new(kt, &self.params)?;
        Ok(())
    }

    /// Move to another thermodynamic state: label and temperature in one update.
    pub fn set_thermodynamic_state(&mut self, index: usize, kt: f64) -> Result<()> {
        let thermal = Thermal::new(kt, &self.params)?;
        self.thermal = thermal;
        self.state_index = index;
        Ok(())
    }

    /// Relabel the current state without touching the temperature.
    pub fn set_state_index(&mut self, index: usize) {
        self.state_index = index;
    }

    pub fn set_position(&mut self, position: DVector<f64>) -> Result<()> {
        if position.len() != self.position.len() {
            return Err(SimError::invalid(format!(
                "position has {} coordinates, integrator was built for {}",
                position.len(),
                self.position.len()
            )));
        }
        check_finite_vector("position", &position)?;
        self.position = position;
        Ok(())
    }

    /// Place the particle so that its collective variable equals `value`.
    pub fn place_at(&mut self, value: f64) -> Result<()> {
        self.set_position(Projection::embed(value, self.position.len()))
    }

    pub fn potential(&self) -> &P {
        &self.potential
    }

    pub fn params(&self) -> &IntegratorParams {
        &self.params
    }

    pub fn position(&self) -> &DVector<f64> {
        &self.position
    }

    pub fn dimension(&self) -> usize {
        self.position.len()
    }

    pub fn collective_variable(&self) -> f64 {
        self.projection.project(&self.position)
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn kt(&self) -> f64 {
        self.thermal.kt
    }

    pub fn beta(&self) -> f64 {
        self.thermal.beta
    }

    pub fn drift_coefficient(&self) -> f64 {
        self.coeff_a
    }

    pub fn noise_coefficient(&self) -> f64 {
        self.thermal.coeff_b
    }

    pub fn state_index(&self) -> usize {
        self.state_index
    }

    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

fn check_finite_vector(quantity: &'static str, v: &DVector<f64>) -> Result<()> {
    match v.iter().find(|x| !x.is_finite()) {
        Some(&value) => Err(SimError::NonFinite { quantity, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potential::{FlatPotential, HarmonicWell, PotentialModel};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn integrator<P: Potential>(potential: P, kt: f64, x0: &[f64]) -> BrownianIntegrator<P, StdRng> {
        BrownianIntegrator::new(
            potential,
            IntegratorParams::default(),
            kt,
            DVector::from_column_slice(x0),
            StdRng::seed_from_u64(7),
        )
        .unwrap()
    }

    #[test]
    fn test_coefficients() {
        let params = IntegratorParams { dt: 0.01, mass: 2.0, damping: 0.5 };
        let integ = BrownianIntegrator::new(
            FlatPotential,
            params,
            4.0,
            DVector::from_element(1, 0.0),
            StdRng::seed_from_u64(1),
        )
        .unwrap();
        assert_relative_eq!(integ.drift_coefficient(), 0.01);
        assert_relative_eq!(integ.beta(), 0.25);
        assert_relative_eq!(integ.noise_coefficient(), (2.0_f64 * 0.01 / (0.25 * 1.0)).sqrt(), epsilon = 1e-14);
    }

    #[test]
    fn test_set_temperature_updates_noise_together() {
        let mut integ = integrator(FlatPotential, 1.0, &[0.0]);
        let before = integ.noise_coefficient();
        integ.set_temperature(4.0).unwrap();
        assert_relative_eq!(integ.beta(), 0.25);
        assert_relative_eq!(integ.noise_coefficient(), 2.0 * before, epsilon = 1e-14);

        // A rejected temperature leaves the previous state intact.
        assert!(integ.set_temperature(f64::NAN).is_err());
        assert_relative_eq!(integ.kt(), 4.0);
        assert_relative_eq!(integ.noise_coefficient(), 2.0 * before, epsilon = 1e-14);
    }

    #[test]
    fn test_zero_gradient_zero_noise_keeps_position() {
        let mut integ = integrator(FlatPotential, 0.0, &[1.25]);
        assert_eq!(integ.noise_coefficient(), 0.0);
        let sample = integ.step(None).unwrap();
        assert_eq!(sample.position, 1.25);
        assert_eq!(integ.position()[0], 1.25);
        assert_eq!(sample.energy, 0.0);
    }

    #[test]
    fn test_noise_free_step_follows_gradient() {
        let well = HarmonicWell { center: 0.0, k: 2.0 };
        let mut integ = integrator(well, 0.0, &[1.0]);
        let sample = integ.step(None).unwrap();
        assert_relative_eq!(sample.position, 1.0 - 0.005 * 2.0, epsilon = 1e-14);

        let restraint = HarmonicRestraint::new(1.0, 10.0);
        let before = integ.position()[0];
        let sample = integ.step(Some(&restraint)).unwrap();
        let expected = before - 0.005 * (2.0 * before + 10.0 * (before - 1.0));
        assert_relative_eq!(sample.position, expected, epsilon = 1e-14);
        assert_eq!(integ.steps_taken(), 2);
    }

    #[test]
    fn test_radial_projection_in_two_dimensions() {
        let mut integ = integrator(FlatPotential, 0.0, &[3.0, 4.0]);
        assert_eq!(integ.projection(), Projection::Radial);
        let sample = integ.step(None).unwrap();
        assert_relative_eq!(sample.position, 5.0, epsilon = 1e-14);

        integ.place_at(2.0).unwrap();
        assert_relative_eq!(integ.collective_variable(), 2.0, epsilon = 1e-14);
        assert!(integ.set_position(DVector::from_element(3, 0.0)).is_err());
    }

    #[test]
    fn test_sample_carries_state_index() {
        let mut integ = integrator(PotentialModel::DoubleWell, 2.0, &[3.5]);
        integ.set_thermodynamic_state(3, 10.0).unwrap();
        let sample = integ.step(None).unwrap();
        assert_eq!(sample.state_index, 3);
        assert_relative_eq!(sample.energy, PotentialModel::DoubleWell.energy(sample.position));
        assert_relative_eq!(sample.reduced_energy(10.0), sample.energy / 10.0);
    }

    #[test]
    fn test_same_seed_same_steps() {
        let mut a = integrator(PotentialModel::DoubleWell, 2.0, &[3.5]);
        let mut b = integrator(PotentialModel::DoubleWell, 2.0, &[3.5]);
        for _ in 0..100 {
            assert_eq!(a.step(None).unwrap(), b.step(None).unwrap());
        }
    }

    #[test]
    fn test_divergence_is_reported() {
        // dt far too large for the quartic well: the particle blows up.
        let params = IntegratorParams { dt: 10.0, ..IntegratorParams::default() };
        let mut integ = BrownianIntegrator::new(
            PotentialModel::DoubleWell,
            params,
            1.0,
            DVector::from_element(1, 10.0),
            StdRng::seed_from_u64(3),
        )
        .unwrap();
        let err = (0..50).find_map(|_| integ.step(None).err()).expect("must diverge");
        assert!(matches!(err, SimError::NonFinite { .. }));
    }

    #[test]
    fn test_harmonic_variance() {
        // Stationary variance of the discretised Ornstein–Uhlenbeck process:
        // kT / (k·(1 - a·k/2)), with a = dt / (m·γ).
        let k = 1.0;
        let mut integ = integrator(HarmonicWell { center: 0.0, k }, 1.0, &[0.0]);
        let n = 1_000_000;
        let mut sum = 0.0;
        let mut sum2 = 0.0;
        for _ in 0..n {
            let x = integ.step(None).unwrap().position;
            sum += x;
            sum2 += x * x;
        }
        let mean = sum / n as f64;
        let var = sum2 / n as f64 - mean * mean;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 0.1);
        assert_relative_eq!(var, 1.0 / (k * (1.0 - 0.0025)), max_relative = 0.15);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = IntegratorParams { damping: 0.0, ..IntegratorParams::default() };
        let res = BrownianIntegrator::new(
            FlatPotential,
            params,
            1.0,
            DVector::from_element(1, 0.0),
            StdRng::seed_from_u64(0),
        );
        assert!(matches!(res, Err(SimError::InvalidConfig(_))));
    }
}
