//! YAML run configuration.
//!
//! Every field has a default, so an empty document describes the reference
//! double-well run. Example:
//!
//! ```yaml
//! seed: 7
//! integrator:
//!   dt: 0.005
//! protocol:
//!   type: simulated-tempering
//!   kts: [2.0, 4.0, 7.0, 10.0, 15.0]
//!   n_exchanges: 2000
//!   steps_per_exchange: 100
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::{linspace, Discretizer};
use crate::dynamics::IntegratorParams;
use crate::error::{Result, SimError};
use crate::potential::{HarmonicRestraint, PotentialModel, Quadrature};
use crate::sampling::TemperatureLadder;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed of the random stream driving the whole run.
    pub seed: u64,
    pub potential: PotentialModel,
    pub integrator: IntegratorParams,
    pub discretization: Discretizer,
    pub protocol: ProtocolConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            potential: PotentialModel::default(),
            integrator: IntegratorParams::default(),
            discretization: Discretizer::default(),
            protocol: ProtocolConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolKind {
    SimulatedTempering,
    UmbrellaSampling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ProtocolConfig {
    SimulatedTempering(TemperingConfig),
    UmbrellaSampling(UmbrellaConfig),
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        ProtocolConfig::SimulatedTempering(TemperingConfig::default())
    }
}

impl ProtocolConfig {
    pub fn default_for(kind: ProtocolKind) -> Self {
        match kind {
            ProtocolKind::SimulatedTempering => {
                ProtocolConfig::SimulatedTempering(TemperingConfig::default())
            }
            ProtocolKind::UmbrellaSampling => ProtocolConfig::UmbrellaSampling(UmbrellaConfig::default()),
        }
    }

    pub fn kind(&self) -> ProtocolKind {
        match self {
            ProtocolConfig::SimulatedTempering(_) => ProtocolKind::SimulatedTempering,
            ProtocolConfig::UmbrellaSampling(_) => ProtocolKind::UmbrellaSampling,
        }
    }
}

/// Simulated Tempering run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperingConfig {
    pub kts: Vec<f64>,
    pub initial_position: Vec<f64>,
    pub initial_index: usize,
    /// Ladder state the bias matrix and reference distribution refer to.
    pub target_index: usize,
    pub n_exchanges: usize,
    pub steps_per_exchange: usize,
    pub quadrature: Quadrature,
}

impl Default for TemperingConfig {
    fn default() -> Self {
        Self {
            kts: vec![2.0, 4.0, 7.0, 10.0, 15.0],
            initial_position: vec![3.5],
            initial_index: 0,
            target_index: 0,
            n_exchanges: 2000,
            steps_per_exchange: 100,
            quadrature: Quadrature::default(),
        }
    }
}

impl TemperingConfig {
    pub fn ladder(&self) -> Result<TemperatureLadder> {
        TemperatureLadder::new(self.kts.clone())
    }

    pub fn validate(&self) -> Result<()> {
        let ladder = self.ladder()?;
        ladder.check_index(self.initial_index)?;
        ladder.check_index(self.target_index)?;
        if self.initial_position.is_empty() {
            return Err(SimError::invalid("initial position needs at least one coordinate"));
        }
        if self.steps_per_exchange == 0 {
            return Err(SimError::invalid(
                "steps_per_exchange must be at least 1 so every exchange sees a sample",
            ));
        }
        self.quadrature.validate()
    }
}

/// Umbrella Sampling run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UmbrellaConfig {
    pub kt: f64,
    pub dimensions: usize,
    pub centers: Vec<f64>,
    pub force_constants: Vec<f64>,
    pub steps_per_window: usize,
}

impl Default for UmbrellaConfig {
    fn default() -> Self {
        Self {
            kt: 1.0,
            dimensions: 1,
            centers: linspace(-0.9, 4.7, 30),
            force_constants: vec![90.0; 30],
            steps_per_window: 1000,
        }
    }
}

impl UmbrellaConfig {
    pub fn restraints(&self) -> Result<Vec<HarmonicRestraint>> {
        HarmonicRestraint::from_pairs(&self.centers, &self.force_constants)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.kt.is_finite() && self.kt > 0.0) {
            return Err(SimError::invalid(format!("kT must be positive, got {}", self.kt)));
        }
        if self.dimensions == 0 {
            return Err(SimError::invalid("dimensions must be at least 1"));
        }
        if self.centers.is_empty() {
            return Err(SimError::invalid("umbrella sampling needs at least one window"));
        }
        if self.centers.len() != self.force_constants.len() {
            return Err(SimError::invalid(format!(
                "{} restraint centers but {} force constants",
                self.centers.len(),
                self.force_constants.len()
            )));
        }
        Ok(())
    }
}

impl SimulationConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// All construction-time checks; nothing is stepped before this passes.
    pub fn validate(&self) -> Result<()> {
        self.integrator.validate()?;
        match &self.protocol {
            ProtocolConfig::SimulatedTempering(st) => st.validate(),
            ProtocolConfig::UmbrellaSampling(us) => us.validate(),
        }
    }
}
