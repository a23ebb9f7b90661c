//! Temperature ladder and the partition functions tabulated on it.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::potential::{Potential, Quadrature};

/// Fixed ordered set of kT values. The index is the thermodynamic state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct TemperatureLadder {
    kts: Vec<f64>,
}

impl TemperatureLadder {
    pub fn new(kts: Vec<f64>) -> Result<Self> {
        if kts.is_empty() {
            return Err(SimError::invalid("temperature ladder is empty"));
        }
        if let Some((i, kt)) = kts.iter().enumerate().find(|(_, kt)| !(kt.is_finite() && **kt > 0.0)) {
            return Err(SimError::invalid(format!(
                "ladder entry {i} must be a positive finite kT, got {kt}"
            )));
        }
        Ok(Self { kts })
    }

    pub fn len(&self) -> usize {
        self.kts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kts.is_empty()
    }

    pub fn kt(&self, index: usize) -> f64 {
        self.kts[index]
    }

    pub fn beta(&self, index: usize) -> f64 {
        1.0 / self.kts[index]
    }

    pub fn kts(&self) -> &[f64] {
        &self.kts
    }

    pub fn check_index(&self, index: usize) -> Result<()> {
        if index < self.kts.len() {
            Ok(())
        } else {
            Err(SimError::invalid(format!(
                "state index {index} is outside the ladder of {} temperatures",
                self.kts.len()
            )))
        }
    }
}

impl TryFrom<Vec<f64>> for TemperatureLadder {
    type Error = SimError;

    fn try_from(kts: Vec<f64>) -> Result<Self> {
        Self::new(kts)
    }
}

impl From<TemperatureLadder> for Vec<f64> {
    fn from(ladder: TemperatureLadder) -> Self {
        ladder.kts
    }
}

/// Z(kT) for every ladder entry, computed once before any stepping.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionTable {
    z: Vec<f64>,
    ln_z: Vec<f64>,
}

impl PartitionTable {
    pub fn compute<P: Potential>(
        potential: &P,
        ladder: &TemperatureLadder,
        quadrature: &Quadrature,
    ) -> Result<Self> {
        let z = potential.partition_function(ladder.kts(), quadrature)?;
        Self::from_values(ladder, z)
    }

    /// Wrap externally computed values; they must match the ladder one-to-one.
    pub fn from_values(ladder: &TemperatureLadder, z: Vec<f64>) -> Result<Self> {
        if z.len() != ladder.len() {
            return Err(SimError::invalid(format!(
                "{} partition function values for a ladder of {} temperatures",
                z.len(),
                ladder.len()
            )));
        }
        for (&value, &kt) in z.iter().zip(ladder.kts()) {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidPartitionFunction { kt, value });
            }
        }
        let ln_z = z.iter().map(|v| v.ln()).collect();
        Ok(Self { z, ln_z })
    }

    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    pub fn z(&self, index: usize) -> f64 {
        self.z[index]
    }

    pub fn ln_z(&self, index: usize) -> f64 {
        self.ln_z[index]
    }

    pub fn values(&self) -> &[f64] {
        &self.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potential::PotentialModel;
    use approx::assert_relative_eq;

    #[test]
    fn test_ladder_validation() {
        assert!(TemperatureLadder::new(vec![]).is_err());
        assert!(TemperatureLadder::new(vec![1.0, -2.0]).is_err());
        assert!(TemperatureLadder::new(vec![1.0, f64::INFINITY]).is_err());
        let ladder = TemperatureLadder::new(vec![2.0, 4.0]).unwrap();
        assert_relative_eq!(ladder.beta(1), 0.25);
        assert!(ladder.check_index(2).is_err());
    }

    #[test]
    fn test_ladder_from_yaml() {
        let ladder: TemperatureLadder = serde_yaml::from_str("[2.0, 4.0, 7.0]").unwrap();
        assert_eq!(ladder.kts(), &[2.0, 4.0, 7.0]);
        assert!(serde_yaml::from_str::<TemperatureLadder>("[]").is_err());
    }

    #[test]
    fn test_partition_table_matches_ladder() {
        let ladder = TemperatureLadder::new(vec![1.0, 2.0]).unwrap();
        assert!(PartitionTable::from_values(&ladder, vec![1.0]).is_err());
        assert!(matches!(
            PartitionTable::from_values(&ladder, vec![1.0, 0.0]),
            Err(SimError::InvalidPartitionFunction { .. })
        ));

        let model = PotentialModel::Harmonic { center: 0.0, k: 1.0 };
        let table = PartitionTable::compute(&model, &ladder, &Quadrature::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_relative_eq!(table.ln_z(1) - table.ln_z(0), 0.5 * 2f64.ln(), epsilon = 1e-8);
    }
}
