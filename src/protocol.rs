//! End-to-end drivers: configuration in, trajectories and reweighting tables out.

use std::path::Path;

use log::info;
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::analysis::{reference_distribution, tempering_bias_matrix, umbrella_bias_matrix, Discretizer};
use crate::dynamics::{BrownianIntegrator, Sample};
use crate::error::Result;
use crate::io::{
    write_tempering_outputs, write_umbrella_outputs, ProtocolConfig, SimulationConfig, TemperingConfig,
    UmbrellaConfig,
};
use crate::potential::HarmonicRestraint;
use crate::sampling::{
    ExchangeStatistics, PartitionTable, SimulatedTemperingReplica, TemperatureLadder, Trajectory,
    UmbrellaSample, UmbrellaSamplingReplica,
};

/// Everything a Simulated Tempering run hands to the output stage.
#[derive(Debug, Clone)]
pub struct TemperingOutput {
    pub ladder: TemperatureLadder,
    pub partition: PartitionTable,
    pub target_index: usize,
    pub trajectory: Trajectory<Sample>,
    pub statistics: ExchangeStatistics,
    pub discretizer: Discretizer,
    /// Rows: bin centers. Columns: ladder states.
    pub bias_matrix: DMatrix<f64>,
    /// exp(−E/kT_target) at each bin center.
    pub reference: Vec<(f64, f64)>,
}

/// Everything an Umbrella Sampling run hands to the output stage.
#[derive(Debug, Clone)]
pub struct UmbrellaOutput {
    pub kt: f64,
    pub restraints: Vec<HarmonicRestraint>,
    /// One trajectory per restraint, in restraint order.
    pub windows: Vec<Trajectory<UmbrellaSample>>,
    pub discretizer: Discretizer,
    /// Rows: bin centers. Columns: restraints.
    pub bias_matrix: DMatrix<f64>,
    pub reference: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub enum RunOutput {
    Tempering(TemperingOutput),
    Umbrella(UmbrellaOutput),
}

impl RunOutput {
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        match self {
            RunOutput::Tempering(out) => write_tempering_outputs(dir, out),
            RunOutput::Umbrella(out) => write_umbrella_outputs(dir, out),
        }
    }
}

/// Validate `config` and run whichever protocol it selects.
pub fn run(config: &SimulationConfig) -> Result<RunOutput> {
    config.validate()?;
    match &config.protocol {
        ProtocolConfig::SimulatedTempering(st) => {
            run_simulated_tempering(config, st).map(RunOutput::Tempering)
        }
        ProtocolConfig::UmbrellaSampling(us) => run_umbrella_sampling(config, us).map(RunOutput::Umbrella),
    }
}

/// Partition functions are computed before the first step; a quadrature
/// failure aborts the run without producing any trajectory.
pub fn run_simulated_tempering(config: &SimulationConfig, st: &TemperingConfig) -> Result<TemperingOutput> {
    config.integrator.validate()?;
    st.validate()?;

    let ladder = st.ladder()?;
    let partition = PartitionTable::compute(&config.potential, &ladder, &st.quadrature)?;
    info!("partition functions {:?} for kT {:?}", partition.values(), ladder.kts());

    let integrator = BrownianIntegrator::new(
        config.potential,
        config.integrator,
        ladder.kt(st.initial_index),
        DVector::from_column_slice(&st.initial_position),
        StdRng::seed_from_u64(config.seed),
    )?;
    let mut replica =
        SimulatedTemperingReplica::new(integrator, ladder.clone(), partition.clone(), st.initial_index)?;
    replica.run_rounds(st.n_exchanges, st.steps_per_exchange)?;

    let centers = config.discretization.centers();
    let bias_matrix = tempering_bias_matrix(&config.potential, centers, &ladder, st.target_index)?;
    let reference = reference_distribution(&config.potential, centers, ladder.kt(st.target_index));
    let statistics = replica.statistics().clone();

    Ok(TemperingOutput {
        ladder,
        partition,
        target_index: st.target_index,
        trajectory: replica.into_trajectory(),
        statistics,
        discretizer: config.discretization.clone(),
        bias_matrix,
        reference,
    })
}

pub fn run_umbrella_sampling(config: &SimulationConfig, us: &UmbrellaConfig) -> Result<UmbrellaOutput> {
    config.integrator.validate()?;
    us.validate()?;

    let restraints = us.restraints()?;
    let integrator = BrownianIntegrator::new(
        config.potential,
        config.integrator,
        us.kt,
        DVector::zeros(us.dimensions),
        StdRng::seed_from_u64(config.seed),
    )?;
    let mut replica = UmbrellaSamplingReplica::new(integrator, restraints.clone())?;
    info!(
        "umbrella sampling: {} windows of {} steps at kT = {}",
        restraints.len(),
        us.steps_per_window,
        us.kt
    );
    replica.run(us.steps_per_window)?;

    let centers = config.discretization.centers();
    let bias_matrix = umbrella_bias_matrix(&restraints, centers, us.kt)?;
    let reference = reference_distribution(&config.potential, centers, us.kt);

    Ok(UmbrellaOutput {
        kt: us.kt,
        restraints,
        windows: replica.into_windows(),
        discretizer: config.discretization.clone(),
        bias_matrix,
        reference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::potential::{PotentialModel, Quadrature};

    fn small_tempering() -> SimulationConfig {
        SimulationConfig {
            protocol: ProtocolConfig::SimulatedTempering(TemperingConfig {
                n_exchanges: 50,
                steps_per_exchange: 20,
                ..TemperingConfig::default()
            }),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_tempering_output_shapes() {
        let out = match run(&small_tempering()).unwrap() {
            RunOutput::Tempering(out) => out,
            other => panic!("unexpected output {other:?}"),
        };
        assert_eq!(out.trajectory.len(), 1000);
        assert_eq!(out.bias_matrix.shape(), (21, 5));
        assert_eq!(out.reference.len(), 21);
        assert_eq!(out.partition.len(), 5);
        assert_eq!(out.statistics.total_attempts(), 50);
    }

    #[test]
    fn test_quadrature_failure_aborts_before_stepping() {
        let config = SimulationConfig {
            protocol: ProtocolConfig::SimulatedTempering(TemperingConfig {
                quadrature: Quadrature { max_subdivisions: 64, rel_tol: 0.0, abs_tol: 0.0, ..Quadrature::default() },
                ..TemperingConfig::default()
            }),
            ..SimulationConfig::default()
        };
        assert!(matches!(run(&config), Err(SimError::QuadratureDiverged { .. })));
    }

    #[test]
    fn test_umbrella_output_shapes() {
        let config = SimulationConfig {
            potential: PotentialModel::DoubleWell,
            protocol: ProtocolConfig::UmbrellaSampling(UmbrellaConfig {
                centers: vec![0.0, 1.0, 2.0, 3.0],
                force_constants: vec![90.0; 4],
                steps_per_window: 100,
                ..UmbrellaConfig::default()
            }),
            ..SimulationConfig::default()
        };
        let out = match run(&config).unwrap() {
            RunOutput::Umbrella(out) => out,
            other => panic!("unexpected output {other:?}"),
        };
        assert_eq!(out.windows.len(), 4);
        assert_eq!(out.bias_matrix.shape(), (21, 4));
        assert!(out.windows.iter().all(|w| w.len() == 100));
    }
}
