use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use rust_enhanced_sampling::{protocol, ProtocolConfig, ProtocolKind, SimulationConfig};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Protocol {
    /// Simulated Tempering
    St,
    /// Umbrella Sampling
    Us,
}

impl From<Protocol> for ProtocolKind {
    fn from(p: Protocol) -> Self {
        match p {
            Protocol::St => ProtocolKind::SimulatedTempering,
            Protocol::Us => ProtocolKind::UmbrellaSampling,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Brownian dynamics under simulated tempering or umbrella sampling", long_about = None)]
struct Args {
    /// YAML run configuration; without it the double-well reference run is used
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Protocol to run; replaces the configured one with its defaults if they differ
    #[arg(value_enum)]
    protocol: Option<Protocol>,

    /// Output directory (default: ST/ or US/)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Random seed, overriding the configuration
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(p) = args.protocol {
        let kind = ProtocolKind::from(p);
        if config.protocol.kind() != kind {
            config.protocol = ProtocolConfig::default_for(kind);
        }
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let output = args.output.unwrap_or_else(|| match config.protocol.kind() {
        ProtocolKind::SimulatedTempering => PathBuf::from("ST"),
        ProtocolKind::UmbrellaSampling => PathBuf::from("US"),
    });

    info!("seed {}", config.seed);
    let result = protocol::run(&config).context("simulation failed")?;
    result
        .write_to(&output)
        .with_context(|| format!("failed to write results to {}", output.display()))?;
    Ok(())
}
