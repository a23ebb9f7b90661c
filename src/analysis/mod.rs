//! Analysis module - discretisation and the tables handed to reweighting.

mod discretize;
mod tables;

pub use discretize::{bin_index, linspace, Discretizer, BinningConfig};
pub use tables::{reference_distribution, tempering_bias_matrix, umbrella_bias_matrix};
