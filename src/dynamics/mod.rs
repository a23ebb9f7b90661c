//! Dynamics module - overdamped Langevin integration.

mod projection;
mod integrator;

pub use projection::Projection;
pub use integrator::{BrownianIntegrator, IntegratorParams, Sample};
