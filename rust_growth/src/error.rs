//! Error types for configuration and simulation.

use thiserror::Error;

use crate::state::{PeriodSnapshot, StateSeries};

/// Simulation result type
pub type Result<T> = std::result::Result<T, SimulationError>;

/// A configuration that cannot be simulated.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing key, non-numeric value or malformed document.
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("parameter `{field}` = {value} is out of range: {reason}")]
    OutOfDomain {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Errors raised by a simulation run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("invalid normal distribution (mean {mean}, std {std}): {source}")]
    Distribution {
        mean: f64,
        std: f64,
        #[source]
        source: rand_distr::NormalError,
    },

    /// A state variable became non-finite. `partial` holds indices `0..step`.
    #[error("model diverged at step {step}: {quantity} = {value}")]
    ModelDivergence {
        step: usize,
        quantity: &'static str,
        value: f64,
        last_finite: PeriodSnapshot,
        partial: Box<StateSeries>,
    },
}

impl SimulationError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, SimulationError::Configuration(_))
    }
}
