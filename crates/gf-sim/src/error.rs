//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while building or running a greenhouse simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Physical limit exceeded: {what} = {value:.2}")]
    PhysicalLimit { what: &'static str, value: f64 },

    #[error("{count} consecutive numeric faults on {element}; aborting run")]
    FaultStorm { element: String, count: u32 },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<gf_core::GfError> for SimError {
    fn from(e: gf_core::GfError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<gf_flux::FluxError> for SimError {
    fn from(e: gf_flux::FluxError) -> Self {
        SimError::Config {
            message: e.to_string(),
        }
    }
}

impl From<gf_controls::ControlError> for SimError {
    fn from(e: gf_controls::ControlError) -> Self {
        SimError::Config {
            message: e.to_string(),
        }
    }
}
