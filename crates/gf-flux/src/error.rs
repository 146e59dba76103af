//! Error types for flux-law construction.

use thiserror::Error;

/// Errors raised when a flux law is configured with invalid parameters.
///
/// Construction-time only: `flux()` itself is total and never fails.
#[derive(Error, Debug)]
pub enum FluxError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type FluxResult<T> = Result<T, FluxError>;
