//! Error types for controller configuration.

use thiserror::Error;

/// Errors raised when a controller is configured with invalid parameters.
///
/// Always fatal at construction time; controllers never default their
/// way past a bad configuration.
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ControlResult<T> = Result<T, ControlError>;
