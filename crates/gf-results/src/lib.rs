//! gf-results: run records for greenhouse simulations.
//!
//! A run record ties a decimated snapshot series to the exact model
//! definition that produced it: the run ID is a content hash of the
//! model plus the engine version, so re-running an unchanged model maps
//! to the same ID.

pub mod hash;
pub mod store;
pub mod types;

pub use hash::compute_run_id;
pub use store::RunStore;
pub use types::{RunMeta, RunRecord};

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    NotFound { run_id: String },
}
