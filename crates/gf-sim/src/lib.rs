//! gf-sim: the greenhouse simulation engine.
//!
//! Provides:
//! - Storage elements with bounded explicit integration
//! - Weather/setpoint boundary records
//! - Numeric-fault recovery policy
//! - The `Greenhouse` orchestrator and its five-phase tick schedule
//! - Crop dry-matter and supplementary-lighting submodels
//! - Serializable per-tick state snapshots

pub mod boundary;
pub mod config;
pub mod crop;
pub mod error;
pub mod fault;
pub mod greenhouse;
pub mod lighting;
pub mod snapshot;
pub mod storage;

// Re-exports for ergonomics
pub use boundary::{Setpoints, Weather};
pub use config::{
    Capacities, Co2Params, ExchangeParams, Geometry, GreenhouseConfig, HeatingParams,
    InitialConditions, VentParams,
};
pub use crop::{CropModel, CropParams, CropState};
pub use error::{SimError, SimResult};
pub use fault::FaultTracker;
pub use greenhouse::Greenhouse;
pub use lighting::{Lighting, LightingParams};
pub use snapshot::Snapshot;
pub use storage::Storage;
