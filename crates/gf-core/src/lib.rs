//! gf-core: stable foundation for greenflow.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - ids (stable compact IDs for network/model objects)
//! - error (shared error types)
//! - constants (physical constants of the lumped greenhouse model)

pub mod constants;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{GfError, GfResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
