//! gf-flux: stateless flux laws for the greenflow exchange network.
//!
//! A flux law is a pure function of two port potentials and a shared
//! per-tick context of auxiliary scalars (wind, screen closure, vent
//! opening, ...). Laws hold configuration, never state; the one value a
//! flow element remembers between ticks (its last flux) lives with the
//! orchestrator, for reporting only.
//!
//! Representative laws:
//! - [`Radiation`] — T⁴ exchange with emissivities and view factors
//! - [`Convection`] — free and wind-blended regimes, logistic-smoothed
//! - [`Ventilation`] — vent/wind/buoyancy air exchange with leakage floor
//! - [`LinearExchange`] — constant-conductance exchange (conduction)
//! - [`VentilationMass`] — vapor/CO2 carried by the ventilation rate
//! - [`Condensation`] — one-way vapor flux onto a cold surface
//!
//! The dozens of further correlation variants in the full physical model
//! all follow the same shape: configuration validated at construction, a
//! total `flux(a, b, ctx)` function, no hidden state.

pub mod condensation;
pub mod context;
pub mod convection;
pub mod error;
pub mod exchange;
pub mod law;
pub mod psychro;
pub mod radiation;
pub mod ventilation;

// Re-exports for ergonomics
pub use condensation::Condensation;
pub use context::FluxContext;
pub use convection::{Convection, ConvectionRegime, ScreenScaling};
pub use error::{FluxError, FluxResult};
pub use exchange::{LinearExchange, MassKind, VentilationMass};
pub use law::FluxLaw;
pub use radiation::{Radiation, ScreenFactor};
pub use ventilation::{VentRate, Ventilation};
