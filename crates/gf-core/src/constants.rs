//! Physical constants of the lumped greenhouse model.
//!
//! Raw f64 values in SI units; the unit is part of the name.

/// Stefan-Boltzmann constant, W/(m²·K⁴).
pub const SIGMA_W_PER_M2K4: f64 = 5.670_374_419e-8;

/// Density of greenhouse air, kg/m³.
pub const RHO_AIR_KG_PER_M3: f64 = 1.2;

/// Specific heat of greenhouse air, J/(kg·K).
pub const CP_AIR_J_PER_KGK: f64 = 1005.0;

/// Latent heat of vaporization of water, J/kg.
pub const LATENT_HEAT_J_PER_KG: f64 = 2.45e6;

/// Specific gas constant of water vapor, J/(kg·K).
pub const R_VAPOUR_J_PER_KGK: f64 = 461.5;

/// Gravitational acceleration, m/s².
pub const G_M_PER_S2: f64 = 9.81;

/// Default validity range for temperature states, K.
pub const T_VALID_MIN_K: f64 = 150.0;
pub const T_VALID_MAX_K: f64 = 450.0;

/// Default validity range for vapor pressure states, Pa.
pub const VP_VALID_MIN_PA: f64 = 0.0;
pub const VP_VALID_MAX_PA: f64 = 2.0e4;

/// Default validity range for CO2 concentration states, mg/m³.
pub const CO2_VALID_MIN_MG_PER_M3: f64 = 0.0;
pub const CO2_VALID_MAX_MG_PER_M3: f64 = 5000.0;
