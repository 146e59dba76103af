//! Greenhouse model configuration.
//!
//! Plain structs with physically plausible defaults for a Venlo-type
//! glasshouse; gf-project maps its schema onto these. Everything here is
//! validated when the `Greenhouse` is built, never silently defaulted
//! past a bad value.

use gf_controls::{IsaPidParams, ScreenParams};
use serde::{Deserialize, Serialize};

use crate::crop::CropParams;
use crate::lighting::LightingParams;

/// Lumped geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub floor_area_m2: f64,
    pub cover_area_m2: f64,
    /// Air compartment height below the screen, m.
    pub h_air_m: f64,
    /// Additional height above the screen, m.
    pub h_top_m: f64,
    /// Vertical vent dimension, m.
    pub h_vent_m: f64,
    /// Heating pipe exterior area per m² of floor.
    pub pipe_area_per_floor: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            floor_area_m2: 1.4e4,
            cover_area_m2: 1.8e4,
            h_air_m: 3.8,
            h_top_m: 0.4,
            h_vent_m: 0.68,
            pipe_area_per_floor: 0.3,
        }
    }
}

/// Areal heat capacities of the storage elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capacities {
    /// Cover, J/(m²·K) of cover area.
    pub cover_j_per_m2k: f64,
    /// Floor top layer, J/(m²·K) of floor area.
    pub floor_j_per_m2k: f64,
    /// Screen fabric, J/(m²·K) of floor area.
    pub screen_j_per_m2k: f64,
    /// Canopy, J/(m²·K) of floor area per unit LAI.
    pub canopy_leaf_j_per_m2k: f64,
    /// Heating pipes (steel plus water), J/(m²·K) of floor area.
    pub pipe_j_per_m2k: f64,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            cover_j_per_m2k: 8.4e3,
            floor_j_per_m2k: 7.0e4,
            screen_j_per_m2k: 2.0e3,
            canopy_leaf_j_per_m2k: 1.2e3,
            pipe_j_per_m2k: 9.0e3,
        }
    }
}

/// Coefficients of the exchange laws and external boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeParams {
    // Long-wave properties
    pub eps_cover: f64,
    pub eps_screen: f64,
    pub eps_canopy: f64,
    pub eps_floor: f64,
    /// View-blocking of the canopy between floor and cover.
    pub canopy_floor_intercept: f64,

    // Interior free convection, h = c·|ΔT|^n
    pub c_air_cover: f64,
    pub n_air_cover: f64,
    pub c_air_floor: f64,
    pub n_air_floor: f64,
    pub c_air_screen: f64,
    pub n_air_screen: f64,
    /// Canopy exchange uses a constant coefficient (n = 0) per unit of
    /// leaf area.
    pub c_air_canopy: f64,
    pub n_air_canopy: f64,
    pub c_pipe_air: f64,
    pub n_pipe_air: f64,

    // Exterior wind-blended convection
    pub cover_out_a_low: f64,
    pub cover_out_b_low: f64,
    pub cover_out_c_high: f64,
    pub cover_out_n_high: f64,
    pub cover_out_u_threshold_m_per_s: f64,

    // Ventilation
    pub vent_cd: f64,
    pub vent_c_wind: f64,
    pub leakage_m_per_s: f64,

    // Conduction and mass transfer
    pub u_floor_soil_w_per_m2k: f64,
    pub k_condensation_kg_per_m2spa: f64,
    pub g_transpiration_kg_per_m2spa_per_lai: f64,

    // Short-wave path
    pub tau_cover: f64,
    pub tau_screen: f64,
    pub abs_cover: f64,
    pub abs_canopy: f64,
    pub abs_floor: f64,
    pub abs_air: f64,

    // External boundaries
    pub soil_t_k: f64,
    pub outdoor_co2_mg_per_m3: f64,
}

impl Default for ExchangeParams {
    fn default() -> Self {
        Self {
            eps_cover: 0.84,
            eps_screen: 0.67,
            eps_canopy: 1.0,
            eps_floor: 0.89,
            canopy_floor_intercept: 0.58,
            c_air_cover: 1.86,
            n_air_cover: 0.33,
            c_air_floor: 1.7,
            n_air_floor: 0.33,
            c_air_screen: 1.7,
            n_air_screen: 0.33,
            c_air_canopy: 5.0,
            n_air_canopy: 0.0,
            c_pipe_air: 1.99,
            n_pipe_air: 0.32,
            cover_out_a_low: 2.8,
            cover_out_b_low: 1.2,
            cover_out_c_high: 2.5,
            cover_out_n_high: 0.8,
            cover_out_u_threshold_m_per_s: 4.0,
            vent_cd: 0.65,
            vent_c_wind: 0.09,
            leakage_m_per_s: 1.0e-4,
            u_floor_soil_w_per_m2k: 1.7,
            k_condensation_kg_per_m2spa: 1.0e-8,
            g_transpiration_kg_per_m2spa_per_lai: 1.6e-8,
            tau_cover: 0.85,
            tau_screen: 0.35,
            abs_cover: 0.10,
            abs_canopy: 0.45,
            abs_floor: 0.25,
            abs_air: 0.05,
            soil_t_k: 285.15,
            outdoor_co2_mg_per_m3: 730.0,
        }
    }
}

/// Heating loop: pipe PID plus the pipe temperature safety ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatingParams {
    pub pid: IsaPidParams,
    /// Fatal ceiling on pipe temperature, K.
    pub t_pipe_max_k: f64,
}

impl Default for HeatingParams {
    fn default() -> Self {
        Self {
            pid: IsaPidParams {
                kp: 0.7,
                ti: 600.0,
                td: 0.0,
                pv_min: 283.15,
                pv_max: 313.15,
                cs_min: 0.0,
                cs_max: 2.1e6,
                pv_start: 288.15,
                cs_start: 0.0,
                ..IsaPidParams::default()
            },
            t_pipe_max_k: 368.15,
        }
    }
}

/// Ventilation loop: direct-acting PID on air temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VentParams {
    pub pid: IsaPidParams,
    /// Vent setpoint sits this far above the heating setpoint, K.
    pub band_k: f64,
}

impl Default for VentParams {
    fn default() -> Self {
        Self {
            pid: IsaPidParams {
                kp: 0.6,
                ti: 900.0,
                td: 0.0,
                pv_min: 283.15,
                pv_max: 313.15,
                cs_min: 0.0,
                cs_max: 1.0,
                pv_start: 288.15,
                cs_start: 0.0,
                direct_acting: true,
                ..IsaPidParams::default()
            },
            band_k: 2.0,
        }
    }
}

/// CO2 enrichment loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Co2Params {
    pub pid: IsaPidParams,
}

impl Default for Co2Params {
    fn default() -> Self {
        Self {
            pid: IsaPidParams {
                kp: 0.5,
                ti: 1200.0,
                td: 0.0,
                pv_min: 0.0,
                pv_max: 2000.0,
                cs_min: 0.0,
                cs_max: 5.0e4,
                pv_start: 700.0,
                cs_start: 0.0,
                ..IsaPidParams::default()
            },
        }
    }
}

/// Initial state of the storage elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    pub t_air_k: f64,
    pub t_cover_k: f64,
    pub t_canopy_k: f64,
    pub t_floor_k: f64,
    pub t_screen_k: f64,
    pub t_pipe_k: f64,
    /// Initial relative humidity of the air (0..~1).
    pub rh_air: f64,
    pub co2_air_mg_per_m3: f64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            t_air_k: 288.15,
            t_cover_k: 283.15,
            t_canopy_k: 288.15,
            t_floor_k: 288.15,
            t_screen_k: 285.15,
            t_pipe_k: 313.15,
            rh_air: 0.75,
            co2_air_mg_per_m3: 700.0,
        }
    }
}

/// Complete greenhouse model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreenhouseConfig {
    pub geometry: Geometry,
    pub capacities: Capacities,
    pub exchange: ExchangeParams,
    pub heating: HeatingParams,
    pub vent: VentParams,
    pub co2: Co2Params,
    pub screen: ScreenParams,
    /// Whether the screen may be deployed at all this season.
    pub screen_usable: bool,
    pub lighting: Option<LightingParams>,
    pub crop: CropParams,
    pub init: InitialConditions,
    /// Controller sample period, s. `None` runs controllers every tick.
    pub control_period_s: Option<f64>,
    /// Consecutive numeric faults on one element before the run aborts.
    pub fault_limit: u32,
}

impl Default for GreenhouseConfig {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            capacities: Capacities::default(),
            exchange: ExchangeParams::default(),
            heating: HeatingParams::default(),
            vent: VentParams::default(),
            co2: Co2Params::default(),
            screen: ScreenParams::default(),
            screen_usable: true,
            lighting: Some(LightingParams::default()),
            crop: CropParams::default(),
            init: InitialConditions::default(),
            control_period_s: None,
            fault_limit: 10,
        }
    }
}
