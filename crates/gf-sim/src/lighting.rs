//! Supplementary lighting rule.
//!
//! Lamps switch on inside the photoperiod whenever global radiation
//! drops below a threshold; lamp power becomes a heat source and feeds
//! the electrical energy accumulator.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Lighting configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingParams {
    /// Installed electrical power, W/m².
    pub power_w_per_m2: f64,
    /// Lamps switch on below this global radiation, W/m².
    pub on_below_w_per_m2: f64,
    /// Photoperiod window, hours of day [start, end).
    pub on_hour: f64,
    pub off_hour: f64,
    /// Fraction of lamp power reaching the canopy as PAR-like radiation;
    /// the rest heats the air.
    pub par_fraction: f64,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            power_w_per_m2: 60.0,
            on_below_w_per_m2: 40.0,
            on_hour: 2.0,
            off_hour: 18.0,
            par_fraction: 0.35,
        }
    }
}

/// Supplementary lighting rule (stateless).
#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    params: LightingParams,
}

impl Lighting {
    pub fn new(params: LightingParams) -> SimResult<Self> {
        if !(params.power_w_per_m2 > 0.0) {
            return Err(SimError::InvalidArg {
                what: "lamp power must be positive",
            });
        }
        if params.on_below_w_per_m2 < 0.0 {
            return Err(SimError::InvalidArg {
                what: "radiation threshold must be non-negative",
            });
        }
        if !(0.0..24.0).contains(&params.on_hour)
            || !(0.0..=24.0).contains(&params.off_hour)
            || params.on_hour >= params.off_hour
        {
            return Err(SimError::InvalidArg {
                what: "photoperiod must satisfy 0 <= on_hour < off_hour <= 24",
            });
        }
        if !(0.0..=1.0).contains(&params.par_fraction) {
            return Err(SimError::InvalidArg {
                what: "par_fraction must lie in [0, 1]",
            });
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &LightingParams {
        &self.params
    }

    /// Electrical power demand at this moment, W/m².
    pub fn power_w_per_m2(&self, hour_of_day: f64, i_glob_w_per_m2: f64) -> f64 {
        let p = &self.params;
        let in_window = hour_of_day >= p.on_hour && hour_of_day < p.off_hour;
        if in_window && i_glob_w_per_m2 < p.on_below_w_per_m2 {
            p.power_w_per_m2
        } else {
            0.0
        }
    }
}
