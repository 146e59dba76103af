//! Ventilation air exchange with the outside.

use gf_core::constants::{CP_AIR_J_PER_KGK, G_M_PER_S2, RHO_AIR_KG_PER_M3};

use crate::context::FluxContext;
use crate::error::{FluxError, FluxResult};
use crate::law::FluxLaw;

/// Air exchange rate model shared by the heat and mass ventilation laws.
///
/// `f_vent = Cd·U·½·sqrt(g·h·|ΔT|/T_mean + Cw·u²) + f_leak` (m³/(m²·s)),
/// with `U` the vent opening fraction, `u` the wind speed and `ΔT` the
/// inside-outside temperature difference. The leakage term is a floor
/// independent of vent opening: a closed greenhouse still exchanges air
/// through cracks.
#[derive(Clone, Copy, Debug)]
pub struct VentRate {
    /// Discharge coefficient of the vent openings.
    pub cd: f64,
    /// Vertical vent dimension driving the stack effect, m.
    pub h_vent_m: f64,
    /// Wind pressure coefficient.
    pub c_wind: f64,
    /// Leakage exchange rate floor, m³/(m²·s).
    pub leakage_m_per_s: f64,
}

impl VentRate {
    pub fn new(cd: f64, h_vent_m: f64, c_wind: f64, leakage_m_per_s: f64) -> FluxResult<Self> {
        if !(cd > 0.0 && cd <= 1.0) {
            return Err(FluxError::InvalidArg {
                what: "cd must lie in (0, 1]",
            });
        }
        if !(h_vent_m > 0.0) {
            return Err(FluxError::InvalidArg {
                what: "h_vent_m must be positive",
            });
        }
        if c_wind < 0.0 {
            return Err(FluxError::InvalidArg {
                what: "c_wind must be non-negative",
            });
        }
        if leakage_m_per_s < 0.0 {
            return Err(FluxError::InvalidArg {
                what: "leakage_m_per_s must be non-negative",
            });
        }
        Ok(Self {
            cd,
            h_vent_m,
            c_wind,
            leakage_m_per_s,
        })
    }

    /// Exchange rate in m³ of air per m² of floor per second.
    pub fn rate_m_per_s(&self, dt_k: f64, ctx: &FluxContext) -> f64 {
        let opening = ctx.vent_opening.clamp(0.0, 1.0);
        let u = ctx.wind_m_per_s.max(0.0);
        let t_mean = ctx.t_mean_k.max(1.0);
        let stack = G_M_PER_S2 * self.h_vent_m * dt_k.abs() / t_mean;
        let driven = 0.5 * self.cd * opening * (stack + self.c_wind * u * u).sqrt();
        driven + self.leakage_m_per_s
    }
}

/// Sensible heat carried by ventilation: `Q = A·ρ·c_p·f_vent·ΔT`.
#[derive(Clone, Copy, Debug)]
pub struct Ventilation {
    area_m2: f64,
    rate: VentRate,
}

impl Ventilation {
    pub fn new(area_m2: f64, rate: VentRate) -> FluxResult<Self> {
        if !(area_m2 > 0.0) {
            return Err(FluxError::InvalidArg {
                what: "area_m2 must be positive",
            });
        }
        Ok(Self { area_m2, rate })
    }

    pub fn rate(&self) -> &VentRate {
        &self.rate
    }
}

impl FluxLaw for Ventilation {
    fn name(&self) -> &'static str {
        "ventilation"
    }

    fn flux(&self, t_a_k: f64, t_b_k: f64, ctx: &FluxContext) -> f64 {
        let dt = t_a_k - t_b_k;
        let f_vent = self.rate.rate_m_per_s(dt, ctx);
        self.area_m2 * RHO_AIR_KG_PER_M3 * CP_AIR_J_PER_KGK * f_vent * dt
    }
}
