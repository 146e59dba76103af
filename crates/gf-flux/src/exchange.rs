//! Constant-conductance and ventilation-driven mass exchange.

use gf_core::constants::R_VAPOUR_J_PER_KGK;

use crate::context::FluxContext;
use crate::error::{FluxError, FluxResult};
use crate::law::FluxLaw;
use crate::ventilation::VentRate;

/// Linear exchange `flux = G·(potential_a − potential_b)`.
///
/// The workhorse for conductive paths (floor to deep soil) and simple
/// mass conductances; `G` carries whatever units close the domain
/// (W/K for heat, kg/(s·Pa) for vapor, m³/s for CO2).
#[derive(Clone, Copy, Debug)]
pub struct LinearExchange {
    conductance: f64,
}

impl LinearExchange {
    pub fn new(conductance: f64) -> FluxResult<Self> {
        if !(conductance > 0.0) {
            return Err(FluxError::InvalidArg {
                what: "conductance must be positive",
            });
        }
        Ok(Self { conductance })
    }
}

impl FluxLaw for LinearExchange {
    fn name(&self) -> &'static str {
        "linear_exchange"
    }

    fn flux(&self, potential_a: f64, potential_b: f64, _ctx: &FluxContext) -> f64 {
        self.conductance * (potential_a - potential_b)
    }
}

/// Which quantity a ventilation mass flow carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MassKind {
    /// Potentials are vapor pressures (Pa); flux in kg/s.
    Vapour,
    /// Potentials are concentrations (mg/m³); flux in mg/s.
    Co2,
}

/// Vapor or CO2 carried by the ventilation air exchange.
///
/// Uses the same [`VentRate`] as the sensible-heat law so that heat and
/// mass leave through the same air stream; the buoyancy ΔT comes from
/// the shared context because the mass potentials are not temperatures.
#[derive(Clone, Copy, Debug)]
pub struct VentilationMass {
    area_m2: f64,
    rate: VentRate,
    kind: MassKind,
}

impl VentilationMass {
    pub fn new(area_m2: f64, rate: VentRate, kind: MassKind) -> FluxResult<Self> {
        if !(area_m2 > 0.0) {
            return Err(FluxError::InvalidArg {
                what: "area_m2 must be positive",
            });
        }
        Ok(Self {
            area_m2,
            rate,
            kind,
        })
    }
}

impl FluxLaw for VentilationMass {
    fn name(&self) -> &'static str {
        match self.kind {
            MassKind::Vapour => "ventilation_vapour",
            MassKind::Co2 => "ventilation_co2",
        }
    }

    fn flux(&self, potential_a: f64, potential_b: f64, ctx: &FluxContext) -> f64 {
        let f_vent = self.rate.rate_m_per_s(ctx.vent_dt_k, ctx);
        let volume_rate = self.area_m2 * f_vent; // m³/s
        match self.kind {
            // Vapor density from ideal gas: ρ_v = VP/(R_v·T)
            MassKind::Vapour => {
                volume_rate * (potential_a - potential_b) / (R_VAPOUR_J_PER_KGK * ctx.t_mean_k)
            }
            MassKind::Co2 => volume_rate * (potential_a - potential_b),
        }
    }
}
