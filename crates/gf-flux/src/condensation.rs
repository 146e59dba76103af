//! Condensation of air moisture onto a cold surface.

use crate::context::FluxContext;
use crate::error::{FluxError, FluxResult};
use crate::law::FluxLaw;

/// One-way vapor flux `ṀV = max(0, k·A·(VP_air − VP_sat(T_surf)))`.
///
/// Port A is the air vapor store; port B is a boundary port whose
/// potential the orchestrator sets to the saturation pressure at the
/// surface temperature each tick. Condensate never re-evaporates through
/// this element, hence the one-sided clamp.
#[derive(Clone, Copy, Debug)]
pub struct Condensation {
    area_m2: f64,
    /// Mass transfer coefficient, kg/(m²·s·Pa).
    k_kg_per_m2spa: f64,
}

impl Condensation {
    pub fn new(area_m2: f64, k_kg_per_m2spa: f64) -> FluxResult<Self> {
        if !(area_m2 > 0.0) {
            return Err(FluxError::InvalidArg {
                what: "area_m2 must be positive",
            });
        }
        if !(k_kg_per_m2spa > 0.0) {
            return Err(FluxError::InvalidArg {
                what: "mass transfer coefficient must be positive",
            });
        }
        Ok(Self {
            area_m2,
            k_kg_per_m2spa,
        })
    }
}

impl FluxLaw for Condensation {
    fn name(&self) -> &'static str {
        "condensation"
    }

    fn flux(&self, vp_air_pa: f64, vp_sat_surface_pa: f64, _ctx: &FluxContext) -> f64 {
        (self.k_kg_per_m2spa * self.area_m2 * (vp_air_pa - vp_sat_surface_pa)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condenses_only_above_saturation() {
        let law = Condensation::new(1.4e4, 2.0e-9).unwrap();
        let ctx = FluxContext::default();
        assert!(law.flux(1500.0, 1000.0, &ctx) > 0.0);
        assert_eq!(law.flux(800.0, 1000.0, &ctx), 0.0);
    }

    #[test]
    fn rejects_bad_config() {
        assert!(Condensation::new(0.0, 2.0e-9).is_err());
        assert!(Condensation::new(1.0, 0.0).is_err());
    }
}
