//! Crop dry-matter accumulation.
//!
//! Radiation-use-efficiency model: assimilation follows absorbed PAR,
//! damped by CO2 availability (rectangular hyperbola) and a flat-top
//! temperature response. Deliberately coarse next to a full yield model;
//! it closes the CO2 balance and produces the dry-matter output.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Crop model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropParams {
    /// Leaf area index, m²/m².
    pub lai: f64,
    /// Light-use efficiency, mg CO2 fixed per J of absorbed PAR.
    pub lue_mg_per_j: f64,
    /// PAR fraction of global radiation.
    pub par_fraction: f64,
    /// CO2 half-saturation constant, mg/m³.
    pub co2_half_mg_per_m3: f64,
    /// Temperature window for full assimilation, K.
    pub t_low_k: f64,
    pub t_high_k: f64,
    /// Dry matter produced per mg of CO2 fixed, kg.
    pub dm_per_mg_co2_kg: f64,
}

impl Default for CropParams {
    fn default() -> Self {
        Self {
            lai: 2.5,
            lue_mg_per_j: 0.06,
            par_fraction: 0.47,
            co2_half_mg_per_m3: 400.0,
            t_low_k: 283.15,
            t_high_k: 305.15,
            dm_per_mg_co2_kg: 0.68e-6,
        }
    }
}

/// Crop state integrated alongside the physical states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropState {
    /// Accumulated dry matter, kg/m².
    pub dry_matter_kg_per_m2: f64,
}

impl CropState {
    pub fn empty() -> Self {
        Self {
            dry_matter_kg_per_m2: 0.0,
        }
    }
}

/// Crop growth submodel.
#[derive(Debug, Clone, Copy)]
pub struct CropModel {
    params: CropParams,
}

impl CropModel {
    pub fn new(params: CropParams) -> SimResult<Self> {
        if !(params.lai > 0.0) {
            return Err(SimError::InvalidArg {
                what: "lai must be positive",
            });
        }
        if !(params.lue_mg_per_j > 0.0) || !(0.0..=1.0).contains(&params.par_fraction) {
            return Err(SimError::InvalidArg {
                what: "lue must be positive and par_fraction lie in [0, 1]",
            });
        }
        if !(params.co2_half_mg_per_m3 > 0.0) {
            return Err(SimError::InvalidArg {
                what: "co2 half-saturation must be positive",
            });
        }
        if !(params.t_low_k < params.t_high_k) {
            return Err(SimError::InvalidArg {
                what: "t_low must be below t_high",
            });
        }
        if !(params.dm_per_mg_co2_kg > 0.0) {
            return Err(SimError::InvalidArg {
                what: "dry-matter conversion must be positive",
            });
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &CropParams {
        &self.params
    }

    /// CO2 assimilation rate, mg/(m²·s).
    pub fn assimilation_mg_per_m2s(&self, r_can_w_per_m2: f64, co2_mg_per_m3: f64, t_can_k: f64) -> f64 {
        let p = &self.params;
        let par = (r_can_w_per_m2 * p.par_fraction).max(0.0);
        let absorbed = par * (1.0 - (-0.7 * p.lai).exp());
        let co2 = co2_mg_per_m3.max(0.0);
        let co2_factor = co2 / (co2 + p.co2_half_mg_per_m3);
        // Flat inside the window, linear roll-off over 5 K outside it
        let t_factor = if t_can_k < p.t_low_k {
            (1.0 - (p.t_low_k - t_can_k) / 5.0).max(0.0)
        } else if t_can_k > p.t_high_k {
            (1.0 - (t_can_k - p.t_high_k) / 5.0).max(0.0)
        } else {
            1.0
        };
        p.lue_mg_per_j * absorbed * co2_factor * t_factor
    }

    /// Advance the crop by one tick; returns the new state and the CO2
    /// uptake (mg/s, over `floor_area_m2`) the air balance must see.
    pub fn step(
        &self,
        state: &CropState,
        r_can_w_per_m2: f64,
        co2_mg_per_m3: f64,
        t_can_k: f64,
        floor_area_m2: f64,
        dt: f64,
    ) -> (CropState, f64) {
        let assim = self.assimilation_mg_per_m2s(r_can_w_per_m2, co2_mg_per_m3, t_can_k);
        let new_state = CropState {
            dry_matter_kg_per_m2: state.dry_matter_kg_per_m2
                + assim * self.params.dm_per_mg_co2_kg * dt,
        };
        (new_state, assim * floor_area_m2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> CropModel {
        CropModel::new(CropParams::default()).unwrap()
    }

    #[test]
    fn no_light_no_growth() {
        let (state, uptake) = model().step(&CropState::empty(), 0.0, 800.0, 295.15, 1.4e4, 60.0);
        assert_eq!(state.dry_matter_kg_per_m2, 0.0);
        assert_eq!(uptake, 0.0);
    }

    #[test]
    fn co2_enrichment_boosts_assimilation() {
        let lean = model().assimilation_mg_per_m2s(300.0, 400.0, 295.15);
        let rich = model().assimilation_mg_per_m2s(300.0, 1200.0, 295.15);
        assert!(rich > lean);
    }

    #[test]
    fn growth_accumulates_monotonically() {
        let m = model();
        let mut state = CropState::empty();
        let mut prev = 0.0;
        for _ in 0..100 {
            let (s, uptake) = m.step(&state, 250.0, 900.0, 296.15, 1.4e4, 60.0);
            state = s;
            assert!(uptake > 0.0);
            assert!(state.dry_matter_kg_per_m2 >= prev);
            prev = state.dry_matter_kg_per_m2;
        }
    }

    #[test]
    fn temperature_rolloff_cuts_assimilation() {
        let m = model();
        let in_window = m.assimilation_mg_per_m2s(300.0, 800.0, 295.15);
        let frozen = m.assimilation_mg_per_m2s(300.0, 800.0, 272.15);
        assert!(in_window > 0.0);
        assert_eq!(frozen, 0.0);
    }

    #[test]
    fn rejects_bad_params() {
        let mut p = CropParams::default();
        p.lai = 0.0;
        assert!(CropModel::new(p).is_err());
        let mut p = CropParams::default();
        p.t_low_k = 310.0;
        assert!(CropModel::new(p).is_err());
    }
}
