//! Per-tick boundary condition records.

use gf_core::units::{Irradiance, Ratio, Temperature, Velocity};
use uom::si::heat_flux_density::watt_per_square_meter;
use uom::si::ratio::ratio;
use uom::si::thermodynamic_temperature::kelvin;
use uom::si::velocity::meter_per_second;

/// Weather supplied by the caller each tick.
///
/// uom-typed at the API surface; the engine converts to raw SI floats at
/// the boundary-injection phase.
#[derive(Clone, Copy, Debug)]
pub struct Weather {
    pub t_out: Temperature,
    pub rh_out: Ratio,
    pub i_glob: Irradiance,
    pub wind: Velocity,
    pub t_sky: Temperature,
}

impl Weather {
    pub fn t_out_k(&self) -> f64 {
        self.t_out.get::<kelvin>()
    }

    pub fn rh_out_frac(&self) -> f64 {
        self.rh_out.get::<ratio>()
    }

    pub fn i_glob_w_per_m2(&self) -> f64 {
        self.i_glob.get::<watt_per_square_meter>()
    }

    pub fn wind_m_per_s(&self) -> f64 {
        self.wind.get::<meter_per_second>()
    }

    pub fn t_sky_k(&self) -> f64 {
        self.t_sky.get::<kelvin>()
    }
}

/// Climate setpoints supplied by the caller each tick.
#[derive(Clone, Copy, Debug)]
pub struct Setpoints {
    pub t_air: Temperature,
    /// CO2 target, mg/m³.
    pub co2_mg_per_m3: f64,
}

impl Setpoints {
    pub fn t_air_k(&self) -> f64 {
        self.t_air.get::<kelvin>()
    }
}
