//! Psychrometric helpers.

/// Saturation vapor pressure over water, Pa (Magnus form).
///
/// Valid for the greenhouse operating range (roughly -20..50 °C).
pub fn saturation_pressure_pa(t_k: f64) -> f64 {
    let tc = t_k - 273.15;
    610.94 * (17.625 * tc / (tc + 243.04)).exp()
}

/// Relative humidity (0..~1) from vapor pressure and temperature.
///
/// Can exceed 1 transiently when the air state is supersaturated; the
/// caller decides whether to clamp.
pub fn relative_humidity(vp_pa: f64, t_k: f64) -> f64 {
    let sat = saturation_pressure_pa(t_k);
    if sat > 0.0 { (vp_pa / sat).max(0.0) } else { 0.0 }
}

/// Vapor pressure from relative humidity and temperature, Pa.
pub fn vp_from_rh(rh: f64, t_k: f64) -> f64 {
    rh.max(0.0) * saturation_pressure_pa(t_k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturation_at_reference_points() {
        // ~611 Pa at 0 °C, ~2339 Pa at 20 °C, ~4246 Pa at 30 °C
        assert!((saturation_pressure_pa(273.15) - 611.0).abs() < 5.0);
        assert!((saturation_pressure_pa(293.15) - 2339.0).abs() < 25.0);
        assert!((saturation_pressure_pa(303.15) - 4246.0).abs() < 50.0);
    }

    #[test]
    fn rh_round_trip() {
        let t = 295.15;
        let vp = vp_from_rh(0.75, t);
        assert!((relative_humidity(vp, t) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn saturation_monotonic_in_temperature() {
        let mut prev = saturation_pressure_pa(263.15);
        for i in 1..=60 {
            let t = 263.15 + i as f64;
            let sat = saturation_pressure_pa(t);
            assert!(sat > prev);
            prev = sat;
        }
    }
}
