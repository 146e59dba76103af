//! Model file validation logic.
//!
//! Field-level checks with named fields in the error, so a bad file is
//! reported at the place the user wrote it. The engine re-validates at
//! construction; this layer exists to fail earlier and friendlier.

use crate::schema::{LATEST_VERSION, ModelDef};
use gf_sim::GreenhouseConfig;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Unsupported version: {version} (latest is {latest})")]
    UnsupportedVersion { version: u32, latest: u32 },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Model name must not be empty")]
    EmptyName,
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field,
            value,
            reason: "must be positive and finite",
        })
    }
}

fn fraction(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field,
            value,
            reason: "must lie in [0, 1]",
        })
    }
}

fn ordered_range(
    field: &'static str,
    lo: f64,
    hi: f64,
) -> Result<(), ValidationError> {
    if lo < hi {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field,
            value: lo,
            reason: "range minimum must be below maximum",
        })
    }
}

pub fn validate_model(model: &ModelDef) -> Result<(), ValidationError> {
    if model.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: model.version,
            latest: LATEST_VERSION,
        });
    }
    if model.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    validate_config(&model.greenhouse)
}

fn validate_config(cfg: &GreenhouseConfig) -> Result<(), ValidationError> {
    let g = &cfg.geometry;
    positive("geometry.floor_area_m2", g.floor_area_m2)?;
    positive("geometry.cover_area_m2", g.cover_area_m2)?;
    positive("geometry.h_air_m", g.h_air_m)?;
    positive("geometry.h_vent_m", g.h_vent_m)?;
    positive("geometry.pipe_area_per_floor", g.pipe_area_per_floor)?;

    let c = &cfg.capacities;
    positive("capacities.cover_j_per_m2k", c.cover_j_per_m2k)?;
    positive("capacities.floor_j_per_m2k", c.floor_j_per_m2k)?;
    positive("capacities.screen_j_per_m2k", c.screen_j_per_m2k)?;
    positive("capacities.canopy_leaf_j_per_m2k", c.canopy_leaf_j_per_m2k)?;
    positive("capacities.pipe_j_per_m2k", c.pipe_j_per_m2k)?;

    let x = &cfg.exchange;
    fraction("exchange.eps_cover", x.eps_cover)?;
    fraction("exchange.eps_screen", x.eps_screen)?;
    fraction("exchange.eps_canopy", x.eps_canopy)?;
    fraction("exchange.eps_floor", x.eps_floor)?;
    fraction("exchange.canopy_floor_intercept", x.canopy_floor_intercept)?;
    fraction("exchange.tau_cover", x.tau_cover)?;
    fraction("exchange.tau_screen", x.tau_screen)?;
    fraction("exchange.vent_cd", x.vent_cd)?;

    for (field, v) in [
        ("heating.pid.kp", cfg.heating.pid.kp),
        ("vent.pid.kp", cfg.vent.pid.kp),
        ("co2.pid.kp", cfg.co2.pid.kp),
    ] {
        positive(field, v)?;
    }
    ordered_range(
        "heating.pid.pv_min",
        cfg.heating.pid.pv_min,
        cfg.heating.pid.pv_max,
    )?;
    ordered_range(
        "heating.pid.cs_min",
        cfg.heating.pid.cs_min,
        cfg.heating.pid.cs_max,
    )?;
    ordered_range("vent.pid.pv_min", cfg.vent.pid.pv_min, cfg.vent.pid.pv_max)?;
    ordered_range("co2.pid.pv_min", cfg.co2.pid.pv_min, cfg.co2.pid.pv_max)?;
    positive("heating.t_pipe_max_k", cfg.heating.t_pipe_max_k)?;

    let s = &cfg.screen;
    positive("screen.r_glob_min_w_per_m2", s.r_glob_min_w_per_m2)?;
    positive("screen.closing_dwell_s", s.closing_dwell_s)?;
    positive("screen.opening_cold_dwell_s", s.opening_cold_dwell_s)?;
    positive("screen.opening_warm_dwell_s", s.opening_warm_dwell_s)?;
    positive("screen.crack2_dwell_s", s.crack2_dwell_s)?;
    fraction("screen.rh_crack", s.rh_crack)?;
    fraction("screen.rh_crack2", s.rh_crack2)?;
    fraction("screen.rh_release", s.rh_release)?;

    positive("crop.lai", cfg.crop.lai)?;
    positive("crop.lue_mg_per_j", cfg.crop.lue_mg_per_j)?;
    fraction("crop.par_fraction", cfg.crop.par_fraction)?;

    if let Some(l) = &cfg.lighting {
        positive("lighting.power_w_per_m2", l.power_w_per_m2)?;
        fraction("lighting.par_fraction", l.par_fraction)?;
    }
    if let Some(p) = cfg.control_period_s {
        positive("control_period_s", p)?;
    }
    if cfg.fault_limit == 0 {
        return Err(ValidationError::InvalidValue {
            field: "fault_limit",
            value: 0.0,
            reason: "must be at least 1",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_validates() {
        validate_model(&ModelDef::new("venlo")).unwrap();
    }

    #[test]
    fn rejects_future_version() {
        let mut model = ModelDef::new("venlo");
        model.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_model(&model),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn rejects_empty_name() {
        let mut model = ModelDef::new("  ");
        model.name = "  ".into();
        assert!(matches!(
            validate_model(&model),
            Err(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn reports_the_offending_field() {
        let mut model = ModelDef::new("venlo");
        model.greenhouse.geometry.floor_area_m2 = -1.0;
        let err = validate_model(&model).unwrap_err();
        assert!(err.to_string().contains("geometry.floor_area_m2"));
    }

    #[test]
    fn rejects_bad_emissivity() {
        let mut model = ModelDef::new("venlo");
        model.greenhouse.exchange.eps_cover = 1.4;
        assert!(validate_model(&model).is_err());
    }
}
