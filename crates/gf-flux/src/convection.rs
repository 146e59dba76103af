//! Free and forced convective exchange.

use gf_core::logistic;

use crate::context::FluxContext;
use crate::error::{FluxError, FluxResult};
use crate::law::FluxLaw;

/// How the heat transfer coefficient responds to flow conditions.
#[derive(Clone, Copy, Debug)]
pub enum ConvectionRegime {
    /// Free convection along an interior surface: `h = c·|ΔT|^n`.
    Free { c: f64, n: f64 },

    /// Wind-exposed exterior surface with two wind regimes, blended
    /// smoothly around `u_threshold` with a logistic weight.
    ///
    /// `h_low = a_low + b_low·u` below the threshold,
    /// `h_high = c_high·u^n_high` above it. A hard branch at the
    /// threshold would put a derivative discontinuity right where the
    /// explicit integrator is most sensitive; the logistic blend keeps
    /// `h(u)` smooth.
    WindBlended {
        a_low: f64,
        b_low: f64,
        c_high: f64,
        n_high: f64,
        u_threshold: f64,
        slope: f64,
    },
}

/// How the (time-varying) screen closure scales the exchange surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScreenScaling {
    /// Exchange unaffected by the screen.
    #[default]
    None,
    /// Exchange proportional to closure (air against the deployed screen).
    Closure,
    /// Exchange proportional to the open fraction `1 − SC` (air past the
    /// retracted screen).
    OpenFraction,
}

/// Convective exchange `Q = A·h(ΔT, wind)·ΔT`.
#[derive(Clone, Debug)]
pub struct Convection {
    area_m2: f64,
    regime: ConvectionRegime,
    screen_scaling: ScreenScaling,
}

impl Convection {
    /// Free convection with a power-law coefficient.
    pub fn free(area_m2: f64, c: f64, n: f64) -> FluxResult<Self> {
        if !(area_m2 > 0.0) {
            return Err(FluxError::InvalidArg {
                what: "area_m2 must be positive",
            });
        }
        if !(c > 0.0) {
            return Err(FluxError::InvalidArg {
                what: "free convection coefficient must be positive",
            });
        }
        if !(0.0..=1.0).contains(&n) {
            return Err(FluxError::InvalidArg {
                what: "free convection exponent must lie in [0, 1]",
            });
        }
        Ok(Self {
            area_m2,
            regime: ConvectionRegime::Free { c, n },
            screen_scaling: ScreenScaling::None,
        })
    }

    /// Wind-exposed surface with smoothed two-regime coefficient.
    pub fn wind_blended(
        area_m2: f64,
        a_low: f64,
        b_low: f64,
        c_high: f64,
        n_high: f64,
        u_threshold: f64,
    ) -> FluxResult<Self> {
        if !(area_m2 > 0.0) {
            return Err(FluxError::InvalidArg {
                what: "area_m2 must be positive",
            });
        }
        if a_low < 0.0 || b_low < 0.0 || c_high <= 0.0 || n_high <= 0.0 {
            return Err(FluxError::InvalidArg {
                what: "wind coefficients must be non-negative (c_high, n_high positive)",
            });
        }
        if !(u_threshold > 0.0) {
            return Err(FluxError::InvalidArg {
                what: "u_threshold must be positive",
            });
        }
        Ok(Self {
            area_m2,
            regime: ConvectionRegime::WindBlended {
                a_low,
                b_low,
                c_high,
                n_high,
                u_threshold,
                // Blend over roughly ±0.5 m/s around the threshold
                slope: 4.0,
            },
            screen_scaling: ScreenScaling::None,
        })
    }

    /// Scale the exchange by screen closure or open fraction.
    pub fn with_screen_scaling(mut self, scaling: ScreenScaling) -> Self {
        self.screen_scaling = scaling;
        self
    }

    /// Heat transfer coefficient, W/(m²·K).
    fn h(&self, dt_k: f64, wind_m_per_s: f64) -> f64 {
        match self.regime {
            ConvectionRegime::Free { c, n } => c * dt_k.abs().powf(n),
            ConvectionRegime::WindBlended {
                a_low,
                b_low,
                c_high,
                n_high,
                u_threshold,
                slope,
            } => {
                let u = wind_m_per_s.max(0.0);
                let h_low = a_low + b_low * u;
                let h_high = c_high * u.powf(n_high);
                let s = logistic(u, u_threshold, slope);
                (1.0 - s) * h_low + s * h_high
            }
        }
    }
}

impl FluxLaw for Convection {
    fn name(&self) -> &'static str {
        "convection"
    }

    fn flux(&self, t_a_k: f64, t_b_k: f64, ctx: &FluxContext) -> f64 {
        let dt = t_a_k - t_b_k;
        let scale = match self.screen_scaling {
            ScreenScaling::None => 1.0,
            ScreenScaling::Closure => ctx.screen_closure,
            ScreenScaling::OpenFraction => 1.0 - ctx.screen_closure,
        };
        self.area_m2 * scale * self.h(dt, ctx.wind_m_per_s) * dt
    }
}
