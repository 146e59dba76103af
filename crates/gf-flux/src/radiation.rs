//! Long-wave radiative exchange between two surfaces.

use gf_core::constants::SIGMA_W_PER_M2K4;

use crate::context::FluxContext;
use crate::error::{FluxError, FluxResult};
use crate::law::FluxLaw;

/// How the (time-varying) screen closure affects an exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScreenFactor {
    /// Exchange unaffected by the screen.
    #[default]
    None,
    /// The deployed screen sits between the two surfaces: the
    /// transmitted fraction is `1 − SC`.
    Transmitted,
    /// One of the two surfaces IS the screen: it only exchanges over
    /// the deployed fraction `SC`.
    Exposed,
}

/// Radiative exchange `Q = A·ε_a·ε_b·F_a·F_b·Π(1−F_k)·σ·(T_a⁴ − T_b⁴)`.
///
/// The interception factors `F_k` model partially transparent layers
/// between the two surfaces (a canopy between floor and screen, for
/// example). Emissivities and view factors are per-instance
/// configuration; only the Stefan-Boltzmann constant is global.
#[derive(Clone, Debug)]
pub struct Radiation {
    area_m2: f64,
    eps_a: f64,
    eps_b: f64,
    f_a: f64,
    f_b: f64,
    /// Fixed interception factors of intervening layers.
    f_intercept: Vec<f64>,
    screen_factor: ScreenFactor,
}

impl Radiation {
    pub fn new(
        area_m2: f64,
        eps_a: f64,
        eps_b: f64,
        f_a: f64,
        f_b: f64,
        f_intercept: &[f64],
    ) -> FluxResult<Self> {
        if !(area_m2 > 0.0) {
            return Err(FluxError::InvalidArg {
                what: "area_m2 must be positive",
            });
        }
        for (v, what) in [
            (eps_a, "eps_a must lie in [0, 1]"),
            (eps_b, "eps_b must lie in [0, 1]"),
            (f_a, "f_a must lie in [0, 1]"),
            (f_b, "f_b must lie in [0, 1]"),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(FluxError::InvalidArg { what });
            }
        }
        for f in f_intercept {
            if !(0.0..=1.0).contains(f) {
                return Err(FluxError::InvalidArg {
                    what: "interception factors must lie in [0, 1]",
                });
            }
        }
        Ok(Self {
            area_m2,
            eps_a,
            eps_b,
            f_a,
            f_b,
            f_intercept: f_intercept.to_vec(),
            screen_factor: ScreenFactor::None,
        })
    }

    /// Let the deployed screen intercept this exchange.
    pub fn with_screen_interception(mut self) -> Self {
        self.screen_factor = ScreenFactor::Transmitted;
        self
    }

    /// Mark one of the surfaces as the screen itself.
    pub fn with_screen_exposure(mut self) -> Self {
        self.screen_factor = ScreenFactor::Exposed;
        self
    }

    /// Static part of the exchange coefficient, W/K⁴.
    fn coeff_w_per_k4(&self) -> f64 {
        let intercept: f64 = self.f_intercept.iter().map(|f| 1.0 - f).product();
        self.area_m2 * self.eps_a * self.eps_b * self.f_a * self.f_b * intercept * SIGMA_W_PER_M2K4
    }
}

impl FluxLaw for Radiation {
    fn name(&self) -> &'static str {
        "radiation"
    }

    fn flux(&self, t_a_k: f64, t_b_k: f64, ctx: &FluxContext) -> f64 {
        let coeff = self.coeff_w_per_k4()
            * match self.screen_factor {
                ScreenFactor::None => 1.0,
                ScreenFactor::Transmitted => 1.0 - ctx.screen_closure,
                ScreenFactor::Exposed => ctx.screen_closure,
            };
        coeff * (t_a_k.powi(4) - t_b_k.powi(4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn law() -> Radiation {
        Radiation::new(100.0, 0.9, 0.85, 1.0, 1.0, &[]).unwrap()
    }

    #[test]
    fn warmer_side_loses() {
        let ctx = FluxContext::default();
        let q = law().flux(300.0, 280.0, &ctx);
        assert!(q > 0.0);
        let q_rev = law().flux(280.0, 300.0, &ctx);
        assert!((q + q_rev).abs() < 1e-9);
    }

    #[test]
    fn equal_temperatures_exchange_nothing() {
        let ctx = FluxContext::default();
        assert_eq!(law().flux(295.0, 295.0, &ctx), 0.0);
    }

    #[test]
    fn interception_reduces_exchange() {
        let ctx = FluxContext::default();
        let open = Radiation::new(100.0, 0.9, 0.85, 1.0, 1.0, &[]).unwrap();
        let shaded = Radiation::new(100.0, 0.9, 0.85, 1.0, 1.0, &[0.6]).unwrap();
        let q_open = open.flux(300.0, 280.0, &ctx);
        let q_shaded = shaded.flux(300.0, 280.0, &ctx);
        assert!(q_shaded < q_open);
        assert!((q_shaded - 0.4 * q_open).abs() < 1e-9);
    }

    #[test]
    fn screen_interception_tracks_closure() {
        let law = Radiation::new(100.0, 0.9, 0.85, 1.0, 1.0, &[])
            .unwrap()
            .with_screen_interception();
        let mut ctx = FluxContext::default();
        ctx.screen_closure = 1.0;
        assert_eq!(law.flux(300.0, 280.0, &ctx), 0.0);
        ctx.screen_closure = 0.5;
        let half = law.flux(300.0, 280.0, &ctx);
        ctx.screen_closure = 0.0;
        let full = law.flux(300.0, 280.0, &ctx);
        assert!((half - 0.5 * full).abs() < 1e-9);
    }

    #[test]
    fn screen_exposure_is_complementary_to_interception() {
        let exposed = Radiation::new(100.0, 0.9, 0.85, 1.0, 1.0, &[])
            .unwrap()
            .with_screen_exposure();
        let mut ctx = FluxContext::default();
        ctx.screen_closure = 0.0;
        // A retracted screen exchanges nothing
        assert_eq!(exposed.flux(300.0, 280.0, &ctx), 0.0);
        ctx.screen_closure = 1.0;
        assert!(exposed.flux(300.0, 280.0, &ctx) > 0.0);
    }

    #[test]
    fn rejects_bad_config() {
        assert!(Radiation::new(0.0, 0.9, 0.9, 1.0, 1.0, &[]).is_err());
        assert!(Radiation::new(100.0, 1.5, 0.9, 1.0, 1.0, &[]).is_err());
        assert!(Radiation::new(100.0, 0.9, 0.9, 1.0, 1.0, &[1.2]).is_err());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Swapping the two potentials negates the flux, for any
            /// temperatures and screen closure: the accumulation step
            /// therefore cancels exactly at both ports.
            #[test]
            fn flux_is_antisymmetric(
                t_a in 200.0_f64..400.0,
                t_b in 200.0_f64..400.0,
                sc in 0.0_f64..1.0,
            ) {
                let law = Radiation::new(120.0, 0.84, 0.89, 1.0, 1.0, &[0.3])
                    .unwrap()
                    .with_screen_interception();
                let ctx = FluxContext {
                    screen_closure: sc,
                    ..FluxContext::default()
                };
                let forward = law.flux(t_a, t_b, &ctx);
                let reverse = law.flux(t_b, t_a, &ctx);
                prop_assert!((forward + reverse).abs() <= 1e-9 * forward.abs().max(1.0));
            }
        }
    }
}
