//! Property test: flux conservation under randomized boundary inputs.
//!
//! Every flow element accumulates its flux equal-and-opposite onto its
//! two ports, and every one-sided source books its counter-flow on a
//! designated boundary port, so the sum of all port flows is zero by
//! construction. Randomized weather, setpoints and actuation histories
//! must never break that.

use gf_core::units::{k, mps, unitless, w_per_m2};
use gf_sim::{Greenhouse, GreenhouseConfig, Setpoints, Weather};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn flow_sum_is_zero_for_random_inputs(
        t_out in 250.0_f64..310.0,
        rh_out in 0.1_f64..1.0,
        i_glob in 0.0_f64..1000.0,
        wind in 0.0_f64..15.0,
        sky_depression in 0.0_f64..25.0,
        t_sp in 285.0_f64..300.0,
        co2_sp in 400.0_f64..1500.0,
        ticks in 1_usize..40,
    ) {
        let mut gh = Greenhouse::new(GreenhouseConfig::default()).unwrap();
        let weather = Weather {
            t_out: k(t_out),
            rh_out: unitless(rh_out),
            i_glob: w_per_m2(i_glob),
            wind: mps(wind),
            t_sky: k(t_out - sky_depression),
        };
        let setpoints = Setpoints {
            t_air: k(t_sp),
            co2_mg_per_m3: co2_sp,
        };
        for _ in 0..ticks {
            let snap = gh.tick(60.0, &weather, &setpoints).unwrap();
            prop_assert!(gh.flow_balance().abs() < 1e-6);
            // Every reported flux must be finite after recovery
            for (name, flux) in gh.fluxes() {
                prop_assert!(flux.is_finite(), "{name} produced {flux}");
            }
            prop_assert!(snap.t_air_k.is_finite());
        }
    }
}
