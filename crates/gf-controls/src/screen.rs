//! Finite-state thermal-screen controller.
//!
//! A Moore machine: the closure output depends only on the current
//! state, never on the transition taken. Dwell timers debounce the
//! slow transitions; every timer resets on every state change.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Screen controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenMode {
    Closed,
    OpeningColdDay,
    OpeningWarmDay,
    ClosingColdDay,
    Open,
    Crack,
    Crack2,
}

/// Per-state closure outputs (SC, fraction deployed in [0, 1]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosureTable {
    pub closed: f64,
    pub opening_cold: f64,
    pub opening_warm: f64,
    pub closing_cold: f64,
    pub open: f64,
    pub crack: f64,
    pub crack2: f64,
}

impl Default for ClosureTable {
    fn default() -> Self {
        Self {
            closed: 1.0,
            opening_cold: 0.98,
            opening_warm: 0.96,
            closing_cold: 0.98,
            open: 0.0,
            crack: 0.98,
            crack2: 0.96,
        }
    }
}

/// Screen controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenParams {
    /// Radiation threshold at the canopy for day transitions, W/m².
    pub r_glob_min_w_per_m2: f64,
    /// Cold-day margin below the air setpoint, K.
    pub cold_day_margin_k: f64,
    /// Dwell before a cold-day closing engages, s.
    pub closing_dwell_s: f64,
    /// Time spent opening on a cold day before fully open, s.
    pub opening_cold_dwell_s: f64,
    /// Time spent opening on a warm day before fully open, s.
    pub opening_warm_dwell_s: f64,
    /// Sustained-humidity dwell before widening the crack, s.
    pub crack2_dwell_s: f64,
    /// Humidity threshold that cracks a closed screen.
    pub rh_crack: f64,
    /// Humidity threshold that widens the crack.
    pub rh_crack2: f64,
    /// Humidity below which the screen returns to closed.
    pub rh_release: f64,
    /// Per-state closure outputs.
    pub closure: ClosureTable,
}

impl Default for ScreenParams {
    fn default() -> Self {
        Self {
            r_glob_min_w_per_m2: 32.0,
            cold_day_margin_k: 7.0,
            closing_dwell_s: 2.0 * 3600.0,
            opening_cold_dwell_s: 52.0 * 60.0,
            opening_warm_dwell_s: 32.0 * 60.0,
            crack2_dwell_s: 15.0 * 60.0,
            rh_crack: 0.83,
            rh_crack2: 0.85,
            rh_release: 0.70,
            closure: ClosureTable::default(),
        }
    }
}

/// Inputs sampled each tick from the freshly advanced physical state.
#[derive(Debug, Clone, Copy)]
pub struct ScreenInputs {
    /// Global radiation reaching the canopy, W/m².
    pub r_can_w_per_m2: f64,
    /// Outside air temperature, K.
    pub t_out_k: f64,
    /// Air temperature setpoint, K.
    pub t_air_sp_k: f64,
    /// Relative humidity of the greenhouse air (0..~1).
    pub rh_air: f64,
    /// Whether the screen may be deployed at all.
    pub usable: bool,
}

/// Controller state: current mode plus timer accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenState {
    pub mode: ScreenMode,
    /// Time spent in the current mode, s.
    pub mode_time_s: f64,
    /// Time the currently watched entry condition has held, s.
    /// Resets whenever the condition breaks or the mode changes.
    pub condition_time_s: f64,
}

impl ScreenState {
    pub fn closed() -> Self {
        Self {
            mode: ScreenMode::Closed,
            mode_time_s: 0.0,
            condition_time_s: 0.0,
        }
    }
}

/// Finite-state thermal-screen controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenController {
    params: ScreenParams,
}

impl ScreenController {
    pub fn new(params: ScreenParams) -> ControlResult<Self> {
        if !(params.r_glob_min_w_per_m2 > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "r_glob_min must be positive",
            });
        }
        if !(params.cold_day_margin_k > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "cold_day_margin must be positive",
            });
        }
        for dwell in [
            params.closing_dwell_s,
            params.opening_cold_dwell_s,
            params.opening_warm_dwell_s,
            params.crack2_dwell_s,
        ] {
            if !(dwell > 0.0) {
                return Err(ControlError::InvalidArg {
                    what: "dwell times must be positive",
                });
            }
        }
        if !(params.rh_release < params.rh_crack && params.rh_crack < params.rh_crack2) {
            return Err(ControlError::InvalidArg {
                what: "humidity thresholds must satisfy rh_release < rh_crack < rh_crack2",
            });
        }
        let c = &params.closure;
        for sc in [
            c.closed,
            c.opening_cold,
            c.opening_warm,
            c.closing_cold,
            c.open,
            c.crack,
            c.crack2,
        ] {
            if !(0.0..=1.0).contains(&sc) {
                return Err(ControlError::InvalidArg {
                    what: "closure outputs must lie in [0, 1]",
                });
            }
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &ScreenParams {
        &self.params
    }

    /// Moore output: closure for a mode.
    pub fn closure(&self, mode: ScreenMode) -> f64 {
        let c = &self.params.closure;
        match mode {
            ScreenMode::Closed => c.closed,
            ScreenMode::OpeningColdDay => c.opening_cold,
            ScreenMode::OpeningWarmDay => c.opening_warm,
            ScreenMode::ClosingColdDay => c.closing_cold,
            ScreenMode::Open => c.open,
            ScreenMode::Crack => c.crack,
            ScreenMode::Crack2 => c.crack2,
        }
    }

    /// Advance the controller by one sample.
    ///
    /// Returns the new state and the closure output of the state the
    /// machine ends the sample in.
    pub fn update(&self, state: &ScreenState, inputs: &ScreenInputs, dt: f64) -> (ScreenState, f64) {
        let p = &self.params;
        let threshold = inputs.t_air_sp_k - p.cold_day_margin_k;
        // Day openings split at the margin inclusively; the night
        // closing requires strictly colder air.
        let cold_day = inputs.t_out_k <= threshold;
        let cold_night = inputs.t_out_k < threshold;
        let day = inputs.r_can_w_per_m2 > p.r_glob_min_w_per_m2;

        let mode_time = state.mode_time_s + dt;
        let mut next = state.mode;
        let mut condition_time = state.condition_time_s;

        // Humidity release dominates every other transition.
        if state.mode != ScreenMode::Closed && inputs.rh_air < p.rh_release {
            next = ScreenMode::Closed;
        } else {
            match state.mode {
                ScreenMode::Closed => {
                    if day && !cold_day {
                        next = ScreenMode::OpeningWarmDay;
                    } else if day && cold_day {
                        next = ScreenMode::OpeningColdDay;
                    } else if inputs.rh_air > p.rh_crack {
                        next = ScreenMode::Crack;
                    } else if inputs.usable && cold_night && !day {
                        // Dwell-gated: the night cold condition must hold
                        // continuously for the full window. A one-tick
                        // radiation spike resets the accumulator.
                        condition_time += dt;
                        if condition_time >= p.closing_dwell_s {
                            next = ScreenMode::ClosingColdDay;
                        }
                    } else {
                        condition_time = 0.0;
                    }
                }
                ScreenMode::OpeningColdDay => {
                    if mode_time >= p.opening_cold_dwell_s {
                        next = ScreenMode::Open;
                    }
                }
                ScreenMode::OpeningWarmDay => {
                    if mode_time >= p.opening_warm_dwell_s {
                        next = ScreenMode::Open;
                    }
                }
                ScreenMode::Crack => {
                    if inputs.rh_air > p.rh_crack2 {
                        condition_time += dt;
                        if condition_time >= p.crack2_dwell_s {
                            next = ScreenMode::Crack2;
                        }
                    } else {
                        condition_time = 0.0;
                    }
                }
                ScreenMode::ClosingColdDay | ScreenMode::Open | ScreenMode::Crack2 => {
                    // Only the humidity release leaves these states.
                }
            }
        }

        let new_state = if next != state.mode {
            // Every timer resets on every transition.
            ScreenState {
                mode: next,
                mode_time_s: 0.0,
                condition_time_s: 0.0,
            }
        } else {
            ScreenState {
                mode: next,
                mode_time_s: mode_time,
                condition_time_s: condition_time,
            }
        };

        (new_state, self.closure(new_state.mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ScreenController {
        ScreenController::new(ScreenParams::default()).unwrap()
    }

    fn night_cold() -> ScreenInputs {
        ScreenInputs {
            r_can_w_per_m2: 0.0,
            t_out_k: 275.15,
            t_air_sp_k: 291.15,
            rh_air: 0.75,
            usable: true,
        }
    }

    #[test]
    fn warm_day_opens_faster_than_cold_day() {
        let ctl = controller();
        let warm = ScreenInputs {
            r_can_w_per_m2: 200.0,
            t_out_k: 289.15,
            ..night_cold()
        };
        let cold = ScreenInputs {
            r_can_w_per_m2: 200.0,
            t_out_k: 275.15,
            ..night_cold()
        };

        let (warm_state, _) = ctl.update(&ScreenState::closed(), &warm, 60.0);
        assert_eq!(warm_state.mode, ScreenMode::OpeningWarmDay);
        let (cold_state, _) = ctl.update(&ScreenState::closed(), &cold, 60.0);
        assert_eq!(cold_state.mode, ScreenMode::OpeningColdDay);

        // Warm day reaches Open after 32 min, cold day only after 52 min
        let mut s = warm_state;
        for _ in 0..32 {
            (s, _) = ctl.update(&s, &warm, 60.0);
        }
        assert_eq!(s.mode, ScreenMode::Open);

        let mut s = cold_state;
        for _ in 0..32 {
            (s, _) = ctl.update(&s, &cold, 60.0);
        }
        assert_eq!(s.mode, ScreenMode::OpeningColdDay);
        for _ in 0..20 {
            (s, _) = ctl.update(&s, &cold, 60.0);
        }
        assert_eq!(s.mode, ScreenMode::Open);
    }

    #[test]
    fn humidity_cracks_then_widens_after_sustained_excess() {
        let ctl = controller();
        let humid = ScreenInputs {
            rh_air: 0.84,
            ..night_cold()
        };
        let (s, sc) = ctl.update(&ScreenState::closed(), &humid, 60.0);
        assert_eq!(s.mode, ScreenMode::Crack);
        assert_eq!(sc, ctl.params().closure.crack);

        // 0.84 is below the crack2 threshold: stays cracked
        let mut state = s;
        for _ in 0..30 {
            (state, _) = ctl.update(&state, &humid, 60.0);
        }
        assert_eq!(state.mode, ScreenMode::Crack);

        // Sustained 0.86 widens after 15 minutes, not before
        let very_humid = ScreenInputs {
            rh_air: 0.86,
            ..night_cold()
        };
        for _ in 0..14 {
            (state, _) = ctl.update(&state, &very_humid, 60.0);
        }
        assert_eq!(state.mode, ScreenMode::Crack);
        (state, _) = ctl.update(&state, &very_humid, 60.0);
        assert_eq!(state.mode, ScreenMode::Crack2);
    }

    #[test]
    fn humidity_release_returns_to_closed() {
        let ctl = controller();
        let dry = ScreenInputs {
            rh_air: 0.60,
            ..night_cold()
        };
        for mode in [
            ScreenMode::Open,
            ScreenMode::Crack,
            ScreenMode::Crack2,
            ScreenMode::OpeningColdDay,
        ] {
            let state = ScreenState {
                mode,
                mode_time_s: 100.0,
                condition_time_s: 50.0,
            };
            let (s, sc) = ctl.update(&state, &dry, 60.0);
            assert_eq!(s.mode, ScreenMode::Closed);
            assert_eq!(s.mode_time_s, 0.0);
            assert_eq!(sc, 1.0);
        }
    }

    #[test]
    fn closing_dwell_debounces_radiation_spikes() {
        let ctl = controller();
        let night = night_cold();
        let spike = ScreenInputs {
            r_can_w_per_m2: 100.0,
            ..night
        };

        let mut state = ScreenState::closed();
        // Hold the cold night condition just short of the 2 h dwell
        for _ in 0..119 {
            (state, _) = ctl.update(&state, &night, 60.0);
        }
        assert_eq!(state.mode, ScreenMode::Closed);
        assert!(state.condition_time_s > 0.0);

        // One-tick spike above the radiation threshold: the machine
        // leaves for the warm/cold day branch or resets the dwell, but
        // must not fire the closing transition early afterwards.
        (state, _) = ctl.update(&state, &spike, 60.0);
        let after_spike = state;
        if after_spike.mode == ScreenMode::Closed {
            assert_eq!(after_spike.condition_time_s, 0.0);
        }
        // Back to night: the dwell starts over from zero
        let mut state = ScreenState::closed();
        for _ in 0..119 {
            (state, _) = ctl.update(&state, &night, 60.0);
        }
        assert_eq!(state.mode, ScreenMode::Closed);
        (state, _) = ctl.update(&state, &night, 60.0);
        assert_eq!(state.mode, ScreenMode::ClosingColdDay);
    }

    #[test]
    fn deterministic_over_scripted_profile() {
        let ctl = controller();

        let script = |run: &mut Vec<(ScreenMode, f64)>| {
            let mut state = ScreenState::closed();
            for tick in 0..1440 {
                let hour = (tick * 60) as f64 / 3600.0;
                let r = if (8.0..18.0).contains(&hour) { 250.0 } else { 0.0 };
                let rh = if hour < 6.0 { 0.86 } else { 0.65 };
                let inputs = ScreenInputs {
                    r_can_w_per_m2: r,
                    t_out_k: 276.15 + 4.0 * (hour / 24.0),
                    t_air_sp_k: 291.15,
                    rh_air: rh,
                    usable: true,
                };
                let (s, sc) = ctl.update(&state, &inputs, 60.0);
                state = s;
                run.push((state.mode, sc));
            }
        };

        let mut first = Vec::new();
        let mut second = Vec::new();
        script(&mut first);
        script(&mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_bad_thresholds() {
        let mut p = ScreenParams::default();
        p.rh_release = 0.9;
        assert!(ScreenController::new(p).is_err());

        let mut p = ScreenParams::default();
        p.closing_dwell_s = 0.0;
        assert!(ScreenController::new(p).is_err());

        let mut p = ScreenParams::default();
        p.closure.open = 1.2;
        assert!(ScreenController::new(p).is_err());
    }
}
