//! ISA-form PID controller with anti-windup.
//!
//! The controller works in scaled units: PV and SP are rescaled into
//! [0, 1] with the configured PV range, the control signal is computed
//! in [0, 1] and rescaled into the configured CS range on the way out.
//! Anti-windup uses back-calculation: whenever the output saturates, the
//! tracking term `(CS_sat − CS_unsat)/(Kp·Ni)` bleeds the integral back
//! toward the saturation boundary.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// ISA PID construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsaPidParams {
    /// Proportional gain (on scaled units).
    pub kp: f64,
    /// Integral time constant (s). `ti <= 0` disables integral action.
    pub ti: f64,
    /// Derivative time constant (s). `td <= 0` disables derivative action.
    pub td: f64,
    /// Derivative filter divider (filter time constant is `td/nd`).
    pub nd: f64,
    /// Anti-windup tracking divider.
    pub ni: f64,
    /// Setpoint weight of the proportional term.
    pub b: f64,
    /// Setpoint weight of the derivative term.
    pub c: f64,
    /// Process variable scaling range.
    pub pv_min: f64,
    pub pv_max: f64,
    /// Control signal output range.
    pub cs_min: f64,
    pub cs_max: f64,
    /// Initial process variable (bumpless start).
    pub pv_start: f64,
    /// Initial control signal.
    pub cs_start: f64,
    /// Direct-acting loops (ventilation cooling) drive CS up as PV
    /// rises; reverse-acting loops (heating) drive CS up as PV falls.
    pub direct_acting: bool,
}

impl Default for IsaPidParams {
    fn default() -> Self {
        Self {
            kp: 0.7,
            ti: 600.0,
            td: 0.0,
            nd: 10.0,
            ni: 1.0,
            b: 1.0,
            c: 0.0,
            pv_min: 0.0,
            pv_max: 1.0,
            cs_min: 0.0,
            cs_max: 1.0,
            pv_start: 0.0,
            cs_start: 0.0,
            direct_acting: false,
        }
    }
}

/// ISA PID controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsaPid {
    params: IsaPidParams,
}

/// PID controller state, persisted across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsaPidState {
    /// Integral accumulator (scaled units).
    pub integral: f64,
    /// Derivative filter state (scaled units).
    pub deriv_filter: f64,
    /// Last emitted control signal (engineering units), for reporting
    /// and hold initialization.
    pub last_cs: f64,
}

impl IsaPid {
    pub fn new(params: IsaPidParams) -> ControlResult<Self> {
        if !(params.kp > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "kp must be positive",
            });
        }
        if params.pv_min >= params.pv_max {
            return Err(ControlError::InvalidArg {
                what: "pv_min must be less than pv_max",
            });
        }
        if params.cs_min >= params.cs_max {
            return Err(ControlError::InvalidArg {
                what: "cs_min must be less than cs_max",
            });
        }
        if params.ti > 0.0 && !(params.ni > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "ni must be positive when integral action is enabled",
            });
        }
        if params.td > 0.0 && !(params.nd > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "nd must be positive when derivative action is enabled",
            });
        }
        if params.b < 0.0 || params.c < 0.0 {
            return Err(ControlError::InvalidArg {
                what: "setpoint weights must be non-negative",
            });
        }
        if params.cs_start < params.cs_min || params.cs_start > params.cs_max {
            return Err(ControlError::InvalidArg {
                what: "cs_start must lie within [cs_min, cs_max]",
            });
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &IsaPidParams {
        &self.params
    }

    /// Initial state consistent with `pv_start`/`cs_start`.
    ///
    /// The integral is preloaded so the first output matches `cs_start`
    /// when PV sits at `pv_start` with SP equal to it (bumpless start);
    /// the derivative filter starts settled so there is no kick.
    pub fn initial_state(&self) -> IsaPidState {
        let p = &self.params;
        let pv0 = self.scale_pv(p.pv_start);
        let cs0_scaled = (p.cs_start - p.cs_min) / (p.cs_max - p.cs_min);
        let sign = if p.direct_acting { -1.0 } else { 1.0 };
        let p_term0 = sign * (p.b * pv0 - pv0);
        let integral = if p.ti > 0.0 {
            cs0_scaled / p.kp - p_term0
        } else {
            0.0
        };
        IsaPidState {
            integral,
            deriv_filter: sign * (p.c * pv0 - pv0),
            last_cs: p.cs_start,
        }
    }

    fn scale_pv(&self, pv: f64) -> f64 {
        (pv - self.params.pv_min) / (self.params.pv_max - self.params.pv_min)
    }

    /// Compute the control signal for one sample.
    ///
    /// Returns the updated state and CS in engineering units, always
    /// within `[cs_min, cs_max]`.
    pub fn update(&self, state: &IsaPidState, pv: f64, sp: f64, dt: f64) -> (IsaPidState, f64) {
        let p = &self.params;
        let pv_s = self.scale_pv(pv);
        let sp_s = self.scale_pv(sp);
        let sign = if p.direct_acting { -1.0 } else { 1.0 };

        // Proportional term with setpoint weighting
        let p_term = sign * (p.b * sp_s - pv_s);

        // Filtered derivative: approximates Td·s/(Td/Nd·s + 1).
        // Discrete filter form stays stable for any dt, including the
        // sampled case where dt exceeds the filter constant.
        let (d_term, deriv_filter) = if p.td > 0.0 {
            let ud = sign * (p.c * sp_s - pv_s);
            let t_f = p.td / p.nd;
            let alpha = t_f / (t_f + dt);
            let filter_new = alpha * state.deriv_filter + (1.0 - alpha) * ud;
            let d_term = p.td * (filter_new - state.deriv_filter) / dt;
            (d_term, filter_new)
        } else {
            (0.0, state.deriv_filter)
        };

        // Unsaturated and saturated control signals in scaled units
        let cs_unsat = p.kp * (p_term + state.integral + d_term);
        let cs_sat = cs_unsat.clamp(0.0, 1.0);

        // Integral update with back-calculation tracking
        let integral = if p.ti > 0.0 {
            let error_i = sign * (sp_s - pv_s);
            let track = (cs_sat - cs_unsat) / (p.kp * p.ni);
            state.integral + dt * (error_i / p.ti + track)
        } else {
            state.integral
        };

        let cs = p.cs_min + cs_sat * (p.cs_max - p.cs_min);
        (
            IsaPidState {
                integral,
                deriv_filter,
                last_cs: cs,
            },
            cs,
        )
    }
}
