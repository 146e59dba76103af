//! Per-tick state snapshot.

use gf_controls::ScreenMode;
use serde::{Deserialize, Serialize};

/// The orchestrator's output record for one tick.
///
/// Raw SI floats with the unit in the name, serializable for run
/// recording and export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulation time at the end of the tick, s.
    pub time_s: f64,

    // Physical state
    pub t_air_k: f64,
    pub t_cover_k: f64,
    pub t_canopy_k: f64,
    pub t_floor_k: f64,
    pub t_screen_k: f64,
    pub t_pipe_k: f64,
    pub vp_air_pa: f64,
    pub rh_air: f64,
    pub co2_air_mg_per_m3: f64,

    // Actuation
    pub screen_mode: ScreenMode,
    pub screen_closure: f64,
    pub vent_opening: f64,
    pub heating_power_w: f64,
    pub lamp_power_w: f64,
    pub co2_injection_mg_per_s: f64,

    // Exchange diagnostics
    pub q_vent_w: f64,

    // Accumulators
    pub cum_heat_j: f64,
    pub cum_elec_j: f64,
    pub crop_dry_matter_kg_per_m2: f64,
}
