//! The greenhouse orchestrator.
//!
//! Owns every storage element, flow element and controller, and drives
//! the explicit five-phase tick schedule:
//!
//! 1. inject boundary conditions into boundary-port potentials
//! 2. recompute every flow element from last tick's potentials
//! 3. accumulate fluxes equal-and-opposite onto the port pair (plus the
//!    designated one-sided sources: sun, heating, lamps, CO2)
//! 4. recompute time-varying capacities and advance every storage
//! 5. run controllers against the freshly advanced state
//!
//! The order is load-bearing: this is an explicit causal scheme, not a
//! fixed-point solver, so each phase consumes exactly what the previous
//! phases produced.

use gf_controls::{
    IsaPid, IsaPidState, SampleClock, ScreenController, ScreenInputs, ScreenMode, ScreenState,
    ZeroOrderHold,
};
use gf_core::constants::{CP_AIR_J_PER_KGK, R_VAPOUR_J_PER_KGK, RHO_AIR_KG_PER_M3};
use gf_flux::{
    Condensation, Convection, FluxContext, FluxLaw, LinearExchange, MassKind, Radiation,
    ScreenScaling, VentRate, Ventilation, VentilationMass, psychro,
};
use gf_net::{Domain, Network, NetworkBuilder};
use tracing::warn;

use crate::boundary::{Setpoints, Weather};
use crate::config::GreenhouseConfig;
use crate::crop::{CropModel, CropState};
use crate::error::{SimError, SimResult};
use crate::fault::FaultTracker;
use crate::lighting::Lighting;
use crate::snapshot::Snapshot;
use crate::storage::Storage;

/// A flow element: its law plus the last computed flux (reporting only).
struct FlowElement {
    law: Box<dyn FluxLaw>,
    last_flux: f64,
}

/// Storage indices, in construction order.
#[derive(Clone, Copy)]
struct StoreIdx {
    cover: usize,
    air: usize,
    canopy: usize,
    floor: usize,
    screen: usize,
    pipe: usize,
    air_vp: usize,
    air_co2: usize,
}

/// Port indices of the boundary ports.
#[derive(Clone, Copy)]
struct BoundaryPorts {
    out: usize,
    sky: usize,
    soil: usize,
    out_vp: usize,
    cover_sat: usize,
    canopy_sat: usize,
    out_co2: usize,
    // Designated one-sided forcing ports
    sun: usize,
    heat_sys: usize,
    lamp: usize,
    co2_supply: usize,
    crop_sink: usize,
}

/// Actuation held between ticks (last controller outputs).
#[derive(Clone, Copy, Debug)]
struct Actuation {
    heating_w: f64,
    vent_opening: f64,
    co2_injection_mg_per_s: f64,
    screen_closure: f64,
    co2_uptake_mg_per_s: f64,
    lamp_power_w: f64,
}

/// A PID loop with its state and zero-order hold.
struct PidLoop {
    pid: IsaPid,
    state: IsaPidState,
    hold: ZeroOrderHold,
}

impl PidLoop {
    fn new(pid: IsaPid, period_s: f64) -> SimResult<Self> {
        let state = pid.initial_state();
        let hold = ZeroOrderHold::new(period_s, 0.0, state.last_cs)?;
        Ok(Self { pid, state, hold })
    }

    /// Run one controller step.
    ///
    /// When `sampled` is set the loop only executes at its sample
    /// instants and holds the output in between; otherwise it runs every
    /// tick with the engine `dt`.
    fn step(&mut self, now_s: f64, dt: f64, pv: f64, sp: f64, sampled: bool) -> f64 {
        if sampled {
            let period = self.hold.clock.period_s;
            let pid = &self.pid;
            let state = &mut self.state;
            self.hold.refresh(now_s, || {
                let (s, cs) = pid.update(state, pv, sp, period);
                *state = s;
                cs
            });
        } else {
            let (s, cs) = self.pid.update(&self.state, pv, sp, dt);
            self.state = s;
            self.hold.value = cs;
        }
        self.hold.get()
    }
}

/// The lumped greenhouse simulator.
pub struct Greenhouse {
    cfg: GreenhouseConfig,
    net: Network,
    storages: Vec<Storage>,
    elements: Vec<FlowElement>,
    /// Port potentials, indexed by PortId.
    potentials: Vec<f64>,
    /// Accumulated port flows (the storages' net flows), indexed by PortId.
    flows: Vec<f64>,

    s: StoreIdx,
    bp: BoundaryPorts,
    vent_flow: usize,

    heating: PidLoop,
    vent: PidLoop,
    co2: PidLoop,
    screen_ctl: ScreenController,
    screen_state: ScreenState,
    screen_clock: Option<SampleClock>,
    lighting: Option<Lighting>,
    crop: CropModel,
    crop_state: CropState,

    act: Actuation,
    flux_faults: FaultTracker,
    store_faults: FaultTracker,

    time_s: f64,
    cum_heat_j: f64,
    cum_elec_j: f64,
    /// Sum of all port flows after accumulation; zero by construction.
    flow_balance: f64,
}

impl Greenhouse {
    /// Build the model from a validated configuration.
    pub fn new(cfg: GreenhouseConfig) -> SimResult<Self> {
        let g = &cfg.geometry;
        for (v, what) in [
            (g.floor_area_m2, "floor_area_m2 must be positive"),
            (g.cover_area_m2, "cover_area_m2 must be positive"),
            (g.h_air_m, "h_air_m must be positive"),
            (g.h_vent_m, "h_vent_m must be positive"),
            (g.pipe_area_per_floor, "pipe_area_per_floor must be positive"),
        ] {
            if !(v > 0.0) {
                return Err(SimError::InvalidArg { what });
            }
        }
        if g.h_top_m < 0.0 {
            return Err(SimError::InvalidArg {
                what: "h_top_m must be non-negative",
            });
        }
        let c = &cfg.capacities;
        for (v, what) in [
            (c.cover_j_per_m2k, "cover capacity must be positive"),
            (c.floor_j_per_m2k, "floor capacity must be positive"),
            (c.screen_j_per_m2k, "screen capacity must be positive"),
            (c.canopy_leaf_j_per_m2k, "canopy capacity must be positive"),
            (c.pipe_j_per_m2k, "pipe capacity must be positive"),
        ] {
            if !(v > 0.0) {
                return Err(SimError::InvalidArg { what });
            }
        }
        if !(0.0..=1.0).contains(&cfg.exchange.tau_cover)
            || !(0.0..=1.0).contains(&cfg.exchange.tau_screen)
        {
            return Err(SimError::InvalidArg {
                what: "cover/screen transmissivities must lie in [0, 1]",
            });
        }
        let x = &cfg.exchange;
        if x.abs_cover < 0.0
            || x.abs_canopy < 0.0
            || x.abs_floor < 0.0
            || x.abs_air < 0.0
            || x.abs_cover + x.abs_canopy + x.abs_floor + x.abs_air > 1.0
        {
            return Err(SimError::InvalidArg {
                what: "solar absorption fractions must be non-negative and sum to at most 1",
            });
        }

        // --- Topology ---------------------------------------------------
        let mut b = NetworkBuilder::new();
        let cover = b.add_store("cover", Domain::Heat);
        let air = b.add_store("air", Domain::Heat);
        let canopy = b.add_store("canopy", Domain::Heat);
        let floor = b.add_store("floor", Domain::Heat);
        let screen = b.add_store("screen", Domain::Heat);
        let pipe = b.add_store("pipe", Domain::Heat);
        let air_vp = b.add_store("air_vp", Domain::Vapour);
        let air_co2 = b.add_store("air_co2", Domain::Co2);

        let out = b.add_boundary("outside", Domain::Heat);
        let sky = b.add_boundary("sky", Domain::Heat);
        let soil = b.add_boundary("soil", Domain::Heat);
        let out_vp = b.add_boundary("outside_vp", Domain::Vapour);
        let cover_sat = b.add_boundary("cover_sat", Domain::Vapour);
        let canopy_sat = b.add_boundary("canopy_sat", Domain::Vapour);
        let out_co2 = b.add_boundary("outside_co2", Domain::Co2);
        let sun = b.add_boundary("sun", Domain::Heat);
        let heat_sys = b.add_boundary("heating_system", Domain::Heat);
        let lamp = b.add_boundary("lamps", Domain::Heat);
        let co2_supply = b.add_boundary("co2_supply", Domain::Co2);
        let crop_sink = b.add_boundary("crop_sink", Domain::Co2);

        let lai = cfg.crop.lai;
        let floor_area = g.floor_area_m2;
        let cover_area = g.cover_area_m2;
        let vent_rate = VentRate::new(x.vent_cd, g.h_vent_m, x.vent_c_wind, x.leakage_m_per_s)?;

        // Laws and their connections, built side by side so the element
        // vector stays parallel to the network's flow list.
        let mut elements: Vec<FlowElement> = Vec::new();
        let mut connect = |b: &mut NetworkBuilder,
                           name: &str,
                           domain: Domain,
                           pa: gf_core::PortId,
                           pb: gf_core::PortId,
                           law: Box<dyn FluxLaw>|
         -> SimResult<()> {
            b.connect(name, domain, pa, pb)?;
            elements.push(FlowElement {
                law,
                last_flux: 0.0,
            });
            Ok(())
        };

        let p_cover = b.store_port(cover);
        let p_air = b.store_port(air);
        let p_canopy = b.store_port(canopy);
        let p_floor = b.store_port(floor);
        let p_screen = b.store_port(screen);
        let p_pipe = b.store_port(pipe);
        let p_air_vp = b.store_port(air_vp);
        let p_air_co2 = b.store_port(air_co2);
        let pb_out = b.boundary_port(out);
        let pb_sky = b.boundary_port(sky);
        let pb_soil = b.boundary_port(soil);
        let pb_out_vp = b.boundary_port(out_vp);
        let pb_cover_sat = b.boundary_port(cover_sat);
        let pb_canopy_sat = b.boundary_port(canopy_sat);
        let pb_out_co2 = b.boundary_port(out_co2);

        connect(
            &mut b,
            "rad_cover_sky",
            Domain::Heat,
            p_cover,
            pb_sky,
            Box::new(Radiation::new(cover_area, x.eps_cover, 1.0, 1.0, 1.0, &[])?),
        )?;
        connect(
            &mut b,
            "cnv_cover_out",
            Domain::Heat,
            p_cover,
            pb_out,
            Box::new(Convection::wind_blended(
                cover_area,
                x.cover_out_a_low,
                x.cover_out_b_low,
                x.cover_out_c_high,
                x.cover_out_n_high,
                x.cover_out_u_threshold_m_per_s,
            )?),
        )?;
        connect(
            &mut b,
            "cnv_air_cover",
            Domain::Heat,
            p_air,
            p_cover,
            Box::new(
                Convection::free(floor_area, x.c_air_cover, x.n_air_cover)?
                    .with_screen_scaling(ScreenScaling::OpenFraction),
            ),
        )?;
        connect(
            &mut b,
            "cnv_air_screen",
            Domain::Heat,
            p_air,
            p_screen,
            Box::new(
                Convection::free(floor_area, x.c_air_screen, x.n_air_screen)?
                    .with_screen_scaling(ScreenScaling::Closure),
            ),
        )?;
        connect(
            &mut b,
            "rad_screen_cover",
            Domain::Heat,
            p_screen,
            p_cover,
            Box::new(
                Radiation::new(floor_area, x.eps_screen, x.eps_cover, 1.0, 1.0, &[])?
                    .with_screen_exposure(),
            ),
        )?;
        connect(
            &mut b,
            "rad_canopy_cover",
            Domain::Heat,
            p_canopy,
            p_cover,
            Box::new(
                Radiation::new(floor_area, x.eps_canopy, x.eps_cover, 1.0, 1.0, &[])?
                    .with_screen_interception(),
            ),
        )?;
        connect(
            &mut b,
            "rad_floor_cover",
            Domain::Heat,
            p_floor,
            p_cover,
            Box::new(
                Radiation::new(
                    floor_area,
                    x.eps_floor,
                    x.eps_cover,
                    1.0,
                    1.0,
                    &[x.canopy_floor_intercept],
                )?
                .with_screen_interception(),
            ),
        )?;
        connect(
            &mut b,
            "cnv_air_canopy",
            Domain::Heat,
            p_air,
            p_canopy,
            Box::new(Convection::free(
                2.0 * lai * floor_area,
                x.c_air_canopy,
                x.n_air_canopy,
            )?),
        )?;
        connect(
            &mut b,
            "cnv_pipe_air",
            Domain::Heat,
            p_pipe,
            p_air,
            Box::new(Convection::free(
                g.pipe_area_per_floor * floor_area,
                x.c_pipe_air,
                x.n_pipe_air,
            )?),
        )?;
        connect(
            &mut b,
            "cnv_air_floor",
            Domain::Heat,
            p_air,
            p_floor,
            Box::new(Convection::free(floor_area, x.c_air_floor, x.n_air_floor)?),
        )?;
        connect(
            &mut b,
            "cond_floor_soil",
            Domain::Heat,
            p_floor,
            pb_soil,
            Box::new(LinearExchange::new(x.u_floor_soil_w_per_m2k * floor_area)?),
        )?;
        connect(
            &mut b,
            "vent_air_out",
            Domain::Heat,
            p_air,
            pb_out,
            Box::new(Ventilation::new(floor_area, vent_rate)?),
        )?;
        connect(
            &mut b,
            "transpiration",
            Domain::Vapour,
            pb_canopy_sat,
            p_air_vp,
            Box::new(LinearExchange::new(
                x.g_transpiration_kg_per_m2spa_per_lai * lai * floor_area,
            )?),
        )?;
        connect(
            &mut b,
            "cond_cover",
            Domain::Vapour,
            p_air_vp,
            pb_cover_sat,
            Box::new(Condensation::new(cover_area, x.k_condensation_kg_per_m2spa)?),
        )?;
        connect(
            &mut b,
            "vent_vapour",
            Domain::Vapour,
            p_air_vp,
            pb_out_vp,
            Box::new(VentilationMass::new(floor_area, vent_rate, MassKind::Vapour)?),
        )?;
        connect(
            &mut b,
            "vent_co2",
            Domain::Co2,
            p_air_co2,
            pb_out_co2,
            Box::new(VentilationMass::new(floor_area, vent_rate, MassKind::Co2)?),
        )?;

        let bp = BoundaryPorts {
            out: pb_out.index() as usize,
            sky: pb_sky.index() as usize,
            soil: pb_soil.index() as usize,
            out_vp: pb_out_vp.index() as usize,
            cover_sat: pb_cover_sat.index() as usize,
            canopy_sat: pb_canopy_sat.index() as usize,
            out_co2: pb_out_co2.index() as usize,
            sun: b.boundary_port(sun).index() as usize,
            heat_sys: b.boundary_port(heat_sys).index() as usize,
            lamp: b.boundary_port(lamp).index() as usize,
            co2_supply: b.boundary_port(co2_supply).index() as usize,
            crop_sink: b.boundary_port(crop_sink).index() as usize,
        };
        let s = StoreIdx {
            cover: cover.index() as usize,
            air: air.index() as usize,
            canopy: canopy.index() as usize,
            floor: floor.index() as usize,
            screen: screen.index() as usize,
            pipe: pipe.index() as usize,
            air_vp: air_vp.index() as usize,
            air_co2: air_co2.index() as usize,
        };

        let net = b.build()?;
        let vent_flow = net
            .flows()
            .iter()
            .position(|f| f.name == "vent_air_out")
            .expect("vent flow registered above");

        // --- Storage elements -------------------------------------------
        // Thin elements get a stiffness guard: their small capacities
        // make the T⁴ and |ΔT|^n laws prone to overshoot on large dt.
        let storages = vec![
            Storage::new("cover", Domain::Heat).with_max_delta(5.0)?,
            Storage::new("air", Domain::Heat).with_max_delta(5.0)?,
            Storage::new("canopy", Domain::Heat).with_max_delta(5.0)?,
            Storage::new("floor", Domain::Heat),
            Storage::new("screen", Domain::Heat).with_max_delta(10.0)?,
            Storage::new("pipe", Domain::Heat).with_max_delta(10.0)?,
            Storage::new("air_vp", Domain::Vapour).with_max_delta(300.0)?,
            Storage::new("air_co2", Domain::Co2).with_max_delta(300.0)?,
        ];

        // --- Controllers -------------------------------------------------
        let control_period = cfg.control_period_s;
        if let Some(p) = control_period {
            if !(p > 0.0) {
                return Err(SimError::InvalidArg {
                    what: "control_period_s must be positive",
                });
            }
        }
        let hold_period = control_period.unwrap_or(1.0);
        let heating = PidLoop::new(IsaPid::new(cfg.heating.pid)?, hold_period)?;
        let vent = PidLoop::new(IsaPid::new(cfg.vent.pid)?, hold_period)?;
        let co2 = PidLoop::new(IsaPid::new(cfg.co2.pid)?, hold_period)?;
        if !cfg.vent.pid.direct_acting {
            return Err(SimError::Config {
                message: "vent PID must be direct-acting (opens on rising temperature)".into(),
            });
        }
        if !(cfg.vent.band_k >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "vent band must be non-negative",
            });
        }
        if !(cfg.heating.t_pipe_max_k > cfg.init.t_pipe_k) {
            return Err(SimError::Config {
                message: "pipe temperature ceiling must exceed the initial pipe temperature".into(),
            });
        }
        let screen_ctl = ScreenController::new(cfg.screen)?;
        let screen_state = ScreenState::closed();
        let screen_clock = match control_period {
            Some(p) => Some(SampleClock::new(p, 0.0)?),
            None => None,
        };
        let lighting = cfg.lighting.map(Lighting::new).transpose()?;
        let crop = CropModel::new(cfg.crop)?;

        let flux_faults = FaultTracker::new(net.flows().len(), cfg.fault_limit)?;
        let store_faults = FaultTracker::new(net.stores().len(), cfg.fault_limit)?;

        // --- Initial values ----------------------------------------------
        let mut potentials = vec![0.0; net.ports().len()];
        let init = &cfg.init;
        let store_port = |idx: usize| net.stores()[idx].port.index() as usize;
        potentials[store_port(s.cover)] = init.t_cover_k;
        potentials[store_port(s.air)] = init.t_air_k;
        potentials[store_port(s.canopy)] = init.t_canopy_k;
        potentials[store_port(s.floor)] = init.t_floor_k;
        potentials[store_port(s.screen)] = init.t_screen_k;
        potentials[store_port(s.pipe)] = init.t_pipe_k;
        potentials[store_port(s.air_vp)] = psychro::vp_from_rh(init.rh_air, init.t_air_k);
        potentials[store_port(s.air_co2)] = init.co2_air_mg_per_m3;

        let act = Actuation {
            heating_w: cfg.heating.pid.cs_start,
            vent_opening: cfg.vent.pid.cs_start,
            co2_injection_mg_per_s: cfg.co2.pid.cs_start,
            screen_closure: screen_ctl.closure(screen_state.mode),
            co2_uptake_mg_per_s: 0.0,
            lamp_power_w: 0.0,
        };

        let flows = vec![0.0; net.ports().len()];
        Ok(Self {
            cfg,
            net,
            storages,
            elements,
            potentials,
            flows,
            s,
            bp,
            vent_flow,
            heating,
            vent,
            co2,
            screen_ctl,
            screen_state,
            screen_clock,
            lighting,
            crop,
            crop_state: CropState::empty(),
            act,
            flux_faults,
            store_faults,
            time_s: 0.0,
            cum_heat_j: 0.0,
            cum_elec_j: 0.0,
            flow_balance: 0.0,
        })
    }

    fn store_port(&self, idx: usize) -> usize {
        self.net.stores()[idx].port.index() as usize
    }

    fn store_value(&self, idx: usize) -> f64 {
        self.potentials[self.store_port(idx)]
    }

    /// Simulation time, s.
    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// The underlying exchange network.
    pub fn network(&self) -> &Network {
        &self.net
    }

    /// Last computed flux of each flow element, W or kg/s or mg/s.
    pub fn fluxes(&self) -> impl Iterator<Item = (&str, f64)> {
        self.net
            .flows()
            .iter()
            .zip(&self.elements)
            .map(|(def, el)| (def.name.as_str(), el.last_flux))
    }

    /// Sum of all port flows after the last accumulation phase.
    ///
    /// Zero up to rounding by construction: every flux enters twice with
    /// opposite signs, one-sided sources included (their counter-flow
    /// lands on a designated boundary port).
    pub fn flow_balance(&self) -> f64 {
        self.flow_balance
    }

    /// Advance the model by one tick and return the state snapshot.
    pub fn tick(
        &mut self,
        dt: f64,
        weather: &Weather,
        setpoints: &Setpoints,
    ) -> SimResult<Snapshot> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive and finite",
            });
        }
        self.inject_boundaries(weather);
        self.recompute_fluxes(weather)?;
        self.inject_sources(dt, weather)?;
        self.advance_stores(dt)?;
        self.run_controllers(dt, weather, setpoints);
        self.time_s += dt;
        Ok(self.snapshot())
    }

    /// Steady-state initialization: run the model against fixed boundary
    /// conditions, then zero the run accumulators.
    ///
    /// A distinct warm-up phase, not a per-tick flag: after it returns
    /// the physical state is relaxed and the energy/yield accounting
    /// starts from zero.
    pub fn warmup(
        &mut self,
        dt: f64,
        weather: &Weather,
        setpoints: &Setpoints,
        ticks: usize,
    ) -> SimResult<()> {
        for _ in 0..ticks {
            self.tick(dt, weather, setpoints)?;
        }
        self.cum_heat_j = 0.0;
        self.cum_elec_j = 0.0;
        self.crop_state = CropState::empty();
        Ok(())
    }

    /// Phase 1: prescribe boundary-port potentials from the weather and
    /// the current surface temperatures.
    fn inject_boundaries(&mut self, weather: &Weather) {
        let t_cover = self.store_value(self.s.cover);
        let t_canopy = self.store_value(self.s.canopy);
        let p = &mut self.potentials;
        p[self.bp.out] = weather.t_out_k();
        p[self.bp.sky] = weather.t_sky_k();
        p[self.bp.soil] = self.cfg.exchange.soil_t_k;
        p[self.bp.out_vp] = psychro::vp_from_rh(weather.rh_out_frac(), weather.t_out_k());
        p[self.bp.cover_sat] = psychro::saturation_pressure_pa(t_cover);
        p[self.bp.canopy_sat] = psychro::saturation_pressure_pa(t_canopy);
        p[self.bp.out_co2] = self.cfg.exchange.outdoor_co2_mg_per_m3;
    }

    /// Shared per-tick context for the flux laws.
    fn flux_context(&self, weather: &Weather) -> FluxContext {
        let t_air = self.store_value(self.s.air);
        FluxContext {
            wind_m_per_s: weather.wind_m_per_s(),
            screen_closure: self.act.screen_closure,
            vent_opening: self.act.vent_opening,
            t_mean_k: t_air,
            vent_dt_k: t_air - weather.t_out_k(),
            lai: self.cfg.crop.lai,
        }
    }

    /// Phases 2+3: recompute every flow element from last tick's
    /// potentials and accumulate each flux onto its port pair.
    fn recompute_fluxes(&mut self, weather: &Weather) -> SimResult<()> {
        self.flows.fill(0.0);
        let ctx = self.flux_context(weather);
        for i in 0..self.elements.len() {
            let def = &self.net.flows()[i];
            let pa = def.port_a.index() as usize;
            let pb = def.port_b.index() as usize;
            let mut flux = self.elements[i].law.flux(self.potentials[pa], self.potentials[pb], &ctx);
            if !flux.is_finite() {
                self.flux_faults
                    .fault(i, &self.net.flows()[i].name, flux)?;
                flux = 0.0;
            } else {
                self.flux_faults.ok(i);
            }
            self.elements[i].last_flux = flux;
            // Positive flux moves the quantity from side A to side B
            self.flows[pa] -= flux;
            self.flows[pb] += flux;
        }
        Ok(())
    }

    /// Phase 3 (sources): one-sided forcing through designated boundary
    /// ports. Each source adds to a store port and subtracts the same
    /// amount at its boundary port, so the global flow sum stays zero.
    fn inject_sources(&mut self, dt: f64, weather: &Weather) -> SimResult<()> {
        let x = self.cfg.exchange;
        let floor_area = self.cfg.geometry.floor_area_m2;
        let i_glob = weather.i_glob_w_per_m2();

        // Solar gains, split by configured absorption fractions
        let solar = if i_glob.is_finite() { i_glob.max(0.0) } else { 0.0 };
        let q_solar = solar * floor_area;
        let sun = self.bp.sun;
        self.add_source(self.s.cover, sun, q_solar * x.abs_cover);
        self.add_source(self.s.canopy, sun, q_solar * x.abs_canopy);
        self.add_source(self.s.floor, sun, q_solar * x.abs_floor);
        self.add_source(self.s.air, sun, q_solar * x.abs_air);

        // Heating into the pipes (previous tick's PID output)
        let q_heat = self.act.heating_w;
        self.add_source(self.s.pipe, self.bp.heat_sys, q_heat);
        self.cum_heat_j += q_heat * dt;

        // Supplementary lighting
        let hour = (self.time_s / 3600.0) % 24.0;
        let lamp_w = match &self.lighting {
            Some(l) => l.power_w_per_m2(hour, i_glob) * floor_area,
            None => 0.0,
        };
        if lamp_w > 0.0 {
            let par = self.lighting.as_ref().map_or(0.0, |l| l.params().par_fraction);
            let lamp = self.bp.lamp;
            self.add_source(self.s.canopy, lamp, lamp_w * par);
            self.add_source(self.s.air, lamp, lamp_w * (1.0 - par));
            self.cum_elec_j += lamp_w * dt;
        }
        self.act.lamp_power_w = lamp_w;

        // CO2 injection and crop uptake
        self.add_source(
            self.s.air_co2,
            self.bp.co2_supply,
            self.act.co2_injection_mg_per_s,
        );
        self.add_source(
            self.s.air_co2,
            self.bp.crop_sink,
            -self.act.co2_uptake_mg_per_s,
        );

        self.flow_balance = self.flows.iter().sum();
        Ok(())
    }

    fn add_source(&mut self, store_idx: usize, boundary_port: usize, q: f64) {
        let q = if q.is_finite() {
            q
        } else {
            warn!(store = store_idx, value = q, "non-finite source zeroed");
            0.0
        };
        let port = self.store_port(store_idx);
        self.flows[port] += q;
        self.flows[boundary_port] -= q;
    }

    /// Current capacities, recomputed every tick: the air volume (and
    /// with it the vapor and CO2 holdup) depends on screen closure, the
    /// vapor capacity additionally on air temperature.
    fn capacities(&self) -> [f64; 8] {
        let g = &self.cfg.geometry;
        let c = &self.cfg.capacities;
        let sc = self.act.screen_closure;
        let h_eff = g.h_air_m + (1.0 - sc) * g.h_top_m;
        let volume = g.floor_area_m2 * h_eff;
        let t_air = self.store_value(self.s.air).max(1.0);

        let mut caps = [0.0; 8];
        caps[self.s.cover] = g.cover_area_m2 * c.cover_j_per_m2k;
        caps[self.s.air] = RHO_AIR_KG_PER_M3 * CP_AIR_J_PER_KGK * volume;
        caps[self.s.canopy] = c.canopy_leaf_j_per_m2k * self.cfg.crop.lai * g.floor_area_m2;
        caps[self.s.floor] = g.floor_area_m2 * c.floor_j_per_m2k;
        caps[self.s.screen] = g.floor_area_m2 * c.screen_j_per_m2k;
        caps[self.s.pipe] = g.floor_area_m2 * c.pipe_j_per_m2k;
        caps[self.s.air_vp] = volume / (R_VAPOUR_J_PER_KGK * t_air);
        caps[self.s.air_co2] = volume;
        caps
    }

    /// Phase 4: advance every storage element by one explicit step.
    fn advance_stores(&mut self, dt: f64) -> SimResult<()> {
        let caps = self.capacities();
        for i in 0..self.storages.len() {
            let port = self.store_port(i);
            let value = self.potentials[port];
            let net_flow = self.flows[port];
            let new_value = self.storages[i].advance(value, net_flow, caps[i], dt)?;
            if new_value.is_finite() {
                self.store_faults.ok(i);
                self.potentials[port] = new_value;
            } else {
                // Hold the previous value; the streak tracker escalates
                // if this keeps happening.
                self.store_faults
                    .fault(i, &self.net.stores()[i].name, new_value)?;
            }
            self.flows[port] = 0.0;
        }

        let t_pipe = self.store_value(self.s.pipe);
        if t_pipe > self.cfg.heating.t_pipe_max_k {
            return Err(SimError::PhysicalLimit {
                what: "pipe temperature (K)",
                value: t_pipe,
            });
        }
        Ok(())
    }

    /// Global radiation reaching the canopy, W/m².
    fn r_can_w_per_m2(&self, i_glob: f64) -> f64 {
        let x = &self.cfg.exchange;
        let sc = self.act.screen_closure;
        let solar = if i_glob.is_finite() { i_glob.max(0.0) } else { 0.0 };
        let through_screen = 1.0 - sc * (1.0 - x.tau_screen);
        let lamp_par = self.lighting.as_ref().map_or(0.0, |l| {
            l.params().par_fraction * self.act.lamp_power_w / self.cfg.geometry.floor_area_m2
        });
        solar * x.tau_cover * through_screen + lamp_par
    }

    /// Phase 5: run controllers against the freshly advanced state.
    /// Their outputs are next tick's actuation.
    fn run_controllers(&mut self, dt: f64, weather: &Weather, setpoints: &Setpoints) {
        let now = self.time_s + dt;
        let sampled = self.cfg.control_period_s.is_some();

        let t_air = self.store_value(self.s.air);
        let t_canopy = self.store_value(self.s.canopy);
        let vp_air = self.store_value(self.s.air_vp);
        let co2_air = self.store_value(self.s.air_co2);
        let rh_air = psychro::relative_humidity(vp_air, t_air);
        let r_can = self.r_can_w_per_m2(weather.i_glob_w_per_m2());
        let sp_heat = setpoints.t_air_k();

        let heating_w = self.heating.step(now, dt, t_air, sp_heat, sampled);
        self.act.heating_w = sanitize(heating_w, "heating command");

        let sp_vent = sp_heat + self.cfg.vent.band_k;
        let vent_opening = self.vent.step(now, dt, t_air, sp_vent, sampled);
        self.act.vent_opening = sanitize(vent_opening, "vent command").clamp(0.0, 1.0);

        let co2_cmd = self
            .co2
            .step(now, dt, co2_air, setpoints.co2_mg_per_m3, sampled);
        self.act.co2_injection_mg_per_s = sanitize(co2_cmd, "co2 command");

        // Screen FSM: sampled on the same cadence as the PID loops
        let inputs = ScreenInputs {
            r_can_w_per_m2: r_can,
            t_out_k: weather.t_out_k(),
            t_air_sp_k: sp_heat,
            rh_air,
            usable: self.cfg.screen_usable,
        };
        let fsm_due = match self.screen_clock.as_mut() {
            Some(clock) => {
                if clock.due(now) {
                    clock.advance();
                    true
                } else {
                    false
                }
            }
            None => true,
        };
        if fsm_due {
            let fsm_dt = self.cfg.control_period_s.unwrap_or(dt);
            let (state, sc) = self.screen_ctl.update(&self.screen_state, &inputs, fsm_dt);
            self.screen_state = state;
            self.act.screen_closure = sanitize(sc, "screen closure").clamp(0.0, 1.0);
        }

        // Crop integrates every tick; its uptake is next tick's CO2 sink
        let (crop_state, uptake) = self.crop.step(
            &self.crop_state,
            r_can,
            co2_air,
            t_canopy,
            self.cfg.geometry.floor_area_m2,
            dt,
        );
        self.crop_state = crop_state;
        self.act.co2_uptake_mg_per_s = sanitize(uptake, "crop uptake").max(0.0);
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> Snapshot {
        let t_air = self.store_value(self.s.air);
        let vp_air = self.store_value(self.s.air_vp);
        Snapshot {
            time_s: self.time_s,
            t_air_k: t_air,
            t_cover_k: self.store_value(self.s.cover),
            t_canopy_k: self.store_value(self.s.canopy),
            t_floor_k: self.store_value(self.s.floor),
            t_screen_k: self.store_value(self.s.screen),
            t_pipe_k: self.store_value(self.s.pipe),
            vp_air_pa: vp_air,
            rh_air: psychro::relative_humidity(vp_air, t_air),
            co2_air_mg_per_m3: self.store_value(self.s.air_co2),
            screen_mode: self.screen_state.mode,
            screen_closure: self.act.screen_closure,
            vent_opening: self.act.vent_opening,
            heating_power_w: self.act.heating_w,
            lamp_power_w: self.act.lamp_power_w,
            co2_injection_mg_per_s: self.act.co2_injection_mg_per_s,
            q_vent_w: self.elements[self.vent_flow].last_flux,
            cum_heat_j: self.cum_heat_j,
            cum_elec_j: self.cum_elec_j,
            crop_dry_matter_kg_per_m2: self.crop_state.dry_matter_kg_per_m2,
        }
    }

    /// Current screen mode (for inspection and tests).
    pub fn screen_mode(&self) -> ScreenMode {
        self.screen_state.mode
    }
}

fn sanitize(v: f64, what: &'static str) -> f64 {
    if v.is_finite() {
        v
    } else {
        warn!(what, value = v, "non-finite controller output zeroed");
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_core::units::{k, mps, unitless, w_per_m2};

    fn mild_night() -> Weather {
        Weather {
            t_out: k(278.15),
            rh_out: unitless(0.8),
            i_glob: w_per_m2(0.0),
            wind: mps(2.0),
            t_sky: k(265.15),
        }
    }

    fn setpoints() -> Setpoints {
        Setpoints {
            t_air: k(291.15),
            co2_mg_per_m3: 800.0,
        }
    }

    #[test]
    fn builds_with_defaults() {
        let gh = Greenhouse::new(GreenhouseConfig::default()).unwrap();
        assert_eq!(gh.network().stores().len(), 8);
        assert_eq!(gh.network().boundaries().len(), 12);
        assert_eq!(gh.network().flows().len(), 16);
    }

    #[test]
    fn tick_rejects_bad_dt() {
        let mut gh = Greenhouse::new(GreenhouseConfig::default()).unwrap();
        assert!(gh.tick(0.0, &mild_night(), &setpoints()).is_err());
        assert!(gh.tick(f64::NAN, &mild_night(), &setpoints()).is_err());
    }

    #[test]
    fn flow_balance_is_zero_each_tick() {
        let mut gh = Greenhouse::new(GreenhouseConfig::default()).unwrap();
        for _ in 0..50 {
            gh.tick(60.0, &mild_night(), &setpoints()).unwrap();
            assert!(
                gh.flow_balance().abs() < 1e-6,
                "imbalance {}",
                gh.flow_balance()
            );
        }
    }

    #[test]
    fn cold_night_drives_heating() {
        let mut gh = Greenhouse::new(GreenhouseConfig::default()).unwrap();
        let mut snap = None;
        for _ in 0..120 {
            snap = Some(gh.tick(60.0, &mild_night(), &setpoints()).unwrap());
        }
        let snap = snap.unwrap();
        // Air starts 3 K below setpoint on a cold night: the heating
        // loop must be actively firing and accumulating energy.
        assert!(snap.heating_power_w > 0.0);
        assert!(snap.cum_heat_j > 0.0);
        // Vents stay closed (air below the vent setpoint), but the
        // leakage floor still exchanges some heat outward.
        assert_eq!(snap.vent_opening, 0.0);
        assert!(snap.q_vent_w > 0.0);
    }

    #[test]
    fn controller_reads_post_advance_state() {
        // Phase order check: with a huge constant heat load the air
        // temperature rises during phase 4, and the controller in phase
        // 5 must see the *risen* value. We detect this by driving the
        // air above the vent setpoint in one tick and checking that the
        // vent command reacts on the same tick.
        let mut cfg = GreenhouseConfig::default();
        cfg.lighting = None;
        let mut gh = Greenhouse::new(cfg).unwrap();
        // A scorching day pushes air temperature up quickly
        let hot = Weather {
            t_out: k(308.15),
            rh_out: unitless(0.4),
            i_glob: w_per_m2(900.0),
            wind: mps(0.5),
            t_sky: k(300.15),
        };
        let mut opened_at_t_air = None;
        for _ in 0..240 {
            let snap = gh.tick(60.0, &hot, &setpoints()).unwrap();
            if snap.vent_opening > 0.0 {
                opened_at_t_air = Some(snap.t_air_k);
                break;
            }
        }
        let t_air = opened_at_t_air.expect("vents never opened on a hot day");
        // The vent loop acts on the freshly advanced temperature, so the
        // first nonzero command coincides with air above the setpoint.
        assert!(t_air > setpoints().t_air_k());
    }

    #[test]
    fn warmup_resets_accumulators() {
        let mut gh = Greenhouse::new(GreenhouseConfig::default()).unwrap();
        gh.warmup(60.0, &mild_night(), &setpoints(), 100).unwrap();
        let snap = gh.snapshot();
        assert_eq!(snap.cum_heat_j, 0.0);
        assert_eq!(snap.cum_elec_j, 0.0);
        assert_eq!(snap.crop_dry_matter_kg_per_m2, 0.0);
        assert!(gh.time_s() > 0.0);
    }

    #[test]
    fn non_finite_weather_recovers_not_aborts() {
        let mut gh = Greenhouse::new(GreenhouseConfig::default()).unwrap();
        gh.tick(60.0, &mild_night(), &setpoints()).unwrap();
        let before = gh.snapshot().t_air_k;
        // One tick of garbage weather: fluxes touching the outside
        // boundary go non-finite, are zeroed and logged, and the run
        // continues.
        let garbage = Weather {
            t_out: k(f64::NAN),
            rh_out: unitless(0.8),
            i_glob: w_per_m2(f64::NAN),
            wind: mps(2.0),
            t_sky: k(f64::NAN),
        };
        let snap = gh.tick(60.0, &garbage, &setpoints()).unwrap();
        assert!(snap.t_air_k.is_finite());
        assert!((snap.t_air_k - before).abs() < 5.0);
        // Healthy weather clears the fault streaks
        for _ in 0..20 {
            gh.tick(60.0, &mild_night(), &setpoints()).unwrap();
        }
    }

    #[test]
    fn persistent_faults_escalate() {
        let mut cfg = GreenhouseConfig::default();
        cfg.fault_limit = 5;
        let mut gh = Greenhouse::new(cfg).unwrap();
        let garbage = Weather {
            t_out: k(f64::NAN),
            rh_out: unitless(f64::NAN),
            i_glob: w_per_m2(0.0),
            wind: mps(f64::NAN),
            t_sky: k(f64::NAN),
        };
        let mut result = Ok(());
        for _ in 0..20 {
            match gh.tick(60.0, &garbage, &setpoints()) {
                Ok(_) => {}
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        assert!(matches!(result, Err(SimError::FaultStorm { .. })));
    }

    #[test]
    fn pipe_ceiling_is_fatal() {
        let mut cfg = GreenhouseConfig::default();
        // A tiny pipe with a ceiling barely above start and a huge
        // heating command: the limit must trip as a fatal error.
        cfg.heating.t_pipe_max_k = cfg.init.t_pipe_k + 1.0;
        cfg.heating.pid.cs_start = cfg.heating.pid.cs_max;
        let mut gh = Greenhouse::new(cfg).unwrap();
        let mut tripped = false;
        for _ in 0..500 {
            match gh.tick(60.0, &mild_night(), &setpoints()) {
                Ok(_) => {}
                Err(SimError::PhysicalLimit { .. }) => {
                    tripped = true;
                    break;
                }
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert!(tripped, "pipe ceiling never tripped");
    }

    #[test]
    fn sampled_controllers_hold_between_samples() {
        let mut cfg = GreenhouseConfig::default();
        cfg.control_period_s = Some(300.0);
        let mut gh = Greenhouse::new(cfg).unwrap();
        let mut changes = 0;
        let mut last: Option<f64> = None;
        for _ in 0..30 {
            let snap = gh.tick(60.0, &mild_night(), &setpoints()).unwrap();
            if let Some(prev) = last {
                if (snap.heating_power_w - prev).abs() > 1e-12 {
                    changes += 1;
                }
            }
            last = Some(snap.heating_power_w);
        }
        // 30 minutes at a 5-minute cadence: the command may only have
        // moved a handful of times.
        assert!(changes <= 7, "heating command changed {changes} times");
    }
}
