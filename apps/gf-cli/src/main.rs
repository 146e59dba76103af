use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use gf_core::units::{k, mps, unitless, w_per_m2};
use gf_project::ModelDef;
use gf_results::{RunMeta, RunRecord, RunStore, compute_run_id};
use gf_sim::{Greenhouse, Setpoints, Weather};
use tracing::info;

const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "gf-cli")]
#[command(about = "GreenFlow CLI - greenhouse climate simulation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a model file's syntax and parameter ranges
    Validate {
        /// Path to the model YAML file
        model_path: PathBuf,
    },
    /// Run a simulation against synthetic diurnal weather
    Run {
        /// Path to the model YAML file
        model_path: PathBuf,
        /// Number of simulated days
        #[arg(long, default_value_t = 1)]
        days: u32,
        /// Engine tick, seconds
        #[arg(long, default_value_t = 60.0)]
        dt: f64,
        /// Record every N-th tick
        #[arg(long, default_value_t = 10)]
        record_every: usize,
        /// Warm-up ticks before recording starts
        #[arg(long, default_value_t = 720)]
        warmup_ticks: usize,
        /// Directory for the run store
        #[arg(long, default_value = "runs")]
        out: PathBuf,
    },
    /// List recorded runs in a store directory
    Runs {
        /// Directory of the run store
        #[arg(long, default_value = "runs")]
        out: PathBuf,
    },
    /// Print the summary of a recorded run
    ShowRun {
        /// Run ID
        run_id: String,
        /// Directory of the run store
        #[arg(long, default_value = "runs")]
        out: PathBuf,
    },
}

/// Synthetic winter day: cold night, bright noon, gusty afternoon.
fn weather_at(hour: f64) -> Weather {
    let day_phase = ((hour - 6.0) / 12.0 * std::f64::consts::PI).sin();
    let i_glob = if (6.0..18.0).contains(&hour) {
        450.0 * day_phase.max(0.0)
    } else {
        0.0
    };
    let t_out = 276.15 + 6.0 * ((hour - 14.0) / 24.0 * std::f64::consts::TAU).cos();
    Weather {
        t_out: k(t_out),
        rh_out: unitless(0.8),
        i_glob: w_per_m2(i_glob),
        wind: mps(2.5 + 1.5 * (hour / 24.0 * std::f64::consts::TAU).sin()),
        t_sky: k(t_out - 12.0),
    }
}

fn setpoints_at(hour: f64) -> Setpoints {
    // Cooler at night, warmer for the light period
    let t_sp = if (6.0..20.0).contains(&hour) { 293.15 } else { 290.15 };
    Setpoints {
        t_air: k(t_sp),
        co2_mg_per_m3: 900.0,
    }
}

fn run_model(
    model: ModelDef,
    days: u32,
    dt: f64,
    record_every: usize,
    warmup_ticks: usize,
    out: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    if record_every == 0 {
        return Err("record_every must be at least 1".into());
    }
    let run_id = compute_run_id(&model, ENGINE_VERSION);
    let mut gh = Greenhouse::new(model.greenhouse.clone())?;

    info!(warmup_ticks, "warming up");
    gh.warmup(dt, &weather_at(0.0), &setpoints_at(0.0), warmup_ticks)?;

    let ticks = (days as f64 * 86_400.0 / dt).round() as usize;
    info!(ticks, dt, "running");
    let t0 = gh.time_s();
    let mut series = Vec::with_capacity(ticks / record_every + 1);
    for tick in 0..ticks {
        let hour = ((gh.time_s() - t0) / 3600.0) % 24.0;
        let snap = gh.tick(dt, &weather_at(hour), &setpoints_at(hour))?;
        if tick % record_every == 0 {
            series.push(snap);
        }
    }

    let record = RunRecord {
        meta: RunMeta {
            run_id: run_id.clone(),
            model_name: model.name.clone(),
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            dt_s: dt,
            record_every,
            ticks,
        },
        series,
    };
    let store = RunStore::open(&out)?;
    store.save(&record)?;

    if let Some(last) = record.last() {
        println!("run {run_id}");
        println!("  final air temperature : {:.2} K", last.t_air_k);
        println!("  final RH              : {:.2}", last.rh_air);
        println!("  final CO2             : {:.0} mg/m3", last.co2_air_mg_per_m3);
        println!("  thermal energy        : {:.1} MJ", last.cum_heat_j / 1e6);
        println!("  electrical energy     : {:.1} MJ", last.cum_elec_j / 1e6);
        println!(
            "  crop dry matter       : {:.1} g/m2",
            last.crop_dry_matter_kg_per_m2 * 1e3
        );
    }
    println!("saved to {}", store.root().display());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Validate { model_path } => gf_project::load_yaml(&model_path)
            .map(|model| println!("{} is valid", model.name))
            .map_err(Into::into),
        Commands::Run {
            model_path,
            days,
            dt,
            record_every,
            warmup_ticks,
            out,
        } => gf_project::load_yaml(&model_path)
            .map_err(Into::into)
            .and_then(|model| run_model(model, days, dt, record_every, warmup_ticks, out)),
        Commands::Runs { out } => RunStore::open(&out)
            .and_then(|store| store.list())
            .map(|ids| {
                for id in ids {
                    println!("{id}");
                }
            })
            .map_err(Into::into),
        Commands::ShowRun { run_id, out } => RunStore::open(&out)
            .and_then(|store| store.load(&run_id))
            .map(|record| {
                println!("run {}", record.meta.run_id);
                println!("  model   : {}", record.meta.model_name);
                println!("  created : {}", record.meta.created_at);
                println!("  ticks   : {} at dt={}s", record.meta.ticks, record.meta.dt_s);
                println!("  samples : {}", record.series.len());
            })
            .map_err(Into::into),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
