//! Cardiopulmonary simulator - command-line entry point.
//!
//! CLI Usage:
//!   cardio-sim run -d 60 --ramp-to 0.5 --csv     # Exercise ramp with CSV export
//!   cardio-sim diagnose                          # Headless rest run with checks
//!   cardio-sim dump-params > params.json         # Default parameter file

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use cardiopulmonary_sim::{
    export::{export_run_json, CsvExporter, RunExport},
    ControlConfig, ExerciseProfile, Parameters, Simulation, SimulationConfig, SimulationDiagnostics,
    VitalStatus,
};

#[derive(Parser)]
#[command(name = "cardio-sim", version, about = "Lumped-parameter cardiopulmonary simulation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a simulation and optionally export the results
    Run(RunArgs),
    /// Headless rest run with physiological range checks
    Diagnose(CommonArgs),
    /// Print the default parameter set as JSON
    DumpParams {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Simulated duration (s)
    #[arg(short, long, default_value_t = 30.0)]
    duration: f64,
    /// Resting heart rate (bpm)
    #[arg(long, default_value_t = 75.0)]
    hr: f64,
    /// Integration step (s)
    #[arg(long, default_value_t = 0.0002)]
    dt: f64,
    /// Parameter file (JSON); defaults are used when absent
    #[arg(short, long, default_value = "params.json")]
    params: PathBuf,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Ramp exercise intensity up to this value
    #[arg(long)]
    ramp_to: Option<f64>,
    /// Ramp start (s)
    #[arg(long, default_value_t = 0.0)]
    ramp_start: f64,
    /// Ramp duration (s)
    #[arg(long, default_value_t = 30.0)]
    ramp_duration: f64,
    /// Freeze all control at rest
    #[arg(long)]
    no_control: bool,
    /// Hold intrathoracic pressure at its end-expiratory value
    #[arg(long)]
    no_thoracic_coupling: bool,
    /// Time-series sample interval (s)
    #[arg(long, default_value_t = 0.01)]
    sample_interval: f64,
    /// Export the time series to CSV
    #[arg(long)]
    csv: bool,
    /// Export a JSON run summary
    #[arg(long)]
    json: bool,
}

impl CommonArgs {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            dt_s: self.dt,
            duration_s: self.duration,
            heart_rate_bpm: self.hr,
            ..SimulationConfig::default()
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let params = Parameters::load_or_default(&args.common.params).context("loading parameters")?;
    let exercise = match args.ramp_to {
        Some(to) => ExerciseProfile::Ramp {
            start_s: args.ramp_start,
            duration_s: args.ramp_duration,
            from: 0.0,
            to,
        },
        None => ExerciseProfile::Rest,
    };
    let config = SimulationConfig {
        sample_interval_s: args.sample_interval,
        exercise,
        control: ControlConfig {
            enabled: !args.no_control,
        },
        thoracic_coupling: !args.no_thoracic_coupling,
        ..args.common.config()
    };

    let mut sim = Simulation::new(params, config).context("setting up simulation")?;
    let start = Instant::now();
    let series = sim.run().context("simulation failed")?;
    println!(
        "Simulated {:.1} s in {:.2} s wall time ({} samples)\n",
        sim.config().duration_s,
        start.elapsed().as_secs_f64(),
        series.len()
    );

    let diagnostics = sim.diagnostics();
    if let Some(diag) = &diagnostics {
        diag.print_summary();
    }

    if args.csv {
        let mut exporter = CsvExporter::new(sim.config().sample_interval_s)?;
        exporter.write_series(&series)?;
        let path = exporter.finish()?;
        println!("\nTime series written to {}", path.display());
    }
    if args.json {
        let export = RunExport::new(sim.params(), sim.config(), diagnostics.as_ref());
        let path = export_run_json(&export)?;
        println!("Run summary written to {}", path.display());
    }
    Ok(())
}

/// Run at rest and check the vital signs against their normal ranges
fn diagnose(args: CommonArgs) -> Result<()> {
    println!("=== Cardiopulmonary Simulator - Rest Diagnostics ===\n");

    let params = Parameters::load_or_default(&args.params).context("loading parameters")?;
    let config = SimulationConfig {
        sample_interval_s: 0.1,
        ..args.config()
    };
    let report_every = ((5.0 / config.dt_s).round() as u64).max(1);
    let total = config.total_steps();

    let mut sim = Simulation::new(params, config).context("setting up simulation")?;
    SimulationDiagnostics::print_row_header();
    println!("{}", "-".repeat(66));

    let start = Instant::now();
    for i in 0..total {
        sim.step().with_context(|| format!("step {} failed", i))?;
        if (i + 1) % report_every == 0 {
            if let Some(diag) = sim.diagnostics() {
                diag.print_row();
            }
        }
    }
    println!("\nWall time: {:.2} s\n", start.elapsed().as_secs_f64());

    let Some(diag) = sim.diagnostics() else {
        println!("⚠️  WARNING: No steps were run");
        return Ok(());
    };
    diag.print_summary();
    println!();

    let vitals = diag.vitals();
    let checks = [
        ("Systolic pressure", vitals.systolic_status),
        ("Diastolic pressure", vitals.diastolic_status),
        ("Heart rate", vitals.heart_rate_status),
        ("Cardiac output", vitals.cardiac_output_status),
        ("PaO2", vitals.pao2_status),
        ("PaCO2", vitals.paco2_status),
        ("SaO2", vitals.sao2_status),
    ];
    for (name, status) in checks {
        match status {
            VitalStatus::Normal => println!("✓ {} within normal range", name),
            _ => println!("⚠️  WARNING: {} is {:?}", name, status),
        }
    }

    let warnings = sim.validate_state();
    if warnings.is_empty() {
        println!("✓ State validation passed");
    } else {
        for warning in &warnings {
            log::warn!("{}", warning);
            println!("⚠️  {}", warning);
        }
    }
    Ok(())
}

fn dump_params(output: Option<PathBuf>) -> Result<()> {
    let json = Parameters::default().to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            log::info!("Default parameters written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Run(args) => run(args),
        Command::Diagnose(args) => diagnose(args),
        Command::DumpParams { output } => dump_params(output),
    }
}
