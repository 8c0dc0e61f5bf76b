//! shev-sim entry point: CLI wiring and config-driven simulation construction.

use std::process;

use tracing::{error, info, warn};

use shev_sim::cli::{CliOptions, parse_args, print_usage};
use shev_sim::config::ScenarioConfig;
use shev_sim::error::SimError;
use shev_sim::io::export::export_csv;
use shev_sim::logging::init_tracing;
use shev_sim::sim::controller::{Controller, ElectricOnlyController};
use shev_sim::sim::cycle::DriveCycle;
use shev_sim::sim::kpi::KpiReport;
use shev_sim::sim::runner::{Simulation, StepRecord};
use shev_sim::vehicle::VehicleConfig;

/// Loads the scenario named on the command line and applies overrides.
fn load_scenario(cli: &CliOptions) -> Result<ScenarioConfig, String> {
    let mut scenario = if let Some(ref path) = cli.scenario {
        ScenarioConfig::from_toml_file(path).map_err(|e| e.to_string())?
    } else {
        let name = cli.preset.as_deref().unwrap_or("compact");
        ScenarioConfig::from_preset(name).map_err(|e| e.to_string())?
    };

    if let Some(seed) = cli.seed {
        scenario.simulation.seed = seed;
    }
    if let Some(ref cycle) = cli.cycle {
        scenario.simulation.cycle = cycle.clone();
    }
    if let Some(ref controller) = cli.controller {
        scenario.simulation.controller = controller.clone();
    }
    Ok(scenario)
}

fn run_with<C: Controller>(
    vehicle: VehicleConfig,
    controller: C,
    cycle: &DriveCycle,
    initial_soc: f64,
) -> Result<Vec<StepRecord>, SimError> {
    Simulation::new(vehicle, controller).run(cycle, initial_soc)
}

fn main() {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            print_usage();
            process::exit(1);
        }
    };
    if cli.help {
        print_usage();
        return;
    }

    init_tracing(cli.json_log);

    let scenario = match load_scenario(&cli) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("{e}");
        }
        process::exit(1);
    }

    let (vehicle, warnings) = match scenario.build_vehicle() {
        Ok(v) => v,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };
    for w in &warnings {
        warn!("implausible rating: {w}");
    }

    let cycle = match scenario.drive_cycle() {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    info!(
        cycle = %cycle.name,
        steps = cycle.len(),
        controller = %scenario.simulation.controller,
        "starting simulation"
    );

    let dt_s = vehicle.dt_s;
    let initial_soc = scenario.simulation.initial_soc;
    let run = if scenario.simulation.controller == "electric-only" {
        run_with(vehicle, ElectricOnlyController, &cycle, initial_soc)
    } else {
        run_with(vehicle, scenario.rule_based_controller(), &cycle, initial_soc)
    };
    let records = match run {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    for r in &records {
        println!("{:>5} {}", r.index, r.result);
    }

    let kpi = KpiReport::from_records(&records, dt_s);
    println!("\n{kpi}");

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&records, path) {
            error!("failed to write CSV: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), "telemetry written");
    }
}
