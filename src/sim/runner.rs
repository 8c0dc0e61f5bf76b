//! Cycle runner: threads SOC through a drive cycle one step at a time.

use tracing::{debug, info};

use crate::error::SimError;
use crate::powertrain::{LoadModel, RoadLoad};
use crate::vehicle::VehicleConfig;

use super::controller::Controller;
use super::cycle::DriveCycle;
use super::step::step_with;
use super::types::{Control, ExogenousInput, StepResult};

/// Relative slack when comparing cycle and vehicle timesteps.
const DT_TOLERANCE: f64 = 1e-9;

/// One executed timestep of a cycle run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    /// Step index within the cycle.
    pub index: usize,
    /// Time at the start of the step (s).
    pub time_s: f64,
    pub control: Control,
    pub result: StepResult,
}

/// Owns a vehicle, a controller and a load model.
///
/// Generic over `C: Controller` and `L: LoadModel` for static dispatch.
pub struct Simulation<C: Controller, L: LoadModel = RoadLoad> {
    config: VehicleConfig,
    controller: C,
    load: L,
}

impl<C: Controller> Simulation<C, RoadLoad> {
    /// Creates a runner with the flat-road load model.
    pub fn new(config: VehicleConfig, controller: C) -> Self {
        Self::with_load(config, controller, RoadLoad)
    }
}

impl<C: Controller, L: LoadModel> Simulation<C, L> {
    pub fn with_load(config: VehicleConfig, controller: C, load: L) -> Self {
        Self {
            config,
            controller,
            load,
        }
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Asks the controller for a control and evaluates one step.
    pub fn step(&self, soc: f64, input: &ExogenousInput) -> (Control, StepResult) {
        let demand = self
            .load
            .demand(input.vehicle_speed_mps, input.vehicle_accel_mps2, &self.config);
        let control = self.controller.control(soc, &demand, &self.config);
        let result = step_with(&self.load, soc, &control, input, &self.config);
        (control, result)
    }

    /// Runs the whole cycle from `initial_soc`.
    ///
    /// SOC is threaded through unchanged even after an infeasible step; the
    /// flags are kept on each record for the caller to judge.
    ///
    /// # Errors
    ///
    /// Returns `SimError::TimestepMismatch` if the cycle was sampled at a
    /// different timestep than the vehicle integrates SOC with.
    pub fn run(&self, cycle: &DriveCycle, initial_soc: f64) -> Result<Vec<StepRecord>, SimError> {
        let vehicle_dt_s = self.config.dt_s;
        if (cycle.dt_s - vehicle_dt_s).abs() > DT_TOLERANCE * vehicle_dt_s {
            return Err(SimError::TimestepMismatch {
                cycle_dt_s: cycle.dt_s,
                vehicle_dt_s,
            });
        }

        let inputs = cycle.inputs();
        let mut records = Vec::with_capacity(inputs.len());
        let mut soc = initial_soc;
        let mut infeasible = 0_usize;

        for (index, input) in inputs.iter().enumerate() {
            let (control, result) = self.step(soc, input);
            if !result.feasible {
                infeasible += 1;
                debug!(step = index, %result, "infeasible step");
            }
            soc = result.soc_next;
            records.push(StepRecord {
                index,
                time_s: index as f64 * self.config.dt_s,
                control,
                result,
            });
        }

        info!(
            cycle = %cycle.name,
            controller = self.controller.name(),
            steps = records.len(),
            infeasible,
            final_soc = soc,
            "cycle run complete"
        );
        Ok(records)
    }
}
