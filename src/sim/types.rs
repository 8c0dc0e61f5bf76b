//! Core step types: decision variables, exogenous inputs, and step records.

use std::fmt;

/// Engine operating point chosen by the supervisory controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Control {
    /// Commanded engine speed (rad/s).
    pub engine_speed_rad_s: f64,
    /// Commanded engine torque (N·m).
    pub engine_torque_nm: f64,
}

impl Control {
    pub fn new(engine_speed_rad_s: f64, engine_torque_nm: f64) -> Self {
        Self {
            engine_speed_rad_s,
            engine_torque_nm,
        }
    }

    /// Engine off at the given idle speed with zero torque.
    pub fn engine_off(idle_speed: f64) -> Self {
        Self::new(idle_speed, 0.0)
    }
}

/// Vehicle trajectory sample for one timestep, fixed by the drive cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExogenousInput {
    /// Vehicle speed (m/s).
    pub vehicle_speed_mps: f64,
    /// Vehicle acceleration (m/s²).
    pub vehicle_accel_mps2: f64,
}

impl ExogenousInput {
    pub fn new(vehicle_speed_mps: f64, vehicle_accel_mps2: f64) -> Self {
        Self {
            vehicle_speed_mps,
            vehicle_accel_mps2,
        }
    }
}

/// Powertrain operating mode, derived from the solved state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingMode {
    /// Engine off; the battery alone supplies the bus.
    PureElectric,
    /// Engine on while the battery still discharges (current >= 0).
    ChargeDepleting,
    /// Engine on and the battery charging.
    ChargeSustaining,
}

impl OperatingMode {
    /// All modes, in reporting order.
    pub const ALL: [OperatingMode; 3] = [
        OperatingMode::PureElectric,
        OperatingMode::ChargeDepleting,
        OperatingMode::ChargeSustaining,
    ];

    /// Stable label used in logs and exported telemetry.
    pub fn label(self) -> &'static str {
        match self {
            OperatingMode::PureElectric => "pure-electric",
            OperatingMode::ChargeDepleting => "charge-depleting",
            OperatingMode::ChargeSustaining => "charge-sustaining/blended",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every intermediate quantity of one timestep evaluation.
///
/// Observational only; nothing in the model reads it back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepProfile {
    // driveline
    pub vehicle_speed_mps: f64,
    pub vehicle_accel_mps2: f64,
    pub wheel_speed_rad_s: f64,
    pub wheel_torque_nm: f64,
    pub tractive_force_n: f64,
    pub wheel_power_w: f64,
    pub shaft_speed_rad_s: f64,
    pub shaft_torque_nm: f64,
    pub driveline_infeasible: bool,

    // motor
    pub motor_speed_rad_s: f64,
    /// Torque requested by the driveline before the regen limit (N·m).
    pub motor_torque_demand_nm: f64,
    pub motor_torque_nm: f64,
    pub motor_efficiency: f64,
    pub motor_mech_power_w: f64,
    pub motor_elec_power_w: f64,
    pub motor_infeasible: bool,

    // engine
    pub engine_speed_rad_s: f64,
    pub engine_torque_nm: f64,
    pub engine_on: bool,
    pub engine_power_w: f64,
    pub fuel_rate_g_s: f64,
    pub engine_infeasible: bool,

    // generator
    pub generator_speed_rad_s: f64,
    pub generator_torque_nm: f64,
    pub generator_efficiency: f64,
    pub generator_mech_power_w: f64,
    pub generator_elec_power_w: f64,
    pub generator_infeasible: bool,

    // battery
    pub aux_power_w: f64,
    /// Net bus power drawn from the pack (W, positive = discharge).
    pub battery_power_w: f64,
    pub battery_ocv_v: f64,
    pub battery_resistance_ohm: f64,
    /// Current from the quadratic solve before the charge clamp (A).
    pub battery_current_unclamped_a: f64,
    /// Current used for the SOC update (A).
    pub battery_current_a: f64,
    pub battery_voltage_v: f64,
    /// The requested power exceeded what the pack can transfer.
    pub battery_power_limited: bool,
    pub battery_infeasible: bool,

    pub soc: f64,
    pub soc_next: f64,
    pub mode: OperatingMode,
}

/// Outcome of one timestep evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    /// State of charge after the step.
    pub soc_next: f64,
    /// Engine fuel mass flow (g/s); also the stage cost.
    pub fuel_rate_g_s: f64,
    /// `false` if any subsystem breached a physical limit.
    pub feasible: bool,
    pub profile: StepProfile,
}

impl StepResult {
    /// Stage cost of the step, equal to the fuel flow.
    pub fn stage_cost(&self) -> f64 {
        self.fuel_rate_g_s
    }

    pub fn mode(&self) -> OperatingMode {
        self.profile.mode
    }
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.profile;
        write!(
            f,
            "v={:>5.2} m/s | shaft={:>6.1} rad/s {:>7.1} Nm | eng={:>5.1} rad/s {:>6.1} Nm \
             fuel={:.3} g/s | bat={:>7.1} A (SoC {:.2}% -> {:.2}%) | {} ok={}",
            p.vehicle_speed_mps,
            p.shaft_speed_rad_s,
            p.shaft_torque_nm,
            p.engine_speed_rad_s,
            p.engine_torque_nm,
            self.fuel_rate_g_s,
            p.battery_current_a,
            p.soc * 100.0,
            self.soc_next * 100.0,
            p.mode,
            self.feasible,
        )
    }
}
