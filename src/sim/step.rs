//! Single-timestep powertrain state transition.
//!
//! Power flows backward from the wheels: the driveline turns the exogenous
//! vehicle trajectory into a shaft demand, the motor converts it to bus
//! power, the engine and generator turn the commanded engine operating point
//! into bus power, and the battery closes the balance. Every subsystem
//! reports its own limit breaches; the step is feasible only if none do.

use super::types::{Control, ExogenousInput, OperatingMode, StepProfile, StepResult};
use crate::powertrain::{LoadModel, RoadLoad};
use crate::vehicle::VehicleConfig;

/// Evaluates one timestep with the flat-road [`RoadLoad`] model.
///
/// Pure and deterministic: identical arguments give bit-identical results.
///
/// # Examples
///
/// ```
/// use shev_sim::sim::step::step;
/// use shev_sim::sim::types::{Control, ExogenousInput};
/// use shev_sim::vehicle::VehicleConfig;
///
/// let cfg = VehicleConfig::reference(1.0).unwrap();
/// let off = Control::engine_off(cfg.engine.idle_speed);
/// let r = step(0.6, &off, &ExogenousInput::new(0.0, 0.0), &cfg);
/// assert_eq!(r.soc_next, 0.6);
/// assert_eq!(r.fuel_rate_g_s, 0.0);
/// assert!(r.feasible);
/// ```
pub fn step(soc: f64, control: &Control, input: &ExogenousInput, config: &VehicleConfig) -> StepResult {
    step_with(&RoadLoad, soc, control, input, config)
}

/// Evaluates one timestep with a caller-supplied load model.
pub fn step_with<L: LoadModel + ?Sized>(
    load: &L,
    soc: f64,
    control: &Control,
    input: &ExogenousInput,
    config: &VehicleConfig,
) -> StepResult {
    let demand = load.demand(input.vehicle_speed_mps, input.vehicle_accel_mps2, config);
    let drive = demand.profile;

    let motor = config.motor.operate(demand.speed, demand.torque);
    let engine = config
        .engine
        .operate(control.engine_speed_rad_s, control.engine_torque_nm);
    let generator = config.generator.operate(engine.speed, engine.torque);

    let bus_power_w = motor.electrical_power_w + generator.electrical_power_w + config.aux_power_w;
    let battery = config.battery.advance(soc, bus_power_w, config.dt_s);

    let feasible = !(drive.infeasible
        || motor.infeasible
        || engine.infeasible
        || generator.infeasible
        || battery.infeasible);
    let mode = classify_mode(engine.on, battery.current_a);

    let profile = StepProfile {
        vehicle_speed_mps: drive.vehicle_speed_mps,
        vehicle_accel_mps2: drive.vehicle_accel_mps2,
        wheel_speed_rad_s: drive.wheel_speed_rad_s,
        wheel_torque_nm: drive.wheel_torque_nm,
        tractive_force_n: drive.tractive_force_n,
        wheel_power_w: drive.wheel_power_w,
        shaft_speed_rad_s: demand.speed,
        shaft_torque_nm: demand.torque,
        driveline_infeasible: drive.infeasible,

        motor_speed_rad_s: motor.speed,
        motor_torque_demand_nm: motor.torque_demand,
        motor_torque_nm: motor.torque,
        motor_efficiency: motor.efficiency,
        motor_mech_power_w: motor.mechanical_power_w,
        motor_elec_power_w: motor.electrical_power_w,
        motor_infeasible: motor.infeasible,

        engine_speed_rad_s: engine.speed,
        engine_torque_nm: engine.torque,
        engine_on: engine.on,
        engine_power_w: engine.mechanical_power_w,
        fuel_rate_g_s: engine.fuel_rate_g_s,
        engine_infeasible: engine.infeasible,

        generator_speed_rad_s: generator.speed,
        generator_torque_nm: generator.torque,
        generator_efficiency: generator.efficiency,
        generator_mech_power_w: generator.mechanical_power_w,
        generator_elec_power_w: generator.electrical_power_w,
        generator_infeasible: generator.infeasible,

        aux_power_w: config.aux_power_w,
        battery_power_w: battery.power_w,
        battery_ocv_v: battery.ocv_v,
        battery_resistance_ohm: battery.resistance_ohm,
        battery_current_unclamped_a: battery.current_unclamped_a,
        battery_current_a: battery.current_a,
        battery_voltage_v: battery.terminal_voltage_v,
        battery_power_limited: battery.power_limited,
        battery_infeasible: battery.infeasible,

        soc,
        soc_next: battery.soc_next,
        mode,
    };

    StepResult {
        soc_next: battery.soc_next,
        fuel_rate_g_s: engine.fuel_rate_g_s,
        feasible,
        profile,
    }
}

/// Derives the operating mode from engine state and the clamped battery current.
pub fn classify_mode(engine_on: bool, battery_current_a: f64) -> OperatingMode {
    if !engine_on {
        OperatingMode::PureElectric
    } else if battery_current_a >= 0.0 {
        OperatingMode::ChargeDepleting
    } else {
        OperatingMode::ChargeSustaining
    }
}
