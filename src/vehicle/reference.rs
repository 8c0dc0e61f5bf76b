//! Synthetic reference vehicle: a compact series-hybrid passenger car.
//!
//! Maps are generated from simple loss models so that the crate ships a
//! self-contained, physically plausible baseline for tests, demos and rescaling.

use super::VehicleConfig;
use crate::error::ConfigError;
use crate::maps::{Interp1D, Interp2D};
use crate::powertrain::{
    BatterySpec, BodySpec, EngineSpec, GeneratorSpec, MotorSpec, OptimalOperatingLine,
};

/// Lower heating value of gasoline (J/g).
const FUEL_LHV_J_PER_G: f64 = 42_600.0;
/// Indicated efficiency of the Willans fuel model.
const INDICATED_EFFICIENCY: f64 = 0.42;

const MOTOR_PEAK_TORQUE_NM: f64 = 250.0;
const MOTOR_RATED_POWER_W: f64 = 80_000.0;
const MOTOR_MAX_SPEED: f64 = 1100.0;

const GENERATOR_PEAK_TORQUE_NM: f64 = 150.0;
const GENERATOR_RATED_POWER_W: f64 = 70_000.0;
const GENERATOR_MAX_SPEED: f64 = 1000.0;
const GENERATOR_RATIO: f64 = 1.6;

const ENGINE_IDLE_SPEED: f64 = 90.0;
const ENGINE_MAX_SPEED: f64 = 600.0;

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    let step = (stop - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Loss-model efficiency for an electric machine, kept inside a plausible band.
fn machine_efficiency(speed: f64, torque: f64, copper: f64, iron: f64, windage: f64, fixed: f64) -> f64 {
    let power = (speed * torque).abs();
    let loss = copper * torque * torque + iron * speed + windage * speed * speed + fixed;
    (power / (power + loss)).clamp(0.55, 0.96)
}

fn build_motor() -> Result<MotorSpec, ConfigError> {
    let speeds = linspace(0.0, MOTOR_MAX_SPEED, 23);
    let max: Vec<f64> = speeds
        .iter()
        .map(|&w| MOTOR_PEAK_TORQUE_NM.min(MOTOR_RATED_POWER_W / w.max(1.0)))
        .collect();
    let min: Vec<f64> = max.iter().map(|t| -t).collect();

    let max_torque =
        Interp1D::new(speeds.clone(), max).map_err(|e| ConfigError::from_map("motor.max_torque", e))?;
    let min_torque =
        Interp1D::new(speeds, min).map_err(|e| ConfigError::from_map("motor.min_torque", e))?;
    let efficiency = Interp2D::from_fn(
        linspace(0.0, MOTOR_MAX_SPEED, 12),
        linspace(-300.0, 300.0, 25),
        |w, t| machine_efficiency(w, t, 0.02, 0.5, 0.0015, 150.0),
    )
    .map_err(|e| ConfigError::from_map("motor.efficiency", e))?;

    Ok(MotorSpec {
        max_speed: MOTOR_MAX_SPEED,
        max_torque,
        min_torque,
        efficiency,
        rated_power_w: MOTOR_RATED_POWER_W,
        inertia_kg_m2: 0.035,
        mass_kg: 55.0,
    })
}

fn build_generator() -> Result<GeneratorSpec, ConfigError> {
    let speeds = linspace(0.0, GENERATOR_MAX_SPEED, 21);
    let max: Vec<f64> = speeds
        .iter()
        .map(|&w| GENERATOR_PEAK_TORQUE_NM.min(GENERATOR_RATED_POWER_W / w.max(1.0)))
        .collect();
    let min: Vec<f64> = max.iter().map(|t| -t).collect();

    let max_torque = Interp1D::new(speeds.clone(), max)
        .map_err(|e| ConfigError::from_map("generator.max_torque", e))?;
    let min_torque =
        Interp1D::new(speeds, min).map_err(|e| ConfigError::from_map("generator.min_torque", e))?;
    let efficiency = Interp2D::from_fn(
        linspace(0.0, GENERATOR_MAX_SPEED, 11),
        linspace(-200.0, 200.0, 17),
        |w, t| machine_efficiency(w, t, 0.025, 0.4, 0.0012, 120.0),
    )
    .map_err(|e| ConfigError::from_map("generator.efficiency", e))?;

    Ok(GeneratorSpec {
        ratio: GENERATOR_RATIO,
        max_speed: GENERATOR_MAX_SPEED,
        max_torque,
        min_torque,
        efficiency,
        rated_power_w: GENERATOR_RATED_POWER_W,
        mass_kg: 45.0,
    })
}

fn build_engine() -> Result<EngineSpec, ConfigError> {
    let speeds = linspace(0.0, ENGINE_MAX_SPEED, 21);
    let full_load: Vec<f64> = speeds
        .iter()
        .map(|&w| {
            let x = (w - 330.0) / 330.0;
            150.0 * (1.0 - 0.45 * x * x)
        })
        .collect();
    let max_torque = Interp1D::new(speeds.clone(), full_load)
        .map_err(|e| ConfigError::from_map("engine.max_torque", e))?;

    // Willans line with speed-dependent friction; zero torque is fuel cut
    let fuel_rate = Interp2D::from_fn(speeds, linspace(0.0, 160.0, 17), |w, t| {
        if t <= 0.0 {
            0.0
        } else {
            let indicated = w * t + w * (12.0 + 0.015 * w) + 0.001 * w * t * t + 15.0 * t;
            indicated / (INDICATED_EFFICIENCY * FUEL_LHV_J_PER_G)
        }
    })
    .map_err(|e| ConfigError::from_map("engine.fuel_rate", e))?;

    let ool = OptimalOperatingLine::from_fuel_map(&fuel_rate, &max_torque, ENGINE_IDLE_SPEED, ENGINE_MAX_SPEED)
        .map_err(|e| ConfigError::from_map("engine.ool", e))?;

    let mut engine = EngineSpec {
        idle_speed: ENGINE_IDLE_SPEED,
        max_speed: ENGINE_MAX_SPEED,
        max_torque,
        fuel_rate,
        ool,
        rated_power_w: 0.0,
        inertia_kg_m2: 0.12,
        mass_kg: 110.0,
    };
    engine.rated_power_w = engine.peak_power_w();
    Ok(engine)
}

fn build_battery() -> Result<BatterySpec, ConfigError> {
    let ocv = Interp1D::new(
        vec![0.0, 0.1, 0.2, 0.4, 0.6, 0.8, 0.9, 1.0],
        vec![185.0, 198.0, 203.0, 208.0, 212.0, 218.0, 222.0, 228.0],
    )
    .map_err(|e| ConfigError::from_map("battery.ocv", e))?;
    let resistance = Interp1D::new(
        vec![0.0, 0.2, 0.5, 0.8, 1.0],
        vec![0.32, 0.22, 0.18, 0.19, 0.24],
    )
    .map_err(|e| ConfigError::from_map("battery.resistance", e))?;

    Ok(BatterySpec {
        capacity_ah: 25.0,
        nominal_voltage_v: 210.0,
        ocv,
        resistance,
        max_charge_current_a: 250.0,
        max_discharge_current_a: 300.0,
        soc_min: 0.0,
        soc_max: 1.0,
        mass_kg: 65.0,
    })
}

impl VehicleConfig {
    /// Builds the reference compact series hybrid with timestep `dt_s`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `dt_s` is not usable.
    pub fn reference(dt_s: f64) -> Result<Self, ConfigError> {
        let config = Self {
            motor: build_motor()?,
            generator: build_generator()?,
            engine: build_engine()?,
            battery: build_battery()?,
            body: BodySpec {
                mass_kg: 1450.0,
                drag_area_m2: 0.62,
                rolling_coef: 0.009,
                wheel_radius_m: 0.31,
                final_drive_ratio: 7.0,
                final_drive_efficiency: 0.97,
                rotating_mass_factor: 1.04,
                air_density_kg_m3: 1.2,
            },
            dt_s,
            aux_power_w: 0.0,
        };
        config.ensure_valid()?;
        Ok(config)
    }
}
