//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use shev_sim::powertrain::{DrivelineProfile, LoadModel, ShaftDemand};
use shev_sim::sim::types::{Control, ExogenousInput};
use shev_sim::vehicle::VehicleConfig;

/// Reference vehicle with a 1 s timestep.
pub fn reference() -> VehicleConfig {
    VehicleConfig::reference(1.0).expect("reference vehicle should build")
}

/// Engine off at idle speed.
pub fn engine_off(config: &VehicleConfig) -> Control {
    Control::engine_off(config.engine.idle_speed)
}

/// Engine at its point of minimum BSFC.
pub fn engine_at_optimum(config: &VehicleConfig) -> Control {
    Control::new(config.engine.ool.best_speed, config.engine.ool.best_torque)
}

/// Steady driving at `speed_mps`.
pub fn cruise(speed_mps: f64) -> ExogenousInput {
    ExogenousInput::new(speed_mps, 0.0)
}

/// Load model returning a fixed shaft operating point.
pub struct FixedShaft {
    pub speed: f64,
    pub torque: f64,
}

impl LoadModel for FixedShaft {
    fn demand(&self, speed_mps: f64, accel_mps2: f64, _config: &VehicleConfig) -> ShaftDemand {
        ShaftDemand {
            speed: self.speed,
            torque: self.torque,
            profile: DrivelineProfile {
                vehicle_speed_mps: speed_mps,
                vehicle_accel_mps2: accel_mps2,
                wheel_speed_rad_s: 0.0,
                wheel_torque_nm: 0.0,
                inertial_force_n: 0.0,
                aero_force_n: 0.0,
                rolling_force_n: 0.0,
                tractive_force_n: 0.0,
                wheel_power_w: self.speed * self.torque,
                infeasible: false,
            },
        }
    }
}

/// Asserts `|a - b| <= tol` with a readable message.
pub fn assert_close(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {a} to be within {tol} of {b}");
}
