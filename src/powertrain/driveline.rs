//! Vehicle road load and driveline: vehicle speed/acceleration to shaft demand.

use crate::vehicle::VehicleConfig;

/// Standard gravity (m/s²).
const GRAVITY_MPS2: f64 = 9.81;

/// Vehicle body and final-drive parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    /// Total vehicle mass including powertrain and payload (kg).
    pub mass_kg: f64,
    /// Drag coefficient times frontal area (m²).
    pub drag_area_m2: f64,
    /// Rolling resistance coefficient.
    pub rolling_coef: f64,
    /// Wheel rolling radius (m).
    pub wheel_radius_m: f64,
    /// Final drive ratio (motor speed / wheel speed).
    pub final_drive_ratio: f64,
    /// Final drive efficiency, applied by power-flow direction.
    pub final_drive_efficiency: f64,
    /// Equivalent-mass factor for rotating parts (>= 1).
    pub rotating_mass_factor: f64,
    /// Air density (kg/m³).
    pub air_density_kg_m3: f64,
}

/// Driveline quantities behind a shaft demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrivelineProfile {
    pub vehicle_speed_mps: f64,
    pub vehicle_accel_mps2: f64,
    pub wheel_speed_rad_s: f64,
    pub wheel_torque_nm: f64,
    pub inertial_force_n: f64,
    pub aero_force_n: f64,
    pub rolling_force_n: f64,
    /// Sum of inertial, aero and rolling forces at the tyre (N).
    pub tractive_force_n: f64,
    /// Tractive power at the wheels (W).
    pub wheel_power_w: f64,
    /// `true` for a negative or non-finite vehicle state.
    pub infeasible: bool,
}

/// Demand placed on the traction shaft for one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaftDemand {
    /// Shaft speed (rad/s).
    pub speed: f64,
    /// Shaft torque (N·m, negative while braking).
    pub torque: f64,
    pub profile: DrivelineProfile,
}

impl ShaftDemand {
    /// Mechanical shaft power (W).
    pub fn power_w(&self) -> f64 {
        self.speed * self.torque
    }
}

/// Maps the exogenous vehicle trajectory onto a shaft demand.
///
/// Implementations must be deterministic and free of side effects.
pub trait LoadModel {
    /// Returns the shaft speed and torque required to follow the given
    /// vehicle speed and acceleration.
    fn demand(&self, speed_mps: f64, accel_mps2: f64, config: &VehicleConfig) -> ShaftDemand;
}

/// Flat-road longitudinal load model using `config.body`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoadLoad;

impl LoadModel for RoadLoad {
    fn demand(&self, speed_mps: f64, accel_mps2: f64, config: &VehicleConfig) -> ShaftDemand {
        let body = &config.body;

        let inertial_force_n = body.mass_kg * body.rotating_mass_factor * accel_mps2;
        let aero_force_n = 0.5 * body.air_density_kg_m3 * body.drag_area_m2 * speed_mps * speed_mps;
        // no rolling resistance at standstill
        let rolling_force_n = if speed_mps > 0.0 {
            body.mass_kg * GRAVITY_MPS2 * body.rolling_coef
        } else {
            0.0
        };
        let tractive_force_n = inertial_force_n + aero_force_n + rolling_force_n;

        let wheel_speed_rad_s = speed_mps / body.wheel_radius_m;
        let wheel_torque_nm = tractive_force_n * body.wheel_radius_m;

        let speed = wheel_speed_rad_s * body.final_drive_ratio;
        let torque = if wheel_torque_nm >= 0.0 {
            wheel_torque_nm / (body.final_drive_ratio * body.final_drive_efficiency)
        } else {
            wheel_torque_nm * body.final_drive_efficiency / body.final_drive_ratio
        };

        let infeasible = speed_mps < 0.0 || !speed.is_finite() || !torque.is_finite();

        ShaftDemand {
            speed,
            torque,
            profile: DrivelineProfile {
                vehicle_speed_mps: speed_mps,
                vehicle_accel_mps2: accel_mps2,
                wheel_speed_rad_s,
                wheel_torque_nm,
                inertial_force_n,
                aero_force_n,
                rolling_force_n,
                tractive_force_n,
                wheel_power_w: tractive_force_n * speed_mps,
                infeasible,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> VehicleConfig {
        VehicleConfig::reference(1.0).unwrap()
    }

    #[test]
    fn standstill_needs_no_torque() {
        let d = RoadLoad.demand(0.0, 0.0, &config());
        assert_eq!(d.speed, 0.0);
        assert_eq!(d.torque, 0.0);
        assert!(!d.profile.infeasible);
    }

    #[test]
    fn cruise_torque_covers_aero_and_rolling() {
        let cfg = config();
        let d = RoadLoad.demand(20.0, 0.0, &cfg);
        let b = &cfg.body;
        let force = 0.5 * b.air_density_kg_m3 * b.drag_area_m2 * 400.0 + b.mass_kg * 9.81 * b.rolling_coef;
        assert!((d.profile.tractive_force_n - force).abs() < 1e-9);
        assert!(d.torque > 0.0);
        assert!((d.speed - 20.0 / b.wheel_radius_m * b.final_drive_ratio).abs() < 1e-9);
    }

    #[test]
    fn final_drive_losses_follow_power_flow() {
        let cfg = config();
        let b = &cfg.body;
        let accel = RoadLoad.demand(10.0, 1.5, &cfg);
        let brake = RoadLoad.demand(10.0, -3.0, &cfg);
        // traction: shaft delivers more than the wheel needs
        assert!(accel.power_w() > accel.profile.wheel_power_w);
        // braking: shaft recovers less than the wheel gives
        assert!(brake.torque < 0.0);
        assert!(brake.power_w() > brake.profile.wheel_power_w);
        assert!((accel.power_w() * b.final_drive_efficiency - accel.profile.wheel_power_w).abs() < 1e-6);
    }

    #[test]
    fn negative_speed_is_infeasible() {
        assert!(RoadLoad.demand(-1.0, 0.0, &config()).profile.infeasible);
    }
}
