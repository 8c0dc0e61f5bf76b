//! Traction motor: shaft demand to electrical power.

use crate::maps::{Interp1D, Interp2D};

/// Traction motor parameters.
///
/// The motor is coupled to the driveline shaft through an ideal torque
/// coupler, so its speed and torque equal the shaft demand.
#[derive(Debug, Clone, PartialEq)]
pub struct MotorSpec {
    /// Maximum shaft speed (rad/s).
    pub max_speed: f64,
    /// Maximum (motoring) torque vs speed (N·m).
    pub max_torque: Interp1D,
    /// Minimum (regenerating, negative) torque vs speed (N·m).
    pub min_torque: Interp1D,
    /// Efficiency map over (speed rad/s, torque N·m), values in (0, 1].
    pub efficiency: Interp2D,
    /// Rated power (W).
    pub rated_power_w: f64,
    /// Rotor inertia (kg·m²).
    pub inertia_kg_m2: f64,
    /// Motor plus inverter mass (kg).
    pub mass_kg: f64,
}

/// Motor operating point for one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorOperation {
    /// Motor speed (rad/s).
    pub speed: f64,
    /// Torque requested by the driveline (N·m).
    pub torque_demand: f64,
    /// Torque actually delivered after the regen limit (N·m).
    pub torque: f64,
    /// Efficiency used for the power conversion.
    pub efficiency: f64,
    /// Shaft power `speed * torque` (W).
    pub mechanical_power_w: f64,
    /// Electrical power drawn from the bus (W, negative when regenerating).
    pub electrical_power_w: f64,
    /// `true` when speed or torque is outside the motor envelope.
    pub infeasible: bool,
}

impl MotorSpec {
    /// Converts a shaft demand into motor electrical power.
    ///
    /// Regenerative torque is saturated at `min_torque(speed)`; the rest of the
    /// braking is left to the friction brakes. No upper clamp is applied, an
    /// excessive motoring demand is reported through `infeasible`.
    pub fn operate(&self, shaft_speed: f64, shaft_torque: f64) -> MotorOperation {
        let speed = shaft_speed;
        let min_torque = self.min_torque.eval(speed);
        let max_torque = self.max_torque.eval(speed);
        let torque = shaft_torque.max(min_torque);

        let efficiency = if speed == 0.0 {
            1.0
        } else {
            self.efficiency.eval(speed, torque)
        };

        let mechanical_power_w = speed * torque;
        let electrical_power_w = if torque >= 0.0 {
            mechanical_power_w / efficiency
        } else {
            mechanical_power_w * efficiency
        };

        let infeasible = speed > self.max_speed || torque < min_torque || torque > max_torque;

        MotorOperation {
            speed,
            torque_demand: shaft_torque,
            torque,
            efficiency,
            mechanical_power_w,
            electrical_power_w,
            infeasible,
        }
    }
}
