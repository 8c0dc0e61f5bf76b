//! Generator rigidly geared to the engine shaft.

use crate::maps::{Interp1D, Interp2D};

/// Generator parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSpec {
    /// Speed ratio generator/engine.
    pub ratio: f64,
    /// Maximum generator speed (rad/s).
    pub max_speed: f64,
    /// Maximum torque vs generator speed (N·m).
    pub max_torque: Interp1D,
    /// Minimum (most negative, absorbing) torque vs generator speed (N·m).
    pub min_torque: Interp1D,
    /// Efficiency map over (speed rad/s, torque N·m).
    pub efficiency: Interp2D,
    /// Rated power (W).
    pub rated_power_w: f64,
    /// Generator plus rectifier mass (kg).
    pub mass_kg: f64,
}

/// Generator operating point for one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorOperation {
    /// Generator speed (rad/s).
    pub speed: f64,
    /// Generator torque (N·m, negative while absorbing engine torque).
    pub torque: f64,
    pub efficiency: f64,
    /// Shaft power `speed * torque` (W).
    pub mechanical_power_w: f64,
    /// Electrical power on the bus (W, negative while generating).
    pub electrical_power_w: f64,
    pub infeasible: bool,
}

impl GeneratorSpec {
    /// Derives the generator operating point from the engine operating point.
    pub fn operate(&self, engine_speed: f64, engine_torque: f64) -> GeneratorOperation {
        let speed = engine_speed * self.ratio;
        let torque = -engine_torque / self.ratio;

        let efficiency = if speed == 0.0 {
            1.0
        } else {
            self.efficiency.eval(speed, torque)
        };

        let mechanical_power_w = speed * torque;
        let electrical_power_w = mechanical_power_w * efficiency;

        let infeasible = speed > self.max_speed
            || torque < self.min_torque.eval(speed)
            || torque > self.max_torque.eval(speed);

        GeneratorOperation {
            speed,
            torque,
            efficiency,
            mechanical_power_w,
            electrical_power_w,
            infeasible,
        }
    }
}
