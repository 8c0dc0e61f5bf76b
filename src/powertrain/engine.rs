//! Internal combustion engine: fuel flow and operating-envelope checks.

use crate::error::MapError;
use crate::maps::{Interp1D, Interp2D};

/// Number of torque samples per speed when searching for minimum BSFC.
const OOL_TORQUE_SAMPLES: usize = 200;

/// Engine parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSpec {
    /// Idle speed (rad/s); the engine counts as running only above it.
    pub idle_speed: f64,
    /// Maximum speed (rad/s).
    pub max_speed: f64,
    /// Full-load torque curve vs speed (N·m).
    pub max_torque: Interp1D,
    /// Fuel mass flow over (speed rad/s, torque N·m), in g/s.
    pub fuel_rate: Interp2D,
    /// Optimal operating line derived from `fuel_rate`.
    pub ool: OptimalOperatingLine,
    /// Rated power (W).
    pub rated_power_w: f64,
    /// Crankshaft and flywheel inertia (kg·m²).
    pub inertia_kg_m2: f64,
    pub mass_kg: f64,
}

/// Engine evaluation for one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOperation {
    pub speed: f64,
    pub torque: f64,
    /// `speed > idle_speed && torque > 0`.
    pub on: bool,
    /// Fuel mass flow (g/s).
    pub fuel_rate_g_s: f64,
    /// Brake power `speed * torque` (W).
    pub mechanical_power_w: f64,
    pub infeasible: bool,
}

impl EngineSpec {
    /// Evaluates fuel flow and feasibility at a commanded operating point.
    pub fn operate(&self, speed: f64, torque: f64) -> EngineOperation {
        let on = speed > self.idle_speed && torque > 0.0;

        // the map is not trusted at the origin
        let fuel_rate_g_s = if speed == 0.0 && torque == 0.0 {
            0.0
        } else {
            self.fuel_rate.eval(speed, torque)
        };

        // `on` already implies speed above idle
        let speed_out_of_range = on && speed > self.max_speed;
        let torque_out_of_range = torque < 0.0 || torque > self.max_torque.eval(speed);
        let non_finite = !speed.is_finite() || !torque.is_finite();

        EngineOperation {
            speed,
            torque,
            on,
            fuel_rate_g_s,
            mechanical_power_w: speed * torque,
            infeasible: speed_out_of_range || torque_out_of_range || non_finite,
        }
    }

    /// Maps a commanded engine power onto the optimal operating line.
    ///
    /// Non-positive power returns the engine-off point `(idle_speed, 0)`.
    pub fn operating_point_for_power(&self, power_w: f64) -> (f64, f64) {
        if power_w <= 0.0 {
            return (self.idle_speed, 0.0);
        }
        let speed = self.ool.speed_for_power(power_w);
        (speed, power_w / speed)
    }

    /// Brake power at the point of minimum BSFC (W).
    pub fn optimal_power_w(&self) -> f64 {
        self.ool.best_speed * self.ool.best_torque
    }

    /// Highest brake power on the full-load curve within `[idle, max]` speed (W).
    pub fn peak_power_w(&self) -> f64 {
        self.max_torque
            .x()
            .iter()
            .copied()
            .chain([self.idle_speed, self.max_speed])
            .filter(|&w| w >= self.idle_speed && w <= self.max_speed)
            .map(|w| w * self.max_torque.eval(w))
            .fold(0.0, f64::max)
    }
}

/// Engine speed/torque locus of minimum brake-specific fuel consumption.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimalOperatingLine {
    /// Optimal torque vs speed (N·m).
    pub torque: Interp1D,
    /// Inverse: speed vs brake power along the line (rad/s).
    pub speed_from_power: Interp1D,
    /// Speed of the global BSFC minimum (rad/s).
    pub best_speed: f64,
    /// Torque of the global BSFC minimum (N·m).
    pub best_torque: f64,
    /// BSFC at the global minimum (g/kWh).
    pub best_bsfc_g_kwh: f64,
}

impl OptimalOperatingLine {
    /// Derives the line from a fuel map and full-load curve.
    ///
    /// For every fuel-map speed in `(idle_speed, max_speed]` the torque range
    /// `(0, max_torque(speed)]` is sampled for minimum BSFC. Points whose
    /// power does not exceed the previous point are dropped so that the
    /// speed-from-power inverse stays single valued.
    ///
    /// # Errors
    ///
    /// Returns a `MapError` if fewer than two usable speeds remain.
    pub fn from_fuel_map(
        fuel_rate: &Interp2D,
        max_torque: &Interp1D,
        idle_speed: f64,
        max_speed: f64,
    ) -> Result<Self, MapError> {
        let mut speeds = Vec::new();
        let mut torques = Vec::new();
        let mut powers: Vec<f64> = Vec::new();
        let mut best = (0.0, 0.0, f64::INFINITY);

        let candidates = fuel_rate
            .x()
            .iter()
            .copied()
            .filter(|&w| w > idle_speed && w <= max_speed);

        for speed in candidates {
            let t_max = max_torque.eval(speed);
            if t_max <= 0.0 {
                continue;
            }
            let mut local = (0.0, f64::INFINITY);
            for k in 1..=OOL_TORQUE_SAMPLES {
                let torque = t_max * k as f64 / OOL_TORQUE_SAMPLES as f64;
                let bsfc = fuel_rate.eval(speed, torque) / (speed * torque);
                if bsfc < local.1 {
                    local = (torque, bsfc);
                }
            }
            let (torque, bsfc) = local;
            if bsfc < best.2 {
                best = (speed, torque, bsfc);
            }

            let power = speed * torque;
            if powers.last().is_none_or(|&p| power > p) {
                speeds.push(speed);
                torques.push(torque);
                powers.push(power);
            }
        }

        let torque = Interp1D::new(speeds.clone(), torques)?;
        let speed_from_power = Interp1D::new(powers, speeds)?;
        Ok(Self {
            torque,
            speed_from_power,
            best_speed: best.0,
            best_torque: best.1,
            // g/J -> g/kWh
            best_bsfc_g_kwh: best.2 * 3.6e6,
        })
    }

    /// Speed on the line that delivers `power_w`, clamped to the line's range.
    pub fn speed_for_power(&self, power_w: f64) -> f64 {
        self.speed_from_power.eval(power_w)
    }
}
