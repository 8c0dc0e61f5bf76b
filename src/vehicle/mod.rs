//! Vehicle parameter bundle shared read-only by every timestep evaluation.

mod reference;

use crate::error::ConfigError;
use crate::maps::{Interp1D, Interp2D};
use crate::powertrain::{BatterySpec, BodySpec, EngineSpec, GeneratorSpec, MotorSpec};

/// Static parameters of one series-hybrid vehicle.
///
/// Built once, either from [`VehicleConfig::reference`], by hand, or through
/// [`rescale`](crate::rescale::rescale), and treated as immutable afterwards.
/// Any number of concurrent evaluations may share one instance by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleConfig {
    pub motor: MotorSpec,
    pub generator: GeneratorSpec,
    pub engine: EngineSpec,
    pub battery: BatterySpec,
    pub body: BodySpec,
    /// Timestep duration (s).
    pub dt_s: f64,
    /// Auxiliary electrical load on the bus (W, positive = consumption).
    pub aux_power_w: f64,
}

impl VehicleConfig {
    /// Returns a copy with a different timestep.
    pub fn with_dt(mut self, dt_s: f64) -> Self {
        self.dt_s = dt_s;
        self
    }

    /// Returns a copy with a different auxiliary load.
    pub fn with_aux_power(mut self, aux_power_w: f64) -> Self {
        self.aux_power_w = aux_power_w;
        self
    }

    /// Validates scalar parameters and map coverage, returning every problem found.
    ///
    /// Returns an empty vector if the configuration is usable. Maps must
    /// cover the full speed/torque envelope of their subsystem; the
    /// per-step model clamps out-of-grid lookups silently, so gaps are only
    /// caught here.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !(self.dt_s > 0.0 && self.dt_s.is_finite()) {
            errors.push(ConfigError::new("dt_s", "must be finite and > 0"));
        }
        if !self.aux_power_w.is_finite() {
            errors.push(ConfigError::new("aux_power_w", "must be finite"));
        }

        let m = &self.motor;
        positive(&mut errors, "motor.max_speed", m.max_speed);
        positive(&mut errors, "motor.rated_power_w", m.rated_power_w);
        check_torque_limits(&mut errors, "motor", &m.min_torque, &m.max_torque);
        check_efficiency_map(
            &mut errors,
            "motor.efficiency",
            &m.efficiency,
            m.max_speed,
            (curve_min(&m.min_torque), curve_max(&m.max_torque)),
        );

        let g = &self.generator;
        positive(&mut errors, "generator.ratio", g.ratio);
        positive(&mut errors, "generator.max_speed", g.max_speed);
        positive(&mut errors, "generator.rated_power_w", g.rated_power_w);
        check_torque_limits(&mut errors, "generator", &g.min_torque, &g.max_torque);
        check_efficiency_map(
            &mut errors,
            "generator.efficiency",
            &g.efficiency,
            g.max_speed,
            (curve_min(&g.min_torque), curve_max(&g.max_torque)),
        );

        let e = &self.engine;
        positive(&mut errors, "engine.idle_speed", e.idle_speed);
        positive(&mut errors, "engine.rated_power_w", e.rated_power_w);
        if e.idle_speed >= e.max_speed {
            errors.push(ConfigError::new("engine.idle_speed", "must be < engine.max_speed"));
        }
        if curve_min(&e.max_torque) < 0.0 {
            errors.push(ConfigError::new("engine.max_torque", "must be >= 0 everywhere"));
        }
        if !covers(e.fuel_rate.x(), 0.0, e.max_speed)
            || !covers(e.fuel_rate.y(), 0.0, curve_max(&e.max_torque))
        {
            errors.push(ConfigError::new(
                "engine.fuel_rate",
                "grid must cover [0, max_speed] x [0, max torque]",
            ));
        }
        if e.fuel_rate.f_xy().iter().flatten().any(|&v| v < 0.0) {
            errors.push(ConfigError::new("engine.fuel_rate", "values must be >= 0"));
        }
        if e.ool.best_speed <= e.idle_speed || e.ool.best_torque <= 0.0 {
            errors.push(ConfigError::new(
                "engine.ool",
                "best operating point must lie above idle with positive torque",
            ));
        }

        let b = &self.battery;
        positive(&mut errors, "battery.capacity_ah", b.capacity_ah);
        positive(&mut errors, "battery.nominal_voltage_v", b.nominal_voltage_v);
        positive(&mut errors, "battery.max_charge_current_a", b.max_charge_current_a);
        positive(&mut errors, "battery.max_discharge_current_a", b.max_discharge_current_a);
        if !(0.0..=1.0).contains(&b.soc_min) || !(0.0..=1.0).contains(&b.soc_max) || b.soc_min >= b.soc_max {
            errors.push(ConfigError::new(
                "battery.soc_min",
                "must satisfy 0 <= soc_min < soc_max <= 1",
            ));
        }
        if !covers(b.ocv.x(), 0.0, 1.0) {
            errors.push(ConfigError::new("battery.ocv", "grid must cover SOC [0, 1]"));
        }
        if !covers(b.resistance.x(), 0.0, 1.0) {
            errors.push(ConfigError::new("battery.resistance", "grid must cover SOC [0, 1]"));
        }
        if curve_min(&b.ocv) <= 0.0 {
            errors.push(ConfigError::new("battery.ocv", "values must be > 0"));
        }
        if curve_min(&b.resistance) <= 0.0 {
            errors.push(ConfigError::new("battery.resistance", "values must be > 0"));
        }

        let body = &self.body;
        positive(&mut errors, "body.mass_kg", body.mass_kg);
        positive(&mut errors, "body.wheel_radius_m", body.wheel_radius_m);
        positive(&mut errors, "body.final_drive_ratio", body.final_drive_ratio);
        if !(body.final_drive_efficiency > 0.0 && body.final_drive_efficiency <= 1.0) {
            errors.push(ConfigError::new("body.final_drive_efficiency", "must be in (0, 1]"));
        }
        if body.rotating_mass_factor < 1.0 {
            errors.push(ConfigError::new("body.rotating_mass_factor", "must be >= 1"));
        }
        if body.drag_area_m2 < 0.0 || body.rolling_coef < 0.0 || body.air_density_kg_m3 < 0.0 {
            errors.push(ConfigError::new(
                "body",
                "drag area, rolling coefficient and air density must be >= 0",
            ));
        }

        errors
    }

    /// Fails with the first validation error, if any.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` reported by [`VehicleConfig::validate`].
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        match self.validate().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn positive(errors: &mut Vec<ConfigError>, field: &str, value: f64) {
    if !(value > 0.0 && value.is_finite()) {
        errors.push(ConfigError::new(field, "must be finite and > 0"));
    }
}

fn curve_min(curve: &Interp1D) -> f64 {
    curve.f_x().iter().copied().fold(f64::INFINITY, f64::min)
}

fn curve_max(curve: &Interp1D) -> f64 {
    curve.f_x().iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn covers(axis: &[f64], lo: f64, hi: f64) -> bool {
    match (axis.first(), axis.last()) {
        (Some(&first), Some(&last)) => first <= lo && last >= hi,
        _ => false,
    }
}

fn check_torque_limits(errors: &mut Vec<ConfigError>, prefix: &str, min: &Interp1D, max: &Interp1D) {
    if curve_max(min) > 0.0 {
        errors.push(ConfigError::new(format!("{prefix}.min_torque"), "must be <= 0 everywhere"));
    }
    if curve_min(max) < 0.0 {
        errors.push(ConfigError::new(format!("{prefix}.max_torque"), "must be >= 0 everywhere"));
    }
}

fn check_efficiency_map(
    errors: &mut Vec<ConfigError>,
    field: &str,
    map: &Interp2D,
    max_speed: f64,
    (torque_lo, torque_hi): (f64, f64),
) {
    if !covers(map.x(), 0.0, max_speed) || !covers(map.y(), torque_lo, torque_hi) {
        errors.push(ConfigError::new(
            field,
            "grid must cover [0, max_speed] x [min torque, max torque]",
        ));
    }
    if map.f_xy().iter().flatten().any(|&v| !(v > 0.0 && v <= 1.0)) {
        errors.push(ConfigError::new(field, "values must be in (0, 1]"));
    }
}
