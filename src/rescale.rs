//! Component rescaling: derive a new vehicle from target power and energy ratings.
//!
//! Torque-type curves and map torque axes scale linearly with the power
//! ratio while speed axes stay fixed, so each component keeps its speed
//! range and efficiency landscape. Battery capacity and current limits
//! scale with the energy ratio at fixed voltage, and resistance is divided
//! by it (more cells in parallel).

use std::fmt;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::powertrain::OptimalOperatingLine;
use crate::vehicle::VehicleConfig;

/// Plausible rating range for a passenger or light commercial series hybrid.
const MOTOR_KW_RANGE: (f64, f64) = (10.0, 400.0);
const ENGINE_KW_RANGE: (f64, f64) = (10.0, 300.0);
const GENERATOR_KW_RANGE: (f64, f64) = (10.0, 300.0);
const BATTERY_KWH_RANGE: (f64, f64) = (0.5, 100.0);
/// Generator rating below this fraction of engine rating cannot absorb full engine power.
const MIN_GENERATOR_TO_ENGINE: f64 = 0.8;

/// Target ratings; `None` keeps the base component unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Ratings {
    pub motor_kw: Option<f64>,
    pub engine_kw: Option<f64>,
    pub generator_kw: Option<f64>,
    pub battery_kwh: Option<f64>,
}

impl Ratings {
    pub fn is_empty(&self) -> bool {
        self.motor_kw.is_none()
            && self.engine_kw.is_none()
            && self.generator_kw.is_none()
            && self.battery_kwh.is_none()
    }
}

/// A rating that lies outside the plausible physical range.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingWarning {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for RatingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Output of [`rescale`].
#[derive(Debug, Clone)]
pub struct Rescaled {
    pub config: VehicleConfig,
    /// Implausible ratings; also emitted through `tracing::warn!`.
    pub warnings: Vec<RatingWarning>,
}

/// Produces a new vehicle with the requested ratings.
///
/// The base configuration is left untouched. Component masses scale with
/// their rating and the vehicle mass follows the change.
///
/// Battery resistance is divided by the energy ratio, not multiplied like
/// the other curves: at fixed pack voltage a larger pack adds cells in
/// parallel, which lowers internal resistance.
///
/// # Errors
///
/// Returns a `ConfigError` for non-positive or non-finite ratings, or if a
/// scaled map or the rebuilt optimal operating line is unusable.
pub fn rescale(base: &VehicleConfig, ratings: &Ratings) -> Result<Rescaled, ConfigError> {
    let mut cfg = base.clone();
    let mut warnings = Vec::new();
    let mut mass_delta_kg = 0.0;

    if let Some(kw) = ratings.motor_kw {
        let ratio = ratio("ratings.motor_kw", kw * 1000.0, base.motor.rated_power_w)?;
        check_range(&mut warnings, "ratings.motor_kw", kw, "kW", MOTOR_KW_RANGE);
        let m = &mut cfg.motor;
        m.max_torque = m
            .max_torque
            .scale_values(ratio)
            .map_err(|e| ConfigError::from_map("motor.max_torque", e))?;
        m.min_torque = m
            .min_torque
            .scale_values(ratio)
            .map_err(|e| ConfigError::from_map("motor.min_torque", e))?;
        m.efficiency = m
            .efficiency
            .scale(1.0, ratio, 1.0)
            .map_err(|e| ConfigError::from_map("motor.efficiency", e))?;
        m.rated_power_w *= ratio;
        m.inertia_kg_m2 *= ratio;
        mass_delta_kg += m.mass_kg * (ratio - 1.0);
        m.mass_kg *= ratio;
    }

    if let Some(kw) = ratings.generator_kw {
        let ratio = ratio("ratings.generator_kw", kw * 1000.0, base.generator.rated_power_w)?;
        check_range(&mut warnings, "ratings.generator_kw", kw, "kW", GENERATOR_KW_RANGE);
        let g = &mut cfg.generator;
        g.max_torque = g
            .max_torque
            .scale_values(ratio)
            .map_err(|e| ConfigError::from_map("generator.max_torque", e))?;
        g.min_torque = g
            .min_torque
            .scale_values(ratio)
            .map_err(|e| ConfigError::from_map("generator.min_torque", e))?;
        g.efficiency = g
            .efficiency
            .scale(1.0, ratio, 1.0)
            .map_err(|e| ConfigError::from_map("generator.efficiency", e))?;
        g.rated_power_w *= ratio;
        mass_delta_kg += g.mass_kg * (ratio - 1.0);
        g.mass_kg *= ratio;
    }

    if let Some(kw) = ratings.engine_kw {
        let ratio = ratio("ratings.engine_kw", kw * 1000.0, base.engine.rated_power_w)?;
        check_range(&mut warnings, "ratings.engine_kw", kw, "kW", ENGINE_KW_RANGE);
        let e = &mut cfg.engine;
        e.max_torque = e
            .max_torque
            .scale_values(ratio)
            .map_err(|err| ConfigError::from_map("engine.max_torque", err))?;
        e.fuel_rate = e
            .fuel_rate
            .scale(1.0, ratio, ratio)
            .map_err(|err| ConfigError::from_map("engine.fuel_rate", err))?;
        // the line depends on both scaled maps
        e.ool = OptimalOperatingLine::from_fuel_map(&e.fuel_rate, &e.max_torque, e.idle_speed, e.max_speed)
            .map_err(|err| ConfigError::from_map("engine.ool", err))?;
        e.rated_power_w *= ratio;
        e.inertia_kg_m2 *= ratio;
        mass_delta_kg += e.mass_kg * (ratio - 1.0);
        e.mass_kg *= ratio;
    }

    if let Some(kwh) = ratings.battery_kwh {
        let ratio = ratio("ratings.battery_kwh", kwh, base.battery.nominal_energy_kwh())?;
        check_range(&mut warnings, "ratings.battery_kwh", kwh, "kWh", BATTERY_KWH_RANGE);
        let b = &mut cfg.battery;
        b.capacity_ah *= ratio;
        b.max_charge_current_a *= ratio;
        b.max_discharge_current_a *= ratio;
        b.resistance = b
            .resistance
            .scale_values(1.0 / ratio)
            .map_err(|e| ConfigError::from_map("battery.resistance", e))?;
        mass_delta_kg += b.mass_kg * (ratio - 1.0);
        b.mass_kg *= ratio;
    }

    if cfg.generator.rated_power_w < MIN_GENERATOR_TO_ENGINE * cfg.engine.rated_power_w {
        let warning = RatingWarning {
            field: "ratings.generator_kw",
            message: format!(
                "generator {:.1} kW cannot absorb engine {:.1} kW",
                cfg.generator.rated_power_w / 1000.0,
                cfg.engine.rated_power_w / 1000.0
            ),
        };
        warn!(field = warning.field, "{}", warning.message);
        warnings.push(warning);
    }

    cfg.body.mass_kg += mass_delta_kg;
    cfg.ensure_valid()?;

    info!(
        motor_kw = cfg.motor.rated_power_w / 1000.0,
        engine_kw = cfg.engine.rated_power_w / 1000.0,
        generator_kw = cfg.generator.rated_power_w / 1000.0,
        battery_kwh = cfg.battery.nominal_energy_kwh(),
        mass_kg = cfg.body.mass_kg,
        warnings = warnings.len(),
        "vehicle rescaled"
    );

    Ok(Rescaled {
        config: cfg,
        warnings,
    })
}

fn ratio(field: &str, target: f64, base: f64) -> Result<f64, ConfigError> {
    if !(target > 0.0 && target.is_finite()) {
        return Err(ConfigError::new(field, "must be finite and > 0"));
    }
    if !(base > 0.0 && base.is_finite()) {
        return Err(ConfigError::new(field, "base rating must be finite and > 0"));
    }
    Ok(target / base)
}

fn check_range(warnings: &mut Vec<RatingWarning>, field: &'static str, value: f64, unit: &str, (lo, hi): (f64, f64)) {
    if value < lo || value > hi {
        let warning = RatingWarning {
            field,
            message: format!("{value:.1} {unit} outside plausible range [{lo}, {hi}] {unit}"),
        };
        warn!(field, value, "{}", warning.message);
        warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> VehicleConfig {
        VehicleConfig::reference(1.0).unwrap()
    }

    #[test]
    fn empty_ratings_return_an_equal_config() {
        let b = base();
        let out = rescale(&b, &Ratings::default()).unwrap();
        assert_eq!(out.config, b);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn motor_torque_scales_with_power() {
        let b = base();
        let out = rescale(&b, &Ratings {
            motor_kw: Some(160.0),
            ..Ratings::default()
        })
        .unwrap();
        let m = &out.config.motor;
        assert!((m.rated_power_w - 160_000.0).abs() < 1e-6);
        assert!((m.max_torque.eval(100.0) - 2.0 * b.motor.max_torque.eval(100.0)).abs() < 1e-9);
        assert!((m.min_torque.eval(100.0) - 2.0 * b.motor.min_torque.eval(100.0)).abs() < 1e-9);
        // same relative load, same efficiency
        let e0 = b.motor.efficiency.eval(400.0, 100.0);
        let e1 = m.efficiency.eval(400.0, 200.0);
        assert!((e0 - e1).abs() < 1e-12);
        assert!(out.config.body.mass_kg > b.body.mass_kg);
    }

    #[test]
    fn engine_rescale_rebuilds_the_operating_line() {
        let b = base();
        let out = rescale(&b, &Ratings {
            engine_kw: Some(b.engine.rated_power_w / 1000.0 * 1.5),
            generator_kw: Some(b.generator.rated_power_w / 1000.0 * 1.5),
            ..Ratings::default()
        })
        .unwrap();
        let e = &out.config.engine;
        assert!((e.ool.best_torque - 1.5 * b.engine.ool.best_torque).abs() < 1.5);
        assert!((e.optimal_power_w() / b.engine.optimal_power_w() - 1.5).abs() < 0.02);
        assert_ne!(e.ool.speed_from_power, b.engine.ool.speed_from_power);
        // BSFC is scale invariant
        assert!((e.ool.best_bsfc_g_kwh - b.engine.ool.best_bsfc_g_kwh).abs() < 1.0);
    }

    #[test]
    fn battery_resistance_falls_with_energy() {
        let b = base();
        let target = 2.0 * b.battery.nominal_energy_kwh();
        let out = rescale(&b, &Ratings {
            battery_kwh: Some(target),
            ..Ratings::default()
        })
        .unwrap();
        let bat = &out.config.battery;
        assert!((bat.nominal_energy_kwh() - target).abs() < 1e-9);
        assert!((bat.resistance.eval(0.5) - b.battery.resistance.eval(0.5) / 2.0).abs() < 1e-12);
        assert_eq!(bat.max_charge_current_a, 2.0 * b.battery.max_charge_current_a);
        assert_eq!(bat.ocv, b.battery.ocv);
    }

    #[test]
    fn implausible_ratings_warn_but_succeed() {
        let out = rescale(&base(), &Ratings {
            battery_kwh: Some(0.3),
            ..Ratings::default()
        })
        .unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].field, "ratings.battery_kwh");
    }

    #[test]
    fn undersized_generator_warns() {
        let out = rescale(&base(), &Ratings {
            generator_kw: Some(20.0),
            ..Ratings::default()
        })
        .unwrap();
        assert!(out.warnings.iter().any(|w| w.message.contains("cannot absorb")));
    }

    #[test]
    fn non_positive_rating_is_an_error() {
        let err = rescale(&base(), &Ratings {
            motor_kw: Some(0.0),
            ..Ratings::default()
        })
        .unwrap_err();
        assert_eq!(err.field, "ratings.motor_kw");
        assert!(rescale(&base(), &Ratings {
            engine_kw: Some(f64::NAN),
            ..Ratings::default()
        })
        .is_err());
    }

    #[test]
    fn base_is_not_modified() {
        let b = base();
        let copy = b.clone();
        let _ = rescale(&b, &Ratings {
            motor_kw: Some(50.0),
            battery_kwh: Some(10.0),
            ..Ratings::default()
        })
        .unwrap();
        assert_eq!(b, copy);
    }
}
